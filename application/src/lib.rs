//! Application layer for persona-council
//!
//! This crate contains the coordination engine, its use cases, port
//! definitions and application configuration. It depends only on the domain
//! layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{DEFAULT_SYNTHESIS_FALLBACK, EngineConfig};
pub use ports::{
    completion_client::{CompletionClient, CompletionError},
    event_sink::{EventSink, NoEventSink},
    persona_lookup::{LookupError, PersonaLookup},
    progress::{NoProgress, ProgressNotifier},
};
pub use use_cases::assemble_council::{
    AssembleCouncilInput, AssembleCouncilUseCase, AssembleError, AssembledCouncil, SYNTHESIZER_ID,
};
pub use use_cases::execute_worker::Worker;
pub use use_cases::run_session::{
    CoordinationEngine, RunSessionInput, SessionFailure, SessionRegistry, SessionTrace,
};
