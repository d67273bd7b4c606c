//! Domain layer for persona-council
//!
//! This crate contains the core entities and value objects of the
//! coordination engine. It has no dependencies on infrastructure,
//! async runtimes or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Worker**: a persona, synthesizer or coordinator identified by a
//!   [`WorkerSpec`]; its output is a [`WorkerResult`]
//! - **Plan**: the ordered [`Step`]s the [`PlanBuilder`] derives from the
//!   registered workers
//! - **Session**: one run for one query, with its results, synthesis,
//!   [`SessionStatus`] and [`EventLog`]

pub mod core;
pub mod plan;
pub mod prompt;
pub mod session;
pub mod worker;

// Re-export commonly used types
pub use core::{error::DomainError, query::Query};
pub use plan::{
    builder::{PlanBuilder, PlanError},
    step::{CoordinationPlan, Step},
};
pub use prompt::PromptTemplate;
pub use session::{
    entities::{Session, SessionStatus},
    event::{Event, EventKind},
    event_log::EventLog,
    results::ResultSet,
};
pub use worker::{
    persona::PersonaAttributes,
    result::{ErrorKind, WorkerOutcome, WorkerResult},
    spec::{WorkerRole, WorkerSpec},
};
