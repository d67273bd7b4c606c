//! Infrastructure layer for persona-council
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer (completion backend, persona source, trace sink) and
//! configuration file loading.

pub mod completion;
pub mod config;
pub mod http;
pub mod logging;
pub mod persona;

// Re-export commonly used types
pub use completion::OpenAiCompatibleClient;
pub use config::{
    ConfigIssue, ConfigLoader, FileCompletionConfig, FileConfig, FileEngineConfig,
    FileOutputConfig, FileOutputFormat, FilePersonasConfig, FileTraceConfig, Severity,
};
pub use http::HttpClientError;
pub use logging::JsonlEventSink;
pub use persona::HttpPersonaLookup;
