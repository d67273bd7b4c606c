//! Presentation layer for persona-council
//!
//! This crate contains the CLI definition, session output formatters,
//! the streamed event printer and progress reporters.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormat};
pub use output::console::ConsoleFormatter;
pub use output::events::EventPrinter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
