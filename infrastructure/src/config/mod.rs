//! Configuration file loading for persona-council
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `COUNCIL_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./persona-council.toml` or `./.persona-council.toml`
//! 4. Global: `~/.config/persona-council/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, FileCompletionConfig, FileConfig, FileEngineConfig, FileOutputConfig,
    FileOutputFormat, FilePersonasConfig, FileTraceConfig, Severity,
};
pub use loader::ConfigLoader;
