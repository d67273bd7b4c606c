//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to application types where
//! the engine needs them.

mod completion;
mod engine;
mod output;
mod personas;
mod trace;
mod validation;

pub use completion::FileCompletionConfig;
pub use engine::FileEngineConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use personas::FilePersonasConfig;
pub use trace::FileTraceConfig;
pub use validation::{ConfigIssue, Severity};

use crate::http::parse_base_url;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Coordination engine settings
    pub engine: FileEngineConfig,
    /// Completion backend settings
    pub completion: FileCompletionConfig,
    /// Persona source settings
    pub personas: FilePersonasConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Coordination trace settings
    pub trace: FileTraceConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Nothing here aborts loading; callers decide what to do with errors.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.engine.worker_timeout_secs == 0 {
            issues.push(ConfigIssue::warning(
                "engine.worker_timeout_secs",
                "a zero timeout fails every worker immediately",
            ));
        }
        if self.engine.synthesis_fallback.trim().is_empty() {
            issues.push(ConfigIssue::warning(
                "engine.synthesis_fallback",
                "empty fallback text; a failed synthesis will print nothing",
            ));
        }

        if self.completion.base_url.trim().is_empty() {
            issues.push(ConfigIssue::error(
                "completion.base_url",
                "completion base URL is empty",
            ));
        } else if let Err(e) = parse_base_url(&self.completion.base_url) {
            issues.push(ConfigIssue::error("completion.base_url", e.to_string()));
        }
        if self.completion.model.trim().is_empty() {
            issues.push(ConfigIssue::error("completion.model", "model name is empty"));
        }
        if !(0.0..=2.0).contains(&self.completion.temperature) {
            issues.push(ConfigIssue::warning(
                "completion.temperature",
                format!(
                    "temperature {} is outside 0.0..=2.0",
                    self.completion.temperature
                ),
            ));
        }

        if self.personas.base_url.trim().is_empty() {
            issues.push(ConfigIssue::error(
                "personas.base_url",
                "persona service base URL is empty",
            ));
        } else if let Err(e) = parse_base_url(&self.personas.base_url) {
            issues.push(ConfigIssue::error("personas.base_url", e.to_string()));
        }
        if self.personas.timeout_secs == 0 {
            issues.push(ConfigIssue::warning(
                "personas.timeout_secs",
                "a zero timeout fails every persona lookup",
            ));
        }

        issues
    }
}
