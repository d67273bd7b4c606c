//! Completion client port
//!
//! Defines the interface for turning a prompt into text with a language model.

use async_trait::async_trait;
use council_domain::ErrorKind;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during a completion request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    #[error("Completion backend unavailable: {0}")]
    Unavailable(String),

    #[error("Upstream error (HTTP {status_code}): {body}")]
    Upstream { status_code: u16, body: String },

    #[error("Timeout")]
    Timeout,

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl CompletionError {
    /// Classification recorded on a failed worker result
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompletionError::Unavailable(_) => ErrorKind::Unavailable,
            CompletionError::Upstream { .. } => ErrorKind::Upstream,
            CompletionError::Timeout => ErrorKind::Timeout,
            CompletionError::Malformed(_) => ErrorKind::Malformed,
        }
    }
}

/// Client for the language-model backend
///
/// This port defines how workers reach the model. Implementations (adapters)
/// live in the infrastructure layer. `timeout` is the budget for this one
/// call; callers still enforce it themselves.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        timeout: Duration,
    ) -> Result<String, CompletionError>;
}
