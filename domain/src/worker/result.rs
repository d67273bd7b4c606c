//! Worker result value objects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a single worker failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The completion backend is not usable (e.g. missing credential)
    Unavailable,
    /// The completion backend answered with a non-success status
    Upstream,
    /// The worker's time budget ran out
    Timeout,
    /// The completion backend answered with something unreadable
    Malformed,
    /// The worker's own execution panicked
    Panicked,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Upstream => "upstream",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Malformed => "malformed",
            ErrorKind::Panicked => "panicked",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Success XOR failure of one worker's execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WorkerOutcome {
    Success { text: String },
    Failure { error_kind: ErrorKind, message: String },
}

/// Result of one worker in one session
///
/// Created once, when the worker finishes; never overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerResult {
    pub worker_id: String,
    #[serde(flatten)]
    pub outcome: WorkerOutcome,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
}

impl WorkerResult {
    pub fn success(
        worker_id: impl Into<String>,
        text: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            worker_id: worker_id.into(),
            outcome: WorkerOutcome::Success { text: text.into() },
            timestamp: Utc::now(),
            duration_ms,
        }
    }

    pub fn failure(
        worker_id: impl Into<String>,
        error_kind: ErrorKind,
        message: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            worker_id: worker_id.into(),
            outcome: WorkerOutcome::Failure {
                error_kind,
                message: message.into(),
            },
            timestamp: Utc::now(),
            duration_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, WorkerOutcome::Success { .. })
    }

    /// Completion text, if the worker succeeded
    pub fn text(&self) -> Option<&str> {
        match &self.outcome {
            WorkerOutcome::Success { text } => Some(text),
            WorkerOutcome::Failure { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match &self.outcome {
            WorkerOutcome::Success { .. } => None,
            WorkerOutcome::Failure { error_kind, .. } => Some(*error_kind),
        }
    }

    /// Human-readable error summary, if the worker failed
    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            WorkerOutcome::Success { .. } => None,
            WorkerOutcome::Failure { message, .. } => Some(message),
        }
    }
}
