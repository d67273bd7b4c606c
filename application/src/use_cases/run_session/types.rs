//! Input and failure types for the run-session use case.

use council_domain::{PlanError, WorkerSpec};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Input for [`CoordinationEngine::run_session`](super::CoordinationEngine::run_session)
#[derive(Debug, Clone)]
pub struct RunSessionInput {
    /// Caller-supplied, unique among the engine's sessions
    pub session_id: String,
    pub query: String,
    /// Registration order is preserved throughout the session
    pub workers: Vec<WorkerSpec>,
    /// Fired to stop launching further steps
    pub cancel: CancellationToken,
}

impl RunSessionInput {
    pub fn new(
        session_id: impl Into<String>,
        query: impl Into<String>,
        workers: Vec<WorkerSpec>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            query: query.into(),
            workers,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Why a session ended in `Failed`
///
/// Individual worker failures never appear here; they are recorded as data
/// on the worker's result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionFailure {
    #[error("Plan failure: {0}")]
    Plan(#[from] PlanError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Engine fault: {0}")]
    EngineFault(String),

    #[error("Session cancelled")]
    Cancelled,
}

impl SessionFailure {
    /// Tier reported in the `session_failed` event payload
    pub fn tier(&self) -> &'static str {
        match self {
            SessionFailure::Plan(_) | SessionFailure::InvalidInput(_) => "plan",
            SessionFailure::EngineFault(_) => "engine",
            SessionFailure::Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers() {
        assert_eq!(
            SessionFailure::from(PlanError::DuplicateWorkerId("a".into())).tier(),
            "plan"
        );
        assert_eq!(SessionFailure::InvalidInput("x".into()).tier(), "plan");
        assert_eq!(SessionFailure::EngineFault("x".into()).tier(), "engine");
        assert_eq!(SessionFailure::Cancelled.tier(), "cancelled");
    }
}
