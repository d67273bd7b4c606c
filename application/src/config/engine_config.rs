//! Engine parameters: execution control for coordination sessions.
//!
//! [`EngineConfig`] groups the static parameters of
//! [`CoordinationEngine`](crate::use_cases::run_session::CoordinationEngine).
//! These are application-layer concerns, not domain policy.

use std::time::Duration;

/// Default fallback written to a session whose synthesizer failed
pub const DEFAULT_SYNTHESIS_FALLBACK: &str = "synthesis unavailable";

/// Coordination engine parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Budget for a single worker's completion call.
    pub worker_timeout: Duration,
    /// Maximum workers running at once within a batch (`None` = unbounded).
    pub max_concurrency: Option<usize>,
    /// Synthesis text used when the synthesizer fails.
    pub synthesis_fallback: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_timeout: Duration::from_secs(30),
            max_concurrency: None,
            synthesis_fallback: DEFAULT_SYNTHESIS_FALLBACK.to_string(),
        }
    }
}

impl EngineConfig {
    // ==================== Builder Methods ====================

    pub fn with_worker_timeout(mut self, timeout: Duration) -> Self {
        self.worker_timeout = timeout;
        self
    }

    /// `0` means unbounded
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = (max > 0).then_some(max);
        self
    }

    pub fn with_synthesis_fallback(mut self, text: impl Into<String>) -> Self {
        self.synthesis_fallback = text.into();
        self
    }
}
