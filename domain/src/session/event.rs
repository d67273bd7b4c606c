//! Coordination events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the engine did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    AgentRegistered,
    StepStarted,
    StepCompleted,
    WorkerSucceeded,
    WorkerFailed,
    SynthesisStarted,
    SynthesisCompleted,
    SessionFailed,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::AgentRegistered => "agent_registered",
            EventKind::StepStarted => "step_started",
            EventKind::StepCompleted => "step_completed",
            EventKind::WorkerSucceeded => "worker_succeeded",
            EventKind::WorkerFailed => "worker_failed",
            EventKind::SynthesisStarted => "synthesis_started",
            EventKind::SynthesisCompleted => "synthesis_completed",
            EventKind::SessionFailed => "session_failed",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of a session's event log
///
/// `sequence` is assigned by the log at append time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub sequence: u64,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    pub payload: Value,
}
