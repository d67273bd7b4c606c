//! Session domain entities

use super::event::{Event, EventKind};
use super::results::ResultSet;
use crate::core::error::DomainError;
use crate::worker::result::WorkerResult;
use crate::worker::spec::WorkerSpec;
use serde::{Deserialize, Serialize};

/// Lifecycle of a session
///
/// Only moves forward: `Initialized -> Running -> {Completed | Failed}`,
/// or straight `Initialized -> Failed` when the input cannot be planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Initialized,
    Running,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Initialized => "initialized",
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }

    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, next),
            (Initialized, Running)
                | (Initialized, Failed)
                | (Running, Completed)
                | (Running, Failed)
        )
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One end-to-end coordination run for a single query (Entity)
///
/// Owned by the engine invocation that created it. Results are written once
/// per worker; `events` is filled from the session's event log when the run
/// ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    session_id: String,
    query: String,
    workers: Vec<WorkerSpec>,
    results: ResultSet,
    events: Vec<Event>,
    #[serde(skip_serializing_if = "Option::is_none")]
    synthesis: Option<String>,
    status: SessionStatus,
}

impl Session {
    pub fn new(
        session_id: impl Into<String>,
        query: impl Into<String>,
        workers: Vec<WorkerSpec>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            query: query.into(),
            workers,
            results: ResultSet::new(),
            events: Vec::new(),
            synthesis: None,
            status: SessionStatus::Initialized,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn workers(&self) -> &[WorkerSpec] {
        &self.workers
    }

    pub fn worker(&self, id: &str) -> Option<&WorkerSpec> {
        self.workers.iter().find(|w| w.id == id)
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn synthesis(&self) -> Option<&str> {
        self.synthesis.as_deref()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Move to `next`, rejecting any backward or skipping transition
    pub fn transition(&mut self, next: SessionStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::IllegalTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    pub fn record_result(&mut self, result: WorkerResult) -> Result<(), DomainError> {
        self.results.insert(result)
    }

    pub fn set_synthesis(&mut self, text: impl Into<String>) {
        self.synthesis = Some(text.into());
    }

    /// Attach the final event log
    pub fn set_events(&mut self, events: Vec<Event>) {
        self.events = events;
    }

    /// Events of one kind, in log order
    pub fn events_of(&self, kind: EventKind) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.kind == kind)
    }
}
