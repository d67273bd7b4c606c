//! Per-session event trace and the engine's session registry.
//!
//! A [`SessionTrace`] wraps the session's [`EventLog`] behind a mutex that is
//! held only for the append itself; the engine's step loop is its only
//! writer. Readers either poll [`events_since`](SessionTrace::events_since)
//! or await [`wait_for`](SessionTrace::wait_for), which wakes on every append
//! and status change instead of re-reading the whole history.

use crate::ports::event_sink::EventSink;
use council_domain::{Event, EventKind, EventLog, SessionStatus};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::watch;

/// Live, read-mostly view of one session
pub struct SessionTrace {
    session_id: String,
    log: Mutex<EventLog>,
    status: Mutex<SessionStatus>,
    /// Bumped on every append and status change
    version: watch::Sender<u64>,
    claimed: AtomicBool,
    sink: Arc<dyn EventSink>,
}

impl SessionTrace {
    pub fn new(session_id: impl Into<String>, sink: Arc<dyn EventSink>) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            session_id: session_id.into(),
            log: Mutex::new(EventLog::new()),
            status: Mutex::new(SessionStatus::Initialized),
            version,
            claimed: AtomicBool::new(false),
            sink,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Append an event; returns its sequence number.
    pub fn append(&self, kind: EventKind, payload: Value) -> u64 {
        let sequence = {
            let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
            let sequence = log.append(kind, payload);
            if let Some(event) = log.last() {
                self.sink.record(&self.session_id, event);
            }
            sequence
        };
        self.version.send_modify(|v| *v += 1);
        sequence
    }

    /// Events with `sequence >= from`
    pub fn events_since(&self, from: u64) -> Vec<Event> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .since(from)
            .to_vec()
    }

    /// Full copy of the log
    pub fn snapshot(&self) -> Vec<Event> {
        self.events_since(0)
    }

    pub fn len(&self) -> usize {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_status(&self, status: SessionStatus) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
        self.version.send_modify(|v| *v += 1);
    }

    /// Wait until events with `sequence >= from` exist, or the session has
    /// ended. Returns an empty vector only for an ended session with nothing
    /// new.
    pub async fn wait_for(&self, from: u64) -> Vec<Event> {
        let mut changes = self.version.subscribe();
        loop {
            let events = self.events_since(from);
            if !events.is_empty() || self.status().is_terminal() {
                return events;
            }
            if changes.changed().await.is_err() {
                return self.events_since(from);
            }
        }
    }

    /// Mark the trace as taken by a run; false if a run already owns it
    pub(crate) fn claim(&self) -> bool {
        !self.claimed.swap(true, Ordering::AcqRel)
    }
}

impl std::fmt::Debug for SessionTrace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTrace")
            .field("session_id", &self.session_id)
            .field("events", &self.len())
            .field("status", &self.status())
            .finish()
    }
}

/// Traces of all sessions an engine knows about, keyed by session id
///
/// A trace stays here after its session ends, so late consumers can still
/// read the log. It leaves only through [`SessionRegistry::remove`] or
/// [`SessionRegistry::prune_finished`].
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<SessionTrace>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trace for `session_id` ahead of the run, so a consumer can
    /// start waiting before the session begins. Returns the existing trace if
    /// one is already registered.
    pub fn open(&self, session_id: &str, sink: &Arc<dyn EventSink>) -> Arc<SessionTrace> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            sessions
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(SessionTrace::new(session_id, Arc::clone(sink)))),
        )
    }

    /// Trace for a run that is about to start; `None` if another run already
    /// owns `session_id`.
    pub(crate) fn claim(
        &self,
        session_id: &str,
        sink: &Arc<dyn EventSink>,
    ) -> Option<Arc<SessionTrace>> {
        let trace = self.open(session_id, sink);
        trace.claim().then_some(trace)
    }

    pub fn get(&self, session_id: &str) -> Option<Arc<SessionTrace>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .cloned()
    }

    /// Drop a session's trace; returns whether one existed
    pub fn remove(&self, session_id: &str) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session_id)
            .is_some()
    }

    /// Drop every trace whose session has ended and that nobody outside the
    /// registry still holds; returns the removed ids, sorted
    pub fn prune_finished(&self) -> Vec<String> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let mut removed: Vec<String> = sessions
            .iter()
            .filter(|(_, trace)| trace.status().is_terminal() && Arc::strong_count(trace) == 1)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &removed {
            sessions.remove(id);
        }
        removed.sort();
        removed
    }

    pub fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }
}
