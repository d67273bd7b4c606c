//! Port for recording coordination events outside the process.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while an [`EventSink`] receives the exact
//! event records of every session in sequence order (e.g. a JSONL trace).

use council_domain::Event;

/// Receiver of every event appended to a session's log.
///
/// Called while the session's log is locked, so records arrive in sequence
/// order. Intentionally synchronous and non-fallible; sink failures must not
/// disturb the session.
pub trait EventSink: Send + Sync {
    fn record(&self, session_id: &str, event: &Event);
}

/// No-op implementation for tests and when tracing to a file is disabled.
pub struct NoEventSink;

impl EventSink for NoEventSink {
    fn record(&self, _session_id: &str, _event: &Event) {}
}
