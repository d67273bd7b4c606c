//! Append-only event log for one session.
//!
//! Sequence numbers start at 0 and equal the event's index in the log, so
//! `since(n)` is a slice and never copies history a reader already has.
//! The log itself is not synchronized; the application layer wraps it so
//! that appends are serialized.

use super::event::{Event, EventKind};
use chrono::Utc;
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return the sequence number it was given
    pub fn append(&mut self, kind: EventKind, payload: Value) -> u64 {
        let sequence = self.events.len() as u64;
        self.events.push(Event {
            sequence,
            kind,
            timestamp: Utc::now(),
            payload,
        });
        sequence
    }

    /// Events with `sequence >= from`, oldest first
    pub fn since(&self, from: u64) -> &[Event] {
        let start = usize::try_from(from)
            .unwrap_or(usize::MAX)
            .min(self.events.len());
        &self.events[start..]
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Sequence number the next append will receive
    pub fn next_sequence(&self) -> u64 {
        self.events.len() as u64
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}
