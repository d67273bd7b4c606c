//! JSONL file writer for coordination events.
//!
//! Each [`Event`] is written as a single JSON line carrying `session_id`,
//! `sequence`, `kind` and `timestamp`, with the event payload's fields merged
//! in at the top level.

use council_application::ports::event_sink::EventSink;
use council_domain::Event;
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL trace writer, one JSON object per event.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every line and on
/// `Drop`.
pub struct JsonlEventSink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlEventSink {
    /// Create a sink appending to the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create trace directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open trace file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Create a sink writing to `<dir>/<session_id>.trace.jsonl`
    pub fn for_session(dir: impl AsRef<Path>, session_id: &str) -> Option<Self> {
        let file_name: String = session_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        Self::new(dir.as_ref().join(format!("{}.trace.jsonl", file_name)))
    }

    /// Get the path to the trace file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record_line(session_id: &str, event: &Event) -> Value {
        let mut map = Map::new();
        map.insert("session_id".into(), Value::from(session_id));
        map.insert("sequence".into(), Value::from(event.sequence));
        map.insert("kind".into(), Value::from(event.kind.as_str()));
        map.insert(
            "timestamp".into(),
            Value::from(
                event
                    .timestamp
                    .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            ),
        );

        match &event.payload {
            Value::Object(fields) => {
                for (key, value) in fields {
                    map.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
            Value::Null => {}
            other => {
                map.insert("data".into(), other.clone());
            }
        }

        Value::Object(map)
    }
}

impl EventSink for JsonlEventSink {
    fn record(&self, session_id: &str, event: &Event) {
        let Ok(line) = serde_json::to_string(&Self::record_line(session_id, event)) else {
            return;
        };

        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        if let Err(e) = writeln!(writer, "{}", line) {
            warn!("Could not write trace line to {}: {}", self.path.display(), e);
            return;
        }
        // One flush per line
        let _ = writer.flush();
    }
}

impl Drop for JsonlEventSink {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use council_domain::EventKind;
    use serde_json::json;

    fn event(sequence: u64, kind: EventKind, payload: Value) -> Event {
        Event {
            sequence,
            kind,
            timestamp: Utc::now(),
            payload,
        }
    }

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.trace.jsonl");
        let sink = JsonlEventSink::new(&path).unwrap();

        sink.record(
            "s-1",
            &event(0, EventKind::StepStarted, json!({ "step": 0, "worker_ids": ["a"] })),
        );
        sink.record(
            "s-1",
            &event(
                1,
                EventKind::WorkerFailed,
                json!({ "worker_id": "a", "error_kind": "timeout" }),
            ),
        );
        drop(sink);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);

        assert_eq!(lines[0]["session_id"], "s-1");
        assert_eq!(lines[0]["sequence"], 0);
        assert_eq!(lines[0]["kind"], "step_started");
        assert_eq!(lines[0]["worker_ids"][0], "a");
        assert!(lines[0]["timestamp"].is_string());

        assert_eq!(lines[1]["kind"], "worker_failed");
        assert_eq!(lines[1]["error_kind"], "timeout");
    }

    #[test]
    fn test_payload_cannot_shadow_envelope_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.jsonl");
        let sink = JsonlEventSink::new(&path).unwrap();

        sink.record(
            "real",
            &event(3, EventKind::SessionFailed, json!({ "session_id": "fake", "tier": "plan" })),
        );
        sink.record("real", &event(4, EventKind::StepCompleted, json!("plain")));
        drop(sink);

        let lines = read_lines(&path);
        assert_eq!(lines[0]["session_id"], "real");
        assert_eq!(lines[0]["tier"], "plan");
        assert_eq!(lines[1]["data"], "plain");
    }

    #[test]
    fn test_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("a.jsonl");

        for seq in 0..2 {
            let sink = JsonlEventSink::new(&path).unwrap();
            sink.record("s", &event(seq, EventKind::AgentRegistered, json!({})));
        }

        assert_eq!(read_lines(&path).len(), 2);
    }

    #[test]
    fn test_for_session_sanitizes_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlEventSink::for_session(dir.path(), "team/alpha 1").unwrap();
        assert_eq!(
            sink.path().file_name().unwrap().to_string_lossy(),
            "team_alpha_1.trace.jsonl"
        );
    }
}
