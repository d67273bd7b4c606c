//! One-line rendering of coordination events for `--stream`

use colored::Colorize;
use council_domain::core::string::{single_line, truncate};
use council_domain::{Event, EventKind};
use serde_json::Value;

/// Longest error message shown on one event line
const MAX_ERROR_LEN: usize = 160;

/// Formats events as they arrive from the engine
pub struct EventPrinter;

impl EventPrinter {
    /// `[sequence] kind detail`
    pub fn format(event: &Event) -> String {
        let kind = match event.kind {
            EventKind::WorkerSucceeded | EventKind::SynthesisCompleted => {
                if event.payload.get("failed").and_then(Value::as_bool) == Some(true) {
                    event.kind.as_str().yellow()
                } else {
                    event.kind.as_str().green()
                }
            }
            EventKind::WorkerFailed | EventKind::SessionFailed => event.kind.as_str().red(),
            EventKind::StepStarted | EventKind::SynthesisStarted => event.kind.as_str().cyan(),
            _ => event.kind.as_str().normal(),
        };

        let detail = Self::detail(event);
        if detail.is_empty() {
            format!("{} {}", format!("[{:03}]", event.sequence).dimmed(), kind)
        } else {
            format!(
                "{} {} {}",
                format!("[{:03}]", event.sequence).dimmed(),
                kind,
                detail
            )
        }
    }

    fn detail(event: &Event) -> String {
        let p = &event.payload;
        let str_of = |key: &str| p.get(key).and_then(Value::as_str).unwrap_or("");
        let duration = p
            .get("duration_ms")
            .and_then(Value::as_u64)
            .map(|ms| format!(" ({}ms)", ms))
            .unwrap_or_default();

        match event.kind {
            EventKind::AgentRegistered => {
                format!("{} [{}]", str_of("display_name"), str_of("role"))
            }
            EventKind::StepStarted => {
                let ids = p
                    .get("worker_ids")
                    .and_then(Value::as_array)
                    .map(|ids| {
                        ids.iter()
                            .filter_map(Value::as_str)
                            .collect::<Vec<_>>()
                            .join(", ")
                    })
                    .unwrap_or_default();
                format!("{} #{}: {}", str_of("type"), Self::step_index(p), ids)
            }
            EventKind::StepCompleted => format!(
                "{} #{}: {} ok, {} failed",
                str_of("type"),
                Self::step_index(p),
                p.get("succeeded").and_then(Value::as_u64).unwrap_or(0),
                p.get("failed").and_then(Value::as_u64).unwrap_or(0)
            ),
            EventKind::WorkerSucceeded => format!("{}{}", str_of("worker_id"), duration),
            EventKind::WorkerFailed => format!(
                "{}{}: {} ({})",
                str_of("worker_id"),
                duration,
                truncate(&single_line(str_of("error")), MAX_ERROR_LEN),
                str_of("error_kind")
            ),
            EventKind::SynthesisStarted => format!(
                "{} over {} result(s)",
                str_of("worker_id"),
                p.get("inputs").and_then(Value::as_u64).unwrap_or(0)
            ),
            EventKind::SynthesisCompleted => {
                if p.get("failed").and_then(Value::as_bool) == Some(true) {
                    format!(
                        "{}{}: fell back after {}",
                        str_of("worker_id"),
                        duration,
                        str_of("error_kind")
                    )
                } else {
                    format!("{}{}", str_of("worker_id"), duration)
                }
            }
            EventKind::SessionFailed => format!(
                "[{}] {}",
                str_of("tier"),
                truncate(&single_line(str_of("error")), MAX_ERROR_LEN)
            ),
        }
    }

    fn step_index(payload: &Value) -> u64 {
        payload.get("step").and_then(Value::as_u64).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn event(sequence: u64, kind: EventKind, payload: Value) -> Event {
        Event {
            sequence,
            kind,
            timestamp: Utc::now(),
            payload,
        }
    }

    #[test]
    fn test_worker_events() {
        colored::control::set_override(false);

        let ok = event(
            3,
            EventKind::WorkerSucceeded,
            json!({ "worker_id": "alice", "duration_ms": 1234, "text": "hi" }),
        );
        assert_eq!(EventPrinter::format(&ok), "[003] worker_succeeded alice (1234ms)");

        let failed = event(
            4,
            EventKind::WorkerFailed,
            json!({
                "worker_id": "bob",
                "duration_ms": 30000,
                "error_kind": "timeout",
                "error": "timed out after 30000ms"
            }),
        );
        assert_eq!(
            EventPrinter::format(&failed),
            "[004] worker_failed bob (30000ms): timed out after 30000ms (timeout)"
        );
    }

    #[test]
    fn test_step_events() {
        colored::control::set_override(false);

        let started = event(
            2,
            EventKind::StepStarted,
            json!({ "step": 0, "type": "parallel_batch", "worker_ids": ["a", "b"] }),
        );
        assert_eq!(
            EventPrinter::format(&started),
            "[002] step_started parallel_batch #0: a, b"
        );

        let completed = event(
            5,
            EventKind::StepCompleted,
            json!({ "step": 0, "type": "parallel_batch", "succeeded": 1, "failed": 1 }),
        );
        assert_eq!(
            EventPrinter::format(&completed),
            "[005] step_completed parallel_batch #0: 1 ok, 1 failed"
        );
    }

    #[test]
    fn test_session_failed() {
        colored::control::set_override(false);

        let failed = event(
            0,
            EventKind::SessionFailed,
            json!({ "tier": "plan", "error": "Plan failure: Duplicate worker id: a" }),
        );
        assert_eq!(
            EventPrinter::format(&failed),
            "[000] session_failed [plan] Plan failure: Duplicate worker id: a"
        );
    }
}
