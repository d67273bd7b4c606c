//! Console output formatter for finished sessions

use colored::Colorize;
use council_domain::{EventKind, Session, SessionStatus, WorkerOutcome};

/// Formats session results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete session: every result, then the synthesis
    pub fn format(session: &Session) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Persona Council Results"));
        output.push('\n');

        output.push_str(&format!("{} {}\n\n", "Query:".cyan().bold(), session.query()));
        output.push_str(&format!(
            "{} {}\n\n",
            "Personas:".cyan().bold(),
            Self::persona_names(session)
        ));

        output.push_str(&Self::section_header("Persona Responses"));
        if session.results().is_empty() {
            output.push_str(&format!("\n{}\n", "(no responses)".dimmed()));
        }
        for result in session.results() {
            let name = Self::display_name(session, &result.worker_id);
            match &result.outcome {
                WorkerOutcome::Success { text } => {
                    output.push_str(&format!(
                        "\n{} {}\n{}\n",
                        format!("── {} ──", name).yellow().bold(),
                        format!("({}ms)", result.duration_ms).dimmed(),
                        text
                    ));
                }
                WorkerOutcome::Failure {
                    error_kind,
                    message,
                } => {
                    output.push_str(&format!(
                        "\n{}\nError ({}): {}\n",
                        format!("── {} ──", name).red().bold(),
                        error_kind,
                        message
                    ));
                }
            }
        }

        if let Some(synthesis) = session.synthesis() {
            output.push_str(&Self::section_header("Synthesis"));
            output.push_str(&format!("\n{}\n", synthesis));
        }

        if let Some(reason) = Self::failure_reason(session) {
            output.push_str(&format!("\n{} {}\n", "Session failed:".red().bold(), reason));
        }

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(session: &Session) -> String {
        serde_json::to_string_pretty(session).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format synthesis only (concise output)
    pub fn format_synthesis_only(session: &Session) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== Persona Council Synthesis ===".cyan().bold()
        ));

        output.push_str(&format!("{} {}\n\n", "Q:".bold(), session.query()));

        output.push_str(&format!(
            "{} {}\n\n",
            "Personas consulted:".dimmed(),
            Self::persona_names(session)
        ));

        let failed = session.results().failures().count();
        if failed > 0 {
            output.push_str(&format!(
                "{}\n\n",
                format!(
                    "{} of {} persona(s) could not answer",
                    failed,
                    session.results().len()
                )
                .yellow()
            ));
        }

        match (session.synthesis(), Self::failure_reason(session)) {
            (_, Some(reason)) => {
                output.push_str(&format!("{} {}\n", "Session failed:".red().bold(), reason));
            }
            (Some(synthesis), None) => {
                output.push_str(synthesis);
                output.push('\n');
            }
            (None, None) => {
                // No synthesizer: fall back to the raw answers
                for result in session.results().successes() {
                    output.push_str(&format!(
                        "{}\n{}\n\n",
                        Self::display_name(session, &result.worker_id).yellow().bold(),
                        result.text().unwrap_or_default()
                    ));
                }
            }
        }

        output
    }

    /// The `error` of the session's `session_failed` event, if it failed
    pub fn failure_reason(session: &Session) -> Option<String> {
        if session.status() != SessionStatus::Failed {
            return None;
        }
        let reason = session
            .events_of(EventKind::SessionFailed)
            .last()
            .and_then(|e| e.payload.get("error"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown failure");
        Some(reason.to_string())
    }

    fn persona_names(session: &Session) -> String {
        let names: Vec<&str> = session
            .workers()
            .iter()
            .filter(|w| w.role == council_domain::WorkerRole::Persona)
            .map(|w| w.display_name.as_str())
            .collect();
        if names.is_empty() {
            "none".to_string()
        } else {
            names.join(", ")
        }
    }

    fn display_name<'a>(session: &'a Session, worker_id: &'a str) -> &'a str {
        session
            .worker(worker_id)
            .map(|w| w.display_name.as_str())
            .unwrap_or(worker_id)
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{ErrorKind, PersonaAttributes, WorkerResult, WorkerSpec};
    use serde_json::json;

    fn finished_session() -> Session {
        let mut session = Session::new(
            "s-1",
            "Would you buy an e-bike?",
            vec![
                WorkerSpec::persona("p1", PersonaAttributes::named("Maya")),
                WorkerSpec::persona("p2", PersonaAttributes::named("Jo")),
                WorkerSpec::synthesizer("synthesizer"),
            ],
        );
        session.transition(SessionStatus::Running).unwrap();
        session
            .record_result(WorkerResult::success("p1", "Yes, for commuting.", 120))
            .unwrap();
        session
            .record_result(WorkerResult::failure(
                "p2",
                ErrorKind::Timeout,
                "timed out after 30000ms",
                30000,
            ))
            .unwrap();
        session.set_synthesis("Mixed interest; price matters.");
        session.transition(SessionStatus::Completed).unwrap();
        session
    }

    #[test]
    fn test_full_format_lists_every_result() {
        let output = ConsoleFormatter::format(&finished_session());

        assert!(output.contains("Would you buy an e-bike?"));
        assert!(output.contains("Maya"));
        assert!(output.contains("Yes, for commuting."));
        assert!(output.contains("Jo"));
        assert!(output.contains("timed out after 30000ms"));
        assert!(output.contains("Mixed interest; price matters."));
        assert!(!output.contains("Session failed"));
    }

    #[test]
    fn test_synthesis_only() {
        let output = ConsoleFormatter::format_synthesis_only(&finished_session());

        assert!(output.contains("Mixed interest; price matters."));
        assert!(output.contains("1 of 2 persona(s) could not answer"));
        assert!(!output.contains("Yes, for commuting."));
    }

    #[test]
    fn test_synthesis_only_without_synthesizer_shows_answers() {
        let mut session = Session::new(
            "s",
            "q",
            vec![WorkerSpec::persona("p1", PersonaAttributes::named("Maya"))],
        );
        session.transition(SessionStatus::Running).unwrap();
        session
            .record_result(WorkerResult::success("p1", "An answer", 5))
            .unwrap();
        session.transition(SessionStatus::Completed).unwrap();

        let output = ConsoleFormatter::format_synthesis_only(&session);
        assert!(output.contains("An answer"));
    }

    #[test]
    fn test_failed_session_shows_reason() {
        let mut session = Session::new("s", "q", vec![]);
        session.transition(SessionStatus::Failed).unwrap();
        let mut log = council_domain::EventLog::new();
        log.append(
            EventKind::SessionFailed,
            json!({ "tier": "plan", "error": "Plan failure: Duplicate worker id: p1" }),
        );
        session.set_events(log.into_events());

        assert_eq!(
            ConsoleFormatter::failure_reason(&session).as_deref(),
            Some("Plan failure: Duplicate worker id: p1")
        );
        let output = ConsoleFormatter::format_synthesis_only(&session);
        assert!(output.contains("Duplicate worker id: p1"));
    }

    #[test]
    fn test_json_output_shape() {
        let output = ConsoleFormatter::format_json(&finished_session());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["session_id"], "s-1");
        assert_eq!(value["status"], "completed");
        assert_eq!(value["synthesis"], "Mixed interest; price matters.");
        assert_eq!(value["results"][0]["worker_id"], "p1");
        assert_eq!(value["results"][0]["text"], "Yes, for commuting.");
        assert_eq!(value["results"][1]["error_kind"], "timeout");
        assert!(value["events"].is_array());
    }
}
