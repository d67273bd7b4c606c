//! Worker execution
//!
//! Turns one worker's identity plus the shared query into a completion
//! request and wraps whatever comes back into a [`WorkerResult`]. A worker
//! never fails past this boundary: backend errors, timeouts and even panics
//! become failure results.

use crate::ports::completion_client::{CompletionClient, CompletionError};
use council_domain::{ErrorKind, PromptTemplate, ResultSet, WorkerResult, WorkerRole, WorkerSpec};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// One persona, synthesizer or coordinator, ready to run
#[derive(Debug, Clone)]
pub struct Worker {
    spec: WorkerSpec,
}

impl Worker {
    pub fn new(spec: WorkerSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &WorkerSpec {
        &self.spec
    }

    pub fn id(&self) -> &str {
        &self.spec.id
    }

    /// Run the worker against `query`.
    ///
    /// Personas ignore `peer_results`; the synthesizer reads all of them.
    /// The call is bounded by `timeout` even if the client ignores it.
    pub async fn execute<C: CompletionClient + ?Sized>(
        &self,
        client: &C,
        query: &str,
        peer_results: &ResultSet,
        timeout: Duration,
    ) -> WorkerResult {
        let start = Instant::now();
        let (prompt, system) = self.build_prompt(query, peer_results);

        debug!(
            "Worker {} ({}) sending {} byte prompt",
            self.spec.id,
            self.spec.role,
            prompt.len()
        );

        let response =
            match tokio::time::timeout(timeout, client.complete(&prompt, Some(&system), timeout))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(CompletionError::Timeout),
            };

        let elapsed = elapsed_ms(start);
        match response {
            Ok(text) => WorkerResult::success(&self.spec.id, text, elapsed),
            Err(e) => {
                warn!("Worker {} failed: {}", self.spec.id, e);
                WorkerResult::failure(&self.spec.id, e.kind(), summarize(&e, timeout), elapsed)
            }
        }
    }

    /// [`execute`](Self::execute), with a panic inside the worker turned into
    /// a [`ErrorKind::Panicked`] result.
    pub async fn execute_isolated<C: CompletionClient + ?Sized>(
        &self,
        client: &C,
        query: &str,
        peer_results: &ResultSet,
        timeout: Duration,
    ) -> WorkerResult {
        let start = Instant::now();
        match AssertUnwindSafe(self.execute(client, query, peer_results, timeout))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!("Worker {} panicked: {}", self.spec.id, message);
                WorkerResult::failure(
                    &self.spec.id,
                    ErrorKind::Panicked,
                    format!("worker panicked: {}", message),
                    elapsed_ms(start),
                )
            }
        }
    }

    fn build_prompt(&self, query: &str, peer_results: &ResultSet) -> (String, String) {
        match self.spec.role {
            WorkerRole::Persona => (
                PromptTemplate::persona_prompt(&self.spec, query),
                PromptTemplate::persona_system(&self.spec.display_name),
            ),
            WorkerRole::Synthesizer => (
                PromptTemplate::synthesis_prompt(query, peer_results),
                PromptTemplate::synthesis_system().to_string(),
            ),
            // Only reachable by calling a coordinator directly
            WorkerRole::Coordinator => (
                PromptTemplate::coordinator_prompt(&self.spec, query),
                PromptTemplate::coordinator_system(&self.spec),
            ),
        }
    }
}

fn summarize(error: &CompletionError, timeout: Duration) -> String {
    match error {
        CompletionError::Timeout => format!("timed out after {}ms", timeout.as_millis()),
        other => other.to_string(),
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use council_domain::PersonaAttributes;
    use std::sync::Mutex;

    /// Records every prompt and answers with a fixed result
    struct RecordingClient {
        reply: Result<String, CompletionError>,
        prompts: Mutex<Vec<(String, Option<String>)>>,
    }

    impl RecordingClient {
        fn replying(reply: Result<String, CompletionError>) -> Self {
            Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for RecordingClient {
        async fn complete(
            &self,
            prompt: &str,
            system_prompt: Option<&str>,
            _timeout: Duration,
        ) -> Result<String, CompletionError> {
            self.prompts
                .lock()
                .unwrap()
                .push((prompt.to_string(), system_prompt.map(String::from)));
            self.reply.clone()
        }
    }

    struct SlowClient;

    #[async_trait]
    impl CompletionClient for SlowClient {
        async fn complete(
            &self,
            _prompt: &str,
            _system_prompt: Option<&str>,
            _timeout: Duration,
        ) -> Result<String, CompletionError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    struct PanickingClient;

    #[async_trait]
    impl CompletionClient for PanickingClient {
        async fn complete(
            &self,
            _prompt: &str,
            _system_prompt: Option<&str>,
            _timeout: Duration,
        ) -> Result<String, CompletionError> {
            panic!("backend exploded");
        }
    }

    fn persona() -> Worker {
        Worker::new(WorkerSpec::persona(
            "maya",
            PersonaAttributes::named("Maya").with_perspective("Pragmatic"),
        ))
    }

    #[tokio::test]
    async fn test_coordinator_runs_when_called_directly() {
        let client = RecordingClient::replying(Ok("Pick Lisbon.".to_string()));
        let coordinator = Worker::new(WorkerSpec::new("lead", "Lead", WorkerRole::Coordinator));

        let result = coordinator
            .execute(&client, "Which city?", &ResultSet::new(), Duration::from_secs(1))
            .await;

        assert_eq!(result.worker_id, "lead");
        assert_eq!(result.text(), Some("Pick Lisbon."));
        let prompts = client.prompts.lock().unwrap();
        assert!(prompts[0].0.starts_with("You are Lead, a coordinator."));
        assert!(prompts[0].1.as_deref().unwrap().contains("expert coordinator"));
    }

    #[tokio::test]
    async fn test_persona_success() {
        let client = RecordingClient::replying(Ok("I would wait.".to_string()));
        let result = persona()
            .execute(&client, "Buy now?", &ResultSet::new(), Duration::from_secs(1))
            .await;

        assert_eq!(result.worker_id, "maya");
        assert_eq!(result.text(), Some("I would wait."));

        let prompts = client.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].0.contains("Perspective: Pragmatic"));
        assert!(prompts[0].0.contains("Buy now?"));
        assert!(prompts[0].1.as_deref().unwrap().contains("Maya"));
    }

    #[tokio::test]
    async fn test_persona_ignores_peer_results() {
        let client = RecordingClient::replying(Ok("ok".to_string()));
        let mut peers = ResultSet::new();
        peers
            .insert(WorkerResult::success("other", "SECRET PEER TEXT", 1))
            .unwrap();

        persona()
            .execute(&client, "q", &peers, Duration::from_secs(1))
            .await;

        let prompts = client.prompts.lock().unwrap();
        assert!(!prompts[0].0.contains("SECRET PEER TEXT"));
    }

    #[tokio::test]
    async fn test_synthesizer_reads_peer_results() {
        let client = RecordingClient::replying(Ok("merged".to_string()));
        let mut peers = ResultSet::new();
        peers.insert(WorkerResult::success("maya", "wait", 1)).unwrap();
        peers
            .insert(WorkerResult::failure("jo", ErrorKind::Upstream, "HTTP 500", 1))
            .unwrap();

        let result = Worker::new(WorkerSpec::synthesizer("synth"))
            .execute(&client, "Buy now?", &peers, Duration::from_secs(1))
            .await;

        assert_eq!(result.text(), Some("merged"));
        let prompts = client.prompts.lock().unwrap();
        assert!(prompts[0].0.contains("\"maya\""));
        assert!(prompts[0].0.contains("\"jo\""));
        assert!(prompts[0].0.contains("Buy now?"));
    }

    #[tokio::test]
    async fn test_client_error_becomes_failure_result() {
        let client = RecordingClient::replying(Err(CompletionError::Upstream {
            status_code: 502,
            body: "bad gateway".into(),
        }));
        let result = persona()
            .execute(&client, "q", &ResultSet::new(), Duration::from_secs(1))
            .await;

        assert_eq!(result.error_kind(), Some(ErrorKind::Upstream));
        assert!(result.error_message().unwrap().contains("502"));
        assert!(result.text().is_none());
    }

    #[tokio::test]
    async fn test_timeout_enforced_even_if_client_ignores_it() {
        let result = persona()
            .execute(&SlowClient, "q", &ResultSet::new(), Duration::from_millis(20))
            .await;

        assert_eq!(result.error_kind(), Some(ErrorKind::Timeout));
        assert_eq!(result.error_message(), Some("timed out after 20ms"));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let result = persona()
            .execute_isolated(&PanickingClient, "q", &ResultSet::new(), Duration::from_secs(1))
            .await;

        assert_eq!(result.error_kind(), Some(ErrorKind::Panicked));
        assert!(result.error_message().unwrap().contains("backend exploded"));
    }
}
