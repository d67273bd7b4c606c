//! Run Session use case
//!
//! The coordination engine: builds the plan for a session's workers, runs its
//! steps in order (parallel fan-out/fan-in for the batch, one call for
//! synthesis) and records everything it does in the session's event log.
//!
//! # Two failure tiers
//!
//! A worker failure is data: it lands in the worker's [`WorkerResult`] and the
//! session carries on. A [`SessionFailure`] (unplannable input, an
//! orchestration fault, cancellation) ends the session in `Failed`, but
//! [`CoordinationEngine::run_session`] still returns a complete [`Session`]
//! whose last event is `session_failed`.
//!
//! # Streaming
//!
//! Every session's log lives in a [`SessionTrace`] registered under its id.
//! Other tasks follow a running session with
//! [`events_since`](CoordinationEngine::events_since) or
//! [`wait_for_events`](CoordinationEngine::wait_for_events); call
//! [`open`](CoordinationEngine::open) first to attach before the run starts.

mod trace;
mod types;

pub use trace::{SessionRegistry, SessionTrace};
pub use types::{RunSessionInput, SessionFailure};

use crate::config::EngineConfig;
use crate::ports::completion_client::CompletionClient;
use crate::ports::event_sink::{EventSink, NoEventSink};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::execute_worker::{Worker, panic_message};
use council_domain::{
    CoordinationPlan, Event, EventKind, PlanBuilder, Query, Session, SessionStatus, Step,
    WorkerOutcome, WorkerResult,
};
use futures::FutureExt;
use serde_json::{Value, json};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Coordinates persona workers over one shared completion client
pub struct CoordinationEngine<C: CompletionClient + 'static> {
    client: Arc<C>,
    config: EngineConfig,
    registry: SessionRegistry,
    sink: Arc<dyn EventSink>,
}

impl<C: CompletionClient + 'static> CoordinationEngine<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self::with_config(client, EngineConfig::default())
    }

    pub fn with_config(client: Arc<C>, config: EngineConfig) -> Self {
        Self {
            client,
            config,
            registry: SessionRegistry::new(),
            sink: Arc::new(NoEventSink),
        }
    }

    /// Send every appended event to `sink` as well
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Register `session_id` ahead of its run so consumers can wait on it
    pub fn open(&self, session_id: &str) -> Arc<SessionTrace> {
        self.registry.open(session_id, &self.sink)
    }

    /// Run a session to completion with no progress reporting
    pub async fn run_session(&self, input: RunSessionInput) -> Session {
        self.run_session_with_progress(input, &NoProgress).await
    }

    /// Run a session to completion, reporting step progress
    ///
    /// Never fails: the returned session is always terminal.
    pub async fn run_session_with_progress(
        &self,
        input: RunSessionInput,
        progress: &dyn ProgressNotifier,
    ) -> Session {
        let RunSessionInput {
            session_id,
            query,
            workers,
            cancel,
        } = input;
        let session = Session::new(&session_id, query, workers);

        let Some(trace) = self.registry.claim(&session_id, &self.sink) else {
            // Report on a detached trace; the live one belongs to the other run.
            let detached = SessionTrace::new(&session_id, Arc::new(NoEventSink));
            return self.finish_failed(
                session,
                &detached,
                SessionFailure::InvalidInput(format!(
                    "session id '{}' is already in use",
                    session_id
                )),
            );
        };

        info!(
            "Starting session {} with {} worker(s)",
            session_id,
            session.workers().len()
        );

        let plan = match Self::plan(&session) {
            Ok(plan) => plan,
            Err(failure) => return self.finish_failed(session, &trace, failure),
        };
        debug!(
            "Session {}: plan has {} step(s): {}",
            session_id,
            plan.len(),
            plan.steps()
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        self.run_planned(session, plan, &trace, &cancel, progress)
            .await
    }

    async fn run_planned(
        &self,
        mut session: Session,
        plan: CoordinationPlan,
        trace: &SessionTrace,
        cancel: &CancellationToken,
        progress: &dyn ProgressNotifier,
    ) -> Session {
        for worker in session.workers() {
            trace.append(
                EventKind::AgentRegistered,
                json!({
                    "worker_id": worker.id,
                    "display_name": worker.display_name,
                    "role": worker.role.as_str(),
                }),
            );
        }

        if let Err(e) = session.transition(SessionStatus::Running) {
            let failure = SessionFailure::EngineFault(e.to_string());
            return self.finish_failed(session, trace, failure);
        }
        trace.set_status(SessionStatus::Running);

        let execution = self.execute_plan(&plan, &mut session, trace, cancel, progress);
        let outcome = AssertUnwindSafe(execution)
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(SessionFailure::EngineFault(format!(
                    "orchestration panicked: {}",
                    panic_message(panic.as_ref())
                )))
            });

        match outcome {
            Ok(()) => self.finish_completed(session, trace),
            Err(failure) => self.finish_failed(session, trace, failure),
        }
    }

    fn plan(session: &Session) -> Result<CoordinationPlan, SessionFailure> {
        Query::try_new(session.query())
            .map_err(|e| SessionFailure::InvalidInput(e.to_string()))?;
        Ok(PlanBuilder::build(session.workers())?)
    }

    async fn execute_plan(
        &self,
        plan: &CoordinationPlan,
        session: &mut Session,
        trace: &SessionTrace,
        cancel: &CancellationToken,
        progress: &dyn ProgressNotifier,
    ) -> Result<(), SessionFailure> {
        for (index, step) in plan.steps().iter().enumerate() {
            if cancel.is_cancelled() {
                info!(
                    "Session {} cancelled before step {}",
                    session.session_id(),
                    index
                );
                return Err(SessionFailure::Cancelled);
            }

            match step {
                Step::ParallelBatch { worker_ids } => {
                    self.run_batch(index, step, worker_ids, session, trace, progress)
                        .await?
                }
                Step::Synthesize { worker_id } => {
                    self.run_synthesis(index, step, worker_id, session, trace, progress)
                        .await?
                }
            }
        }
        Ok(())
    }

    /// Fan out one task per worker over the same results snapshot, then
    /// record results in completion order.
    async fn run_batch(
        &self,
        index: usize,
        step: &Step,
        worker_ids: &[String],
        session: &mut Session,
        trace: &SessionTrace,
        progress: &dyn ProgressNotifier,
    ) -> Result<(), SessionFailure> {
        info!(
            "Session {}: step {} running {} worker(s)",
            session.session_id(),
            index,
            worker_ids.len()
        );
        trace.append(
            EventKind::StepStarted,
            json!({ "step": index, "type": step.as_str(), "worker_ids": worker_ids }),
        );
        progress.on_step_start(step, worker_ids.len());

        let snapshot = Arc::new(session.results().clone());
        let query: Arc<str> = Arc::from(session.query());
        let limiter = self.config.max_concurrency.map(|n| Arc::new(Semaphore::new(n)));
        let timeout = self.config.worker_timeout;

        let mut join_set = JoinSet::new();

        for id in worker_ids {
            let spec = session.worker(id).cloned().ok_or_else(|| {
                SessionFailure::EngineFault(format!("plan references unknown worker '{}'", id))
            })?;
            let worker = Worker::new(spec);
            let client = Arc::clone(&self.client);
            let snapshot = Arc::clone(&snapshot);
            let query = Arc::clone(&query);
            let limiter = limiter.clone();

            join_set.spawn(async move {
                let _permit = match &limiter {
                    Some(semaphore) => semaphore.acquire().await.ok(),
                    None => None,
                };
                worker
                    .execute_isolated(&*client, &query, &snapshot, timeout)
                    .await
            });
        }

        let mut succeeded = 0usize;
        let mut failed = 0usize;

        while let Some(joined) = join_set.join_next().await {
            let result = joined.map_err(|e| {
                SessionFailure::EngineFault(format!("worker task could not be joined: {}", e))
            })?;

            let success = result.is_success();
            if success {
                succeeded += 1;
                debug!("Worker {} succeeded", result.worker_id);
            } else {
                failed += 1;
            }
            progress.on_worker_complete(step, &result.worker_id, success);

            let (kind, payload) = worker_event(&result);
            session
                .record_result(result)
                .map_err(|e| SessionFailure::EngineFault(e.to_string()))?;
            trace.append(kind, payload);
        }

        info!(
            "Session {}: step {} done ({} succeeded, {} failed)",
            session.session_id(),
            index,
            succeeded,
            failed
        );
        trace.append(
            EventKind::StepCompleted,
            json!({
                "step": index,
                "type": step.as_str(),
                "succeeded": succeeded,
                "failed": failed,
            }),
        );
        progress.on_step_complete(step);
        Ok(())
    }

    /// Run the synthesizer over every result so far; a failure falls back to
    /// the configured sentinel text.
    async fn run_synthesis(
        &self,
        index: usize,
        step: &Step,
        worker_id: &str,
        session: &mut Session,
        trace: &SessionTrace,
        progress: &dyn ProgressNotifier,
    ) -> Result<(), SessionFailure> {
        info!(
            "Session {}: step {} synthesizing {} result(s)",
            session.session_id(),
            index,
            session.results().len()
        );
        trace.append(
            EventKind::SynthesisStarted,
            json!({
                "step": index,
                "worker_id": worker_id,
                "inputs": session.results().len(),
            }),
        );
        progress.on_step_start(step, 1);

        let spec = session.worker(worker_id).cloned().ok_or_else(|| {
            SessionFailure::EngineFault(format!("plan references unknown worker '{}'", worker_id))
        })?;
        let result = Worker::new(spec)
            .execute_isolated(
                &*self.client,
                session.query(),
                session.results(),
                self.config.worker_timeout,
            )
            .await;
        progress.on_worker_complete(step, worker_id, result.is_success());

        let payload = match &result.outcome {
            WorkerOutcome::Success { text } => {
                session.set_synthesis(text.as_str());
                json!({
                    "step": index,
                    "worker_id": worker_id,
                    "failed": false,
                    "duration_ms": result.duration_ms,
                    "synthesis": text,
                })
            }
            WorkerOutcome::Failure {
                error_kind,
                message,
            } => {
                warn!(
                    "Session {}: synthesis failed, using fallback: {}",
                    session.session_id(),
                    message
                );
                let fallback = self.config.synthesis_fallback.as_str();
                session.set_synthesis(fallback);
                json!({
                    "step": index,
                    "worker_id": worker_id,
                    "failed": true,
                    "duration_ms": result.duration_ms,
                    "error_kind": error_kind.as_str(),
                    "error": message,
                    "synthesis": fallback,
                })
            }
        };
        trace.append(EventKind::SynthesisCompleted, payload);
        progress.on_step_complete(step);
        Ok(())
    }

    fn finish_completed(&self, mut session: Session, trace: &SessionTrace) -> Session {
        if let Err(e) = session.transition(SessionStatus::Completed) {
            let failure = SessionFailure::EngineFault(e.to_string());
            return self.finish_failed(session, trace, failure);
        }
        trace.set_status(SessionStatus::Completed);
        session.set_events(trace.snapshot());

        info!(
            "Session {} completed: {} result(s), {} failed",
            session.session_id(),
            session.results().len(),
            session.results().failures().count()
        );
        session
    }

    fn finish_failed(
        &self,
        mut session: Session,
        trace: &SessionTrace,
        failure: SessionFailure,
    ) -> Session {
        warn!(
            "Session {} failed ({}): {}",
            session.session_id(),
            failure.tier(),
            failure
        );
        trace.append(
            EventKind::SessionFailed,
            json!({ "tier": failure.tier(), "error": failure.to_string() }),
        );
        if let Err(e) = session.transition(SessionStatus::Failed) {
            warn!("Session {}: {}", session.session_id(), e);
        }
        trace.set_status(SessionStatus::Failed);
        session.set_events(trace.snapshot());
        session
    }

    // ==================== Session queries ====================

    /// Events of `session_id` with `sequence >= from`; `None` for an
    /// unknown session
    pub fn events_since(&self, session_id: &str, from: u64) -> Option<Vec<Event>> {
        self.registry.get(session_id).map(|t| t.events_since(from))
    }

    /// Wait for events of `session_id` with `sequence >= from`
    ///
    /// Resolves to an empty vector once the session has ended and nothing
    /// newer exists; `None` for an unknown session.
    pub async fn wait_for_events(&self, session_id: &str, from: u64) -> Option<Vec<Event>> {
        let trace = self.registry.get(session_id)?;
        Some(trace.wait_for(from).await)
    }

    pub fn status(&self, session_id: &str) -> Option<SessionStatus> {
        self.registry.get(session_id).map(|t| t.status())
    }

    pub fn trace(&self, session_id: &str) -> Option<Arc<SessionTrace>> {
        self.registry.get(session_id)
    }

    /// Drop a session's trace from the registry
    ///
    /// Finished traces are kept until forgotten or pruned; a long-lived
    /// engine should call this or [`Self::prune_finished`].
    pub fn forget(&self, session_id: &str) -> bool {
        self.registry.remove(session_id)
    }

    /// Drop every finished trace nobody else holds
    pub fn prune_finished(&self) -> Vec<String> {
        self.registry.prune_finished()
    }

    pub fn session_ids(&self) -> Vec<String> {
        self.registry.session_ids()
    }
}

fn worker_event(result: &WorkerResult) -> (EventKind, Value) {
    match &result.outcome {
        WorkerOutcome::Success { text } => (
            EventKind::WorkerSucceeded,
            json!({
                "worker_id": result.worker_id,
                "duration_ms": result.duration_ms,
                "text": text,
            }),
        ),
        WorkerOutcome::Failure {
            error_kind,
            message,
        } => (
            EventKind::WorkerFailed,
            json!({
                "worker_id": result.worker_id,
                "duration_ms": result.duration_ms,
                "error_kind": error_kind.as_str(),
                "error": message,
            }),
        ),
    }
}
