//! Assemble Council use case
//!
//! Resolves persona ids into workers for a session: every persona is fetched
//! concurrently, personas that cannot be loaded are skipped, and a
//! synthesizer is appended unless the caller opts out.

use crate::ports::persona_lookup::{LookupError, PersonaLookup};
use crate::use_cases::run_session::RunSessionInput;
use council_domain::WorkerSpec;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Worker id of the synthesizer added to every assembled council
pub const SYNTHESIZER_ID: &str = "synthesizer";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssembleError {
    #[error("No personas requested")]
    NoPersonasRequested,

    #[error("None of the requested personas could be loaded: {}", .0.join(", "))]
    NoPersonasFound(Vec<String>),
}

/// Input for the AssembleCouncil use case
#[derive(Debug, Clone)]
pub struct AssembleCouncilInput {
    pub session_id: String,
    pub query: String,
    /// Persona ids in the order their workers are registered
    pub persona_ids: Vec<String>,
    pub synthesize: bool,
}

impl AssembleCouncilInput {
    pub fn new(
        session_id: impl Into<String>,
        query: impl Into<String>,
        persona_ids: Vec<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            query: query.into(),
            persona_ids,
            synthesize: true,
        }
    }

    pub fn without_synthesis(mut self) -> Self {
        self.synthesize = false;
        self
    }
}

/// A council ready to run, plus the personas left out of it
#[derive(Debug, Clone)]
pub struct AssembledCouncil {
    pub input: RunSessionInput,
    pub skipped: Vec<(String, LookupError)>,
}

/// Use case for turning persona ids into session workers
pub struct AssembleCouncilUseCase<L: PersonaLookup + 'static> {
    lookup: Arc<L>,
}

impl<L: PersonaLookup + 'static> AssembleCouncilUseCase<L> {
    pub fn new(lookup: Arc<L>) -> Self {
        Self { lookup }
    }

    pub async fn execute(
        &self,
        input: AssembleCouncilInput,
    ) -> Result<AssembledCouncil, AssembleError> {
        let ids = dedupe(&input.persona_ids);
        if ids.is_empty() {
            return Err(AssembleError::NoPersonasRequested);
        }

        info!("Loading {} persona(s)", ids.len());

        let lookups = ids.iter().map(|id| self.lookup.get(id));
        let fetched = join_all(lookups).await;

        let mut workers = Vec::with_capacity(ids.len() + 1);
        let mut skipped = Vec::new();

        for (id, result) in ids.into_iter().zip(fetched) {
            match result {
                Ok(attributes) => workers.push(WorkerSpec::persona(id, attributes)),
                Err(e) => {
                    warn!("Skipping persona {}: {}", id, e);
                    skipped.push((id, e));
                }
            }
        }

        if workers.is_empty() {
            return Err(AssembleError::NoPersonasFound(
                skipped.into_iter().map(|(id, _)| id).collect(),
            ));
        }

        if input.synthesize {
            workers.push(WorkerSpec::synthesizer(SYNTHESIZER_ID));
        }

        Ok(AssembledCouncil {
            input: RunSessionInput::new(input.session_id, input.query, workers),
            skipped,
        })
    }
}

/// Trimmed, non-empty ids in first-seen order
fn dedupe(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty() && seen.insert(id.to_string()))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use council_domain::{PersonaAttributes, WorkerRole};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MockLookup {
        personas: HashMap<String, PersonaAttributes>,
        requested: Mutex<Vec<String>>,
    }

    impl MockLookup {
        fn with(names: &[(&str, &str)]) -> Self {
            Self {
                personas: names
                    .iter()
                    .map(|(id, name)| (id.to_string(), PersonaAttributes::named(*name)))
                    .collect(),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PersonaLookup for MockLookup {
        async fn get(&self, persona_id: &str) -> Result<PersonaAttributes, LookupError> {
            self.requested.lock().unwrap().push(persona_id.to_string());
            self.personas
                .get(persona_id)
                .cloned()
                .ok_or_else(|| LookupError::NotFound(persona_id.to_string()))
        }
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_assembles_personas_in_order_with_synthesizer() {
        let lookup = Arc::new(MockLookup::with(&[("p1", "Maya"), ("p2", "Jo")]));
        let use_case = AssembleCouncilUseCase::new(lookup);

        let council = use_case
            .execute(AssembleCouncilInput::new("s", "q", ids(&["p2", "p1"])))
            .await
            .unwrap();

        let workers = &council.input.workers;
        assert_eq!(workers.len(), 3);
        assert_eq!(workers[0].id, "p2");
        assert_eq!(workers[0].display_name, "Jo");
        assert_eq!(workers[1].id, "p1");
        assert_eq!(workers[2].id, SYNTHESIZER_ID);
        assert_eq!(workers[2].role, WorkerRole::Synthesizer);
        assert!(council.skipped.is_empty());
        assert_eq!(council.input.session_id, "s");
    }

    #[tokio::test]
    async fn test_missing_personas_are_skipped() {
        let lookup = Arc::new(MockLookup::with(&[("p1", "Maya")]));
        let use_case = AssembleCouncilUseCase::new(lookup);

        let council = use_case
            .execute(AssembleCouncilInput::new("s", "q", ids(&["p1", "ghost"])).without_synthesis())
            .await
            .unwrap();

        assert_eq!(council.input.workers.len(), 1);
        assert_eq!(
            council.skipped,
            vec![("ghost".to_string(), LookupError::NotFound("ghost".into()))]
        );
    }

    #[tokio::test]
    async fn test_no_personas_found() {
        let use_case = AssembleCouncilUseCase::new(Arc::new(MockLookup::with(&[])));
        let err = use_case
            .execute(AssembleCouncilInput::new("s", "q", ids(&["a", "b"])))
            .await
            .unwrap_err();

        assert_eq!(err, AssembleError::NoPersonasFound(ids(&["a", "b"])));
        assert!(err.to_string().contains("a, b"));
    }

    #[tokio::test]
    async fn test_duplicate_and_blank_ids_are_requested_once() {
        let lookup = Arc::new(MockLookup::with(&[("p1", "Maya")]));
        let use_case = AssembleCouncilUseCase::new(Arc::clone(&lookup));

        let input = AssembleCouncilInput::new("s", "q", ids(&["p1", " p1 ", ""])).without_synthesis();
        let council = use_case.execute(input).await.unwrap();

        assert_eq!(council.input.workers.len(), 1);
        assert_eq!(*lookup.requested.lock().unwrap(), vec!["p1".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_request() {
        let use_case = AssembleCouncilUseCase::new(Arc::new(MockLookup::with(&[])));
        let err = use_case
            .execute(AssembleCouncilInput::new("s", "q", vec![]))
            .await
            .unwrap_err();
        assert_eq!(err, AssembleError::NoPersonasRequested);
    }
}
