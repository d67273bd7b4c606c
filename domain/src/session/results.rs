//! Worker results of a session, in completion order with lookup by id.

use crate::core::error::DomainError;
use crate::worker::result::WorkerResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Results keyed by worker id
///
/// Iteration follows insertion order (the order workers finished); `get`
/// gives random access by id. A key is written at most once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<WorkerResult>", into = "Vec<WorkerResult>")]
pub struct ResultSet {
    ordered: Vec<WorkerResult>,
    index: HashMap<String, usize>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a result; rejects a second result for the same worker
    pub fn insert(&mut self, result: WorkerResult) -> Result<(), DomainError> {
        if self.index.contains_key(&result.worker_id) {
            return Err(DomainError::DuplicateResult(result.worker_id));
        }
        self.index
            .insert(result.worker_id.clone(), self.ordered.len());
        self.ordered.push(result);
        Ok(())
    }

    pub fn get(&self, worker_id: &str) -> Option<&WorkerResult> {
        self.index.get(worker_id).map(|&i| &self.ordered[i])
    }

    pub fn contains(&self, worker_id: &str) -> bool {
        self.index.contains_key(worker_id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WorkerResult> {
        self.ordered.iter()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn successes(&self) -> impl Iterator<Item = &WorkerResult> {
        self.ordered.iter().filter(|r| r.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &WorkerResult> {
        self.ordered.iter().filter(|r| !r.is_success())
    }
}

impl From<Vec<WorkerResult>> for ResultSet {
    fn from(results: Vec<WorkerResult>) -> Self {
        let mut set = ResultSet::new();
        for result in results {
            // first result per worker wins
            let _ = set.insert(result);
        }
        set
    }
}

impl From<ResultSet> for Vec<WorkerResult> {
    fn from(set: ResultSet) -> Self {
        set.ordered
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a WorkerResult;
    type IntoIter = std::slice::Iter<'a, WorkerResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.ordered.iter()
    }
}
