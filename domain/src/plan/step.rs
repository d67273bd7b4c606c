//! Coordination plan value objects

use serde::{Deserialize, Serialize};

/// One step of a coordination plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    /// Workers that run concurrently with no ordering between them
    ParallelBatch { worker_ids: Vec<String> },
    /// The worker that merges every prior result into one text
    Synthesize { worker_id: String },
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::ParallelBatch { .. } => "parallel_batch",
            Step::Synthesize { .. } => "synthesize",
        }
    }

    /// Number of workers this step runs
    pub fn width(&self) -> usize {
        match self {
            Step::ParallelBatch { worker_ids } => worker_ids.len(),
            Step::Synthesize { .. } => 1,
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::ParallelBatch { worker_ids } => {
                write!(f, "parallel batch of {}", worker_ids.len())
            }
            Step::Synthesize { worker_id } => write!(f, "synthesis by {}", worker_id),
        }
    }
}

/// Ordered steps for one session; read-only once built
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinationPlan {
    steps: Vec<Step>,
}

impl CoordinationPlan {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Worker ids of the parallel batch, if the plan has one
    pub fn batch(&self) -> Option<&[String]> {
        self.steps.iter().find_map(|s| match s {
            Step::ParallelBatch { worker_ids } => Some(worker_ids.as_slice()),
            _ => None,
        })
    }

    /// The synthesizer's id, if the plan synthesizes
    pub fn synthesizer(&self) -> Option<&str> {
        self.steps.iter().find_map(|s| match s {
            Step::Synthesize { worker_id } => Some(worker_id.as_str()),
            _ => None,
        })
    }
}

impl<'a> IntoIterator for &'a CoordinationPlan {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
