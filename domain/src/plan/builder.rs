//! Deterministic plan builder.
//!
//! Partitions registered workers by role: every persona goes into a single
//! parallel batch (registration order), and a synthesizer, if present, gets a
//! final synthesis step. Coordinators are registered but never scheduled.

use super::step::{CoordinationPlan, Step};
use crate::worker::spec::{WorkerRole, WorkerSpec};
use std::collections::HashSet;
use thiserror::Error;

/// Input the builder cannot schedule
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("Duplicate worker id: {0}")]
    DuplicateWorkerId(String),

    #[error("Worker at position {0} has an empty id")]
    EmptyWorkerId(usize),

    #[error("More than one synthesizer registered: {0:?}")]
    MultipleSynthesizers(Vec<String>),
}

pub struct PlanBuilder;

impl PlanBuilder {
    /// Build the plan for `workers`.
    ///
    /// Pure function of the workers' ids, roles and order. An empty worker
    /// set yields an empty plan.
    pub fn build(workers: &[WorkerSpec]) -> Result<CoordinationPlan, PlanError> {
        Self::validate(workers)?;

        if workers.is_empty() {
            return Ok(CoordinationPlan::default());
        }

        let batch: Vec<String> = workers
            .iter()
            .filter(|w| w.role == WorkerRole::Persona)
            .map(|w| w.id.clone())
            .collect();

        let mut steps = vec![Step::ParallelBatch { worker_ids: batch }];

        if let Some(synth) = workers.iter().find(|w| w.role == WorkerRole::Synthesizer) {
            steps.push(Step::Synthesize {
                worker_id: synth.id.clone(),
            });
        }

        Ok(CoordinationPlan::new(steps))
    }

    fn validate(workers: &[WorkerSpec]) -> Result<(), PlanError> {
        let mut seen = HashSet::with_capacity(workers.len());
        for (i, worker) in workers.iter().enumerate() {
            if worker.id.trim().is_empty() {
                return Err(PlanError::EmptyWorkerId(i));
            }
            if !seen.insert(worker.id.as_str()) {
                return Err(PlanError::DuplicateWorkerId(worker.id.clone()));
            }
        }

        let synthesizers: Vec<String> = workers
            .iter()
            .filter(|w| w.role == WorkerRole::Synthesizer)
            .map(|w| w.id.clone())
            .collect();
        if synthesizers.len() > 1 {
            return Err(PlanError::MultipleSynthesizers(synthesizers));
        }

        Ok(())
    }
}
