//! Progress notification port
//!
//! Defines the interface for reporting progress while a session runs.

use council_domain::Step;

/// Callback for progress updates during session execution
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain text, ...).
pub trait ProgressNotifier: Send + Sync {
    /// Called when a plan step starts
    fn on_step_start(&self, step: &Step, total_workers: usize);

    /// Called when one worker of the current step finishes
    fn on_worker_complete(&self, step: &Step, worker_id: &str, success: bool);

    /// Called when a plan step completes
    fn on_step_complete(&self, step: &Step);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_step_start(&self, _step: &Step, _total_workers: usize) {}
    fn on_worker_complete(&self, _step: &Step, _worker_id: &str, _success: bool) {}
    fn on_step_complete(&self, _step: &Step) {}
}
