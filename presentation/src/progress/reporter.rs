//! Progress reporting for session execution

use colored::Colorize;
use council_application::ports::progress::ProgressNotifier;
use council_domain::Step;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress during a session with one bar per plan step
pub struct ProgressReporter {
    multi: MultiProgress,
    step_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            step_bar: Mutex::new(None),
        }
    }

    fn step_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn step_display_name(step: &Step) -> &'static str {
        match step {
            Step::ParallelBatch { .. } => "Personas answering",
            Step::Synthesize { .. } => "Synthesis",
        }
    }

    fn step_short_name(step: &Step) -> &'static str {
        match step {
            Step::ParallelBatch { .. } => "Batch",
            Step::Synthesize { .. } => "Synthesis",
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_step_start(&self, step: &Step, total_workers: usize) {
        let pb = self.multi.add(ProgressBar::new(total_workers as u64));
        pb.set_style(Self::step_style());
        pb.set_prefix(Self::step_display_name(step));
        pb.set_message("Starting...");

        if let Ok(mut bar) = self.step_bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_worker_complete(&self, _step: &Step, worker_id: &str, success: bool) {
        let Ok(bar) = self.step_bar.lock() else {
            return;
        };
        if let Some(pb) = bar.as_ref() {
            let status = if success {
                format!("{} {}", "v".green(), worker_id)
            } else {
                format!("{} {}", "x".red(), worker_id)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_step_complete(&self, step: &Step) {
        let Ok(mut bar) = self.step_bar.lock() else {
            return;
        };
        if let Some(pb) = bar.take() {
            pb.finish_with_message(format!("{} complete!", Self::step_short_name(step).green()));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_step_start(&self, step: &Step, total_workers: usize) {
        println!(
            "{} {} ({} worker(s))",
            "->".cyan(),
            ProgressReporter::step_display_name(step).bold(),
            total_workers
        );
    }

    fn on_worker_complete(&self, _step: &Step, worker_id: &str, success: bool) {
        if success {
            println!("  {} {}", "v".green(), worker_id);
        } else {
            println!("  {} {} (failed)", "x".red(), worker_id);
        }
    }

    fn on_step_complete(&self, _step: &Step) {
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_names() {
        let batch = Step::ParallelBatch {
            worker_ids: vec!["a".into()],
        };
        let synth = Step::Synthesize {
            worker_id: "s".into(),
        };
        assert_eq!(ProgressReporter::step_short_name(&batch), "Batch");
        assert_eq!(ProgressReporter::step_short_name(&synth), "Synthesis");
        assert_eq!(ProgressReporter::step_display_name(&batch), "Personas answering");
    }

    #[test]
    fn test_reporter_tracks_one_bar_per_step() {
        let reporter = ProgressReporter::new();
        let step = Step::ParallelBatch {
            worker_ids: vec!["a".into(), "b".into()],
        };

        reporter.on_step_start(&step, 2);
        reporter.on_worker_complete(&step, "a", true);
        reporter.on_worker_complete(&step, "b", false);
        {
            let bar = reporter.step_bar.lock().unwrap();
            assert_eq!(bar.as_ref().unwrap().position(), 2);
        }

        reporter.on_step_complete(&step);
        assert!(reporter.step_bar.lock().unwrap().is_none());
    }
}
