//! Progress reporting for council stages

use colored::Colorize;
use council_application::StageProgress;
use council_domain::{BackendId, Stage};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use parking_lot::Mutex;

/// Reports progress during a council run with progress bars
pub struct ProgressReporter {
    multi: MultiProgress,
    stage_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            stage_bar: Mutex::new(None),
        }
    }

    fn stage_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn stage_title(stage: Stage) -> String {
        format!("Stage {}: {}", stage.number(), stage.display_name())
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StageProgress for ProgressReporter {
    fn on_stage_start(&self, stage: Stage, total_calls: usize) {
        let pb = self.multi.add(ProgressBar::new(total_calls as u64));
        pb.set_style(Self::stage_style());
        pb.set_prefix(Self::stage_title(stage));
        pb.set_message("Starting...");

        *self.stage_bar.lock() = Some(pb);
    }

    fn on_call_complete(&self, _stage: Stage, backend: &BackendId, success: bool) {
        if let Some(pb) = self.stage_bar.lock().as_ref() {
            let status = if success {
                format!("{} {}", "v".green(), backend)
            } else {
                format!("{} {}", "x".red(), backend)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_stage_complete(&self, stage: Stage) {
        if let Some(pb) = self.stage_bar.lock().take() {
            pb.finish_with_message(format!("Stage {} complete!", stage.number()).green().to_string());
        }
    }
}

/// Simple text-based progress (no bars)
pub struct SimpleProgress;

impl StageProgress for SimpleProgress {
    fn on_stage_start(&self, stage: Stage, total_calls: usize) {
        println!(
            "{} {} ({} calls)",
            "->".cyan(),
            ProgressReporter::stage_title(stage).bold(),
            total_calls
        );
    }

    fn on_call_complete(&self, _stage: Stage, backend: &BackendId, success: bool) {
        if success {
            println!("  {} {}", "v".green(), backend);
        } else {
            println!("  {} {} (failed)", "x".red(), backend);
        }
    }

    fn on_stage_complete(&self, _stage: Stage) {
        println!();
    }
}
