//! Progress reporting for deliberation sessions

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use panel_application::ports::progress::ProgressNotifier;
use panel_domain::{Panelist, Stage};
use std::sync::Mutex;

/// Reports progress during a deliberation with progress bars
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
            .unwrap()
            .progress_chars("=>-")
    }

    fn stage_display_name(stage: &Stage) -> &'static str {
        match stage {
            Stage::Hypothesize => "Stage 1: Hypothesis",
            Stage::TestSelection => "Stage 2: Test Selection",
            Stage::Debate => "Stage 3: Debate",
            Stage::Consensus => "Stage 4: Consensus",
        }
    }

    fn stage_short_name(stage: &Stage) -> &'static str {
        match stage {
            Stage::Hypothesize => "Stage 1",
            Stage::TestSelection => "Stage 2",
            Stage::Debate => "Stage 3",
            Stage::Consensus => "Stage 4",
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_stage_start(&self, stage: &Stage, total_tasks: usize) {
        let stage_name = Self::stage_display_name(stage);

        let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
        pb.set_style(Self::stage_style());
        pb.set_prefix(stage_name.to_string());
        pb.set_message("Starting...");

        *self.stage_bar.lock().unwrap() = Some(pb);
    }

    fn on_task_complete(&self, _stage: &Stage, panelist: &Panelist, success: bool) {
        if let Some(pb) = self.stage_bar.lock().unwrap().as_ref() {
            let status = if success {
                format!("{} {}", "v".green(), panelist)
            } else {
                format!("{} {}", "x".red(), panelist)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_stage_complete(&self, stage: &Stage) {
        if let Some(pb) = self.stage_bar.lock().unwrap().take() {
            let stage_name = Self::stage_short_name(stage);
            pb.finish_with_message(format!("{} complete!", stage_name.green()));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_stage_start(&self, stage: &Stage, total_tasks: usize) {
        let stage_name = ProgressReporter::stage_display_name(stage);
        println!(
            "{} {} ({} panelists)",
            "->".cyan(),
            stage_name.bold(),
            total_tasks
        );
    }

    fn on_task_complete(&self, _stage: &Stage, panelist: &Panelist, success: bool) {
        if success {
            println!("  {} {}", "v".green(), panelist);
        } else {
            println!("  {} {} (failed)", "x".red(), panelist);
        }
    }

    fn on_stage_complete(&self, _stage: &Stage) {
        println!();
    }
}
