//! Progress notification port
//!
//! Defines the interface for reporting progress during a deliberation.

use panel_domain::{Panelist, Stage};

/// Callback for progress updates during a deliberation session
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, progress bars, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when a stage starts
    fn on_stage_start(&self, stage: &Stage, total_tasks: usize);

    /// Called when a panelist's sub-call completes within a stage
    fn on_task_complete(&self, stage: &Stage, panelist: &Panelist, success: bool);

    /// Called when a stage completes
    fn on_stage_complete(&self, stage: &Stage);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_stage_start(&self, _stage: &Stage, _total_tasks: usize) {}
    fn on_task_complete(&self, _stage: &Stage, _panelist: &Panelist, _success: bool) {}
    fn on_stage_complete(&self, _stage: &Stage) {}
}
