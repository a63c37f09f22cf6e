//! Progress notification port
//!
//! Defines the interface for reporting progress while a stage fans out.

use council_domain::{BackendId, Stage};

/// Callback for progress updates during stage execution
///
/// Implementations live in the presentation layer.
pub trait StageProgress: Send + Sync {
    /// Called when a stage starts with the number of backend calls it makes
    fn on_stage_start(&self, stage: Stage, total_calls: usize);

    /// Called when one backend call of a stage finishes
    fn on_call_complete(&self, stage: Stage, backend: &BackendId, success: bool);

    /// Called when every call of a stage has finished
    fn on_stage_complete(&self, stage: Stage);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl StageProgress for NoProgress {
    fn on_stage_start(&self, _stage: Stage, _total_calls: usize) {}
    fn on_call_complete(&self, _stage: Stage, _backend: &BackendId, _success: bool) {}
    fn on_stage_complete(&self, _stage: Stage) {}
}
