//! Per-step metrics for the windowed stepper.

/// Timing and work counts collected during a single step.
///
/// All durations are in microseconds. The stepper replaces these after
/// each successful `step()`; a failed step leaves the previous values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMetrics {
    /// Number of the step these metrics describe, starting at 1.
    pub step_id: u64,
    /// Wall-clock time for the entire step.
    pub total_us: u64,
    /// Window read from the backing grid plus upload.
    pub sync_in_us: u64,
    /// Diffusion dispatch.
    pub dispatch_us: u64,
    /// Readback into the window.
    pub readback_us: u64,
    /// Window write into the backing grid.
    pub sync_out_us: u64,
    /// Heatmap dispatch; 0 when no heatmap is configured.
    pub heatmap_us: u64,
    /// Window cells the dispatch computed.
    pub dispatched_items: usize,
    /// Window cells the dispatch skipped under a truncating remainder policy.
    pub skipped_items: usize,
}
