//! The [`ComputeEngine`] abstraction and dispatch descriptors.
//!
//! An engine owns opaque buffers, accepts byte uploads, runs the diffusion
//! kernel across work groups and hands results back as bytes. The stepper
//! never assumes where the work runs: [`SoftwareEngine`](crate::SoftwareEngine)
//! runs it on the host thread pool, a GPU backend would run it on a device.

use std::time::Duration;

use calor_core::{ConfigError, EngineError};

use crate::heatmap::{HeatmapImage, HeatmapParams};
use crate::kernel::DiffusionParams;

/// What to do when the window cell count is not a multiple of the
/// work-group size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RemainderPolicy {
    /// Refuse the configuration at setup with
    /// [`ConfigError::UnevenWorkGroups`].
    #[default]
    Reject,
    /// Dispatch `floor(cells / group_size)` groups. Trailing cells are not
    /// computed.
    ///
    /// Sync-out still writes the whole window, so the backing-grid cells
    /// under the trailing window cells are overwritten every step with
    /// whatever the output buffer holds there: zeroes from a fresh buffer,
    /// or stale data from an earlier dispatch, possibly at another offset.
    /// Those world cells are corrupted, not merely left unstepped.
    Truncate,
    /// Dispatch `ceil(cells / group_size)` groups; work items past the last
    /// cell do nothing.
    CoverAll,
}

/// Work-group layout of a diffusion dispatch, fixed at setup.
///
/// Work items are numbered `group * group_size + local` over the flattened
/// window; item `i` updates window cell `i`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkGroups {
    /// Work-group width in items.
    pub group_width: u32,
    /// Work-group height in items.
    pub group_height: u32,
    /// Number of groups dispatched.
    pub count: usize,
    /// Number of window cells actually computed.
    pub covered_cells: usize,
    /// Number of window cells left uncomputed.
    pub skipped_cells: usize,
}

impl WorkGroups {
    /// Plan the dispatch of `cells` work items in groups of
    /// `group_width x group_height`.
    pub fn plan(
        cells: usize,
        group_width: u32,
        group_height: u32,
        policy: RemainderPolicy,
    ) -> Result<Self, ConfigError> {
        if group_width == 0 || group_height == 0 {
            return Err(ConfigError::InvalidWorkGroup {
                width: group_width,
                height: group_height,
            });
        }
        let group_size = group_width as usize * group_height as usize;
        let count = match policy {
            RemainderPolicy::Reject if cells % group_size != 0 => {
                return Err(ConfigError::UnevenWorkGroups { cells, group_size });
            }
            RemainderPolicy::Reject | RemainderPolicy::Truncate => cells / group_size,
            RemainderPolicy::CoverAll => cells.div_ceil(group_size),
        };
        let covered_cells = (count * group_size).min(cells);
        Ok(Self {
            group_width,
            group_height,
            count,
            covered_cells,
            skipped_cells: cells - covered_cells,
        })
    }

    /// Work items per group.
    pub fn group_size(&self) -> usize {
        self.group_width as usize * self.group_height as usize
    }
}

/// Everything an engine needs to run one diffusion step over a window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiffusionDispatch {
    /// Window width in cells.
    pub width: u32,
    /// Window height in cells.
    pub height: u32,
    /// Simulated time advanced by this step.
    pub delta_time: f32,
    /// Ambient temperature for the cooling term.
    pub ambient_temperature: f32,
    /// Diffusion and cooling factors.
    pub params: DiffusionParams,
    /// Work-group layout.
    pub groups: WorkGroups,
}

impl DiffusionDispatch {
    /// Window cell count.
    pub fn cells(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// A heatmap render of a window buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeatmapDispatch {
    /// Window width in cells.
    pub width: u32,
    /// Window height in cells.
    pub height: u32,
    /// Render parameters.
    pub params: HeatmapParams,
}

/// A backend that runs the diffusion kernel over engine-owned buffers.
///
/// Buffers hold flattened `TemperatureCell` data; lengths are in bytes.
/// Every buffer obtained from [`create_buffer`](Self::create_buffer) must
/// be handed back to [`release_buffer`](Self::release_buffer) exactly once.
pub trait ComputeEngine {
    /// Engine-side buffer handle.
    type Buffer;

    /// Allocate a zero-filled buffer of `len_bytes` bytes.
    fn create_buffer(&mut self, len_bytes: usize) -> Result<Self::Buffer, EngineError>;

    /// Byte length of `buffer`.
    fn buffer_len(&self, buffer: &Self::Buffer) -> usize;

    /// Replace the full contents of `buffer`. `bytes` must match its length.
    fn upload(&mut self, buffer: &mut Self::Buffer, bytes: &[u8]) -> Result<(), EngineError>;

    /// Run the diffusion kernel reading `input` and writing `output`.
    ///
    /// Only the first `dispatch.groups.covered_cells` cells of `output`
    /// are written.
    fn dispatch(
        &mut self,
        dispatch: &DiffusionDispatch,
        input: &Self::Buffer,
        output: &mut Self::Buffer,
    ) -> Result<(), EngineError>;

    /// Render `input` into `image`.
    fn dispatch_heatmap(
        &mut self,
        dispatch: &HeatmapDispatch,
        input: &Self::Buffer,
        image: &mut HeatmapImage,
    ) -> Result<(), EngineError>;

    /// Copy the full contents of `buffer` into `out`, blocking until all
    /// prior dispatches writing it have finished.
    ///
    /// With `timeout = Some(d)`, returns [`EngineError::Timeout`] if the
    /// data is not ready within `d`.
    fn read_back(
        &mut self,
        buffer: &Self::Buffer,
        out: &mut [u8],
        timeout: Option<Duration>,
    ) -> Result<(), EngineError>;

    /// Free `buffer`.
    fn release_buffer(&mut self, buffer: Self::Buffer);
}
