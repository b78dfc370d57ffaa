//! Error types for the Calor heat simulation.
//!
//! Organized by subsystem: grid access, setup-time configuration, the
//! compute engine, and per-step execution. Every variant is a
//! deterministic logic error; none of them is worth retrying.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use crate::pos::GridPos;

/// Errors from grid and window access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridError {
    /// A cell position lies outside `[0, width) x [0, height)`.
    OutOfRange {
        /// Requested column.
        x: i32,
        /// Requested row.
        y: i32,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },
    /// A window placed at `offset` does not fit inside the backing grid.
    RegionOutOfRange {
        /// Bottom-left corner of the window in backing-grid coordinates.
        offset: GridPos,
        /// Window width and height.
        region: (u32, u32),
        /// Backing grid width and height.
        grid: (u32, u32),
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange {
                x,
                y,
                width,
                height,
            } => write!(
                f,
                "grid position ({x}, {y}) out of range [0, {width}) x [0, {height})"
            ),
            Self::RegionOutOfRange {
                offset,
                region,
                grid,
            } => write!(
                f,
                "{}x{} region at {offset} does not fit in {}x{} grid",
                region.0, region.1, grid.0, grid.1
            ),
        }
    }
}

impl Error for GridError {}

/// Errors from the compute engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// A host slice and an engine buffer disagree on byte length.
    SizeMismatch {
        /// Byte length of the engine buffer.
        expected: usize,
        /// Byte length supplied by the caller.
        actual: usize,
    },
    /// Readback did not complete within the configured timeout.
    Timeout {
        /// How long the caller was prepared to wait.
        waited: Duration,
    },
    /// The engine could not create a buffer or run a dispatch.
    DispatchFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "buffer holds {expected} bytes, got {actual}")
            }
            Self::Timeout { waited } => write!(f, "readback timed out after {waited:?}"),
            Self::DispatchFailed { reason } => write!(f, "dispatch failed: {reason}"),
        }
    }
}

impl Error for EngineError {}

/// Errors detected while constructing grids, steppers or engines.
///
/// All of these are fatal: the object being configured is not created.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A grid was requested with a zero dimension.
    EmptyGrid {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// A grid dimension does not fit the signed position type.
    DimensionTooLarge {
        /// What was too large (`"width"`, `"height"` or `"heatmap"`).
        name: &'static str,
        /// Requested value.
        value: u32,
        /// Largest accepted value.
        max: u32,
    },
    /// Flattened data does not hold exactly `width * height` cells.
    DataLengthMismatch {
        /// `width * height`.
        expected: usize,
        /// Length of the supplied data.
        actual: usize,
    },
    /// A world grid cell size is zero, negative or not finite.
    NonPositiveCellSize {
        /// Requested cell width.
        cell_width: f32,
        /// Requested cell height.
        cell_height: f32,
    },
    /// The active window is larger than the backing grid on some axis.
    WindowTooLarge {
        /// Window width and height.
        window: (u32, u32),
        /// Backing grid width and height.
        grid: (u32, u32),
    },
    /// A work-group dimension is zero.
    InvalidWorkGroup {
        /// Requested group width.
        width: u32,
        /// Requested group height.
        height: u32,
    },
    /// The window cell count is not a multiple of the work-group size and
    /// the remainder policy rejects partial coverage.
    UnevenWorkGroups {
        /// Window cell count.
        cells: usize,
        /// Work items per group.
        group_size: usize,
    },
    /// An engine buffer does not have the byte size the window requires.
    BufferSizeMismatch {
        /// `window cells * TemperatureCell::SIZE`.
        expected: usize,
        /// Byte size reported by the engine.
        actual: usize,
    },
    /// A numeric parameter is not finite (or otherwise out of its domain).
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f32,
    },
    /// A `[min, max]` range is inverted or not finite.
    InvalidRange {
        /// Lower bound.
        min: f32,
        /// Upper bound.
        max: f32,
    },
    /// The engine failed while allocating setup resources.
    Engine(EngineError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { width, height } => {
                write!(f, "grid must have at least one cell, got {width}x{height}")
            }
            Self::DimensionTooLarge { name, value, max } => {
                write!(f, "{name} {value} exceeds maximum {max}")
            }
            Self::DataLengthMismatch { expected, actual } => {
                write!(f, "expected {expected} cells of data, got {actual}")
            }
            Self::NonPositiveCellSize {
                cell_width,
                cell_height,
            } => write!(
                f,
                "cell size must be finite and positive, got {cell_width}x{cell_height}"
            ),
            Self::WindowTooLarge { window, grid } => write!(
                f,
                "window {}x{} exceeds grid {}x{}",
                window.0, window.1, grid.0, grid.1
            ),
            Self::InvalidWorkGroup { width, height } => {
                write!(f, "work group dimensions must be non-zero, got {width}x{height}")
            }
            Self::UnevenWorkGroups { cells, group_size } => write!(
                f,
                "{cells} cells is not a multiple of work group size {group_size}"
            ),
            Self::BufferSizeMismatch { expected, actual } => write!(
                f,
                "transfer buffer holds {actual} bytes, window needs {expected}"
            ),
            Self::InvalidParameter { name, value } => {
                write!(f, "{name} must be finite, got {value}")
            }
            Self::InvalidRange { min, max } => {
                write!(f, "invalid range [{min}, {max}]")
            }
            Self::Engine(e) => write!(f, "engine: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Engine(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EngineError> for ConfigError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

/// Errors from a single simulation step.
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// A grid or window access was out of range.
    Grid(GridError),
    /// The compute engine failed during upload, dispatch or readback.
    Engine(EngineError),
    /// `delta_time` was NaN or infinite.
    NonFiniteDeltaTime {
        /// The rejected value.
        value: f32,
    },
    /// The backing grid passed to `step` has different dimensions from the
    /// one the stepper was configured against.
    WorldMismatch {
        /// Dimensions seen at setup.
        expected: (u32, u32),
        /// Dimensions of the grid passed in.
        actual: (u32, u32),
    },
    /// A computed temperature is not finite or exceeds the divergence limit.
    /// The backing grid was not written.
    Diverged {
        /// Flattened window index of the first offending cell.
        index: usize,
        /// Its computed temperature.
        value: f32,
    },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(e) => write!(f, "grid: {e}"),
            Self::Engine(e) => write!(f, "engine: {e}"),
            Self::NonFiniteDeltaTime { value } => {
                write!(f, "delta_time must be finite, got {value}")
            }
            Self::WorldMismatch { expected, actual } => write!(
                f,
                "stepper configured for {}x{} grid, got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            Self::Diverged { index, value } => {
                write!(f, "temperature diverged at window cell {index}: {value}")
            }
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            Self::Engine(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for StepError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

impl From<EngineError> for StepError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}
