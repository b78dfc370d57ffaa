//! The [`GridAccess`] capability trait.

use bytemuck::Pod;
use calor_core::GridError;

/// Bounds-checked cell access shared by [`Grid`](crate::Grid) and
/// [`WorldGrid`](crate::WorldGrid).
///
/// Neighbour lookup, window synchronization and the CPU stepper are
/// written against this trait, so they work on either grid flavour.
///
/// # Contract
///
/// - `data()` has exactly `width() * height()` elements in row-major order
///   (`index = y * width + x`).
/// - `get`/`set` return [`GridError::OutOfRange`] for any position outside
///   `[0, width) x [0, height)`; they never clamp.
pub trait GridAccess<T: Pod> {
    /// Number of columns.
    fn width(&self) -> u32;

    /// Number of rows.
    fn height(&self) -> u32;

    /// Read the cell at `(x, y)`.
    fn get(&self, x: i32, y: i32) -> Result<T, GridError>;

    /// Overwrite the cell at `(x, y)`.
    fn set(&mut self, x: i32, y: i32, value: T) -> Result<(), GridError>;

    /// Flattened row-major storage.
    fn data(&self) -> &[T];

    /// Mutable flattened row-major storage.
    fn data_mut(&mut self) -> &mut [T];

    /// `(width, height)`.
    fn dims(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Total number of cells.
    fn cell_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }
}
