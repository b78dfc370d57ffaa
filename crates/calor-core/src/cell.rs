//! The [`TemperatureCell`] record stored in every grid cell.

use bytemuck::{Pod, Zeroable};

/// Per-cell thermal state.
///
/// Plain data: three `f32` values with no padding, so a slice of cells can
/// be reinterpreted as bytes (and back) for transfer to a compute engine.
/// A cell has no identity beyond its grid position.
///
/// # Examples
///
/// ```
/// use calor_core::TemperatureCell;
///
/// let cell = TemperatureCell::with_temperature(10.0);
/// assert_eq!(cell.heat_source, 0.0);
/// assert_eq!(TemperatureCell::SIZE, 12);
/// assert_eq!(bytemuck::bytes_of(&cell).len(), TemperatureCell::SIZE);
/// ```
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TemperatureCell {
    /// Current temperature of the cell.
    pub temperature: f32,
    /// Temperature gained per second. Negative values model a heat sink.
    pub heat_source: f32,
    /// How strongly the cell insulates heat, in `[0, 1]`.
    ///
    /// Carried through grids and transfer buffers but not read by the
    /// diffusion formula.
    pub insulation: f32,
}

impl TemperatureCell {
    /// Size of one cell in bytes, as laid out in transfer buffers.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Create a cell with all three fields given.
    pub const fn new(temperature: f32, heat_source: f32, insulation: f32) -> Self {
        Self {
            temperature,
            heat_source,
            insulation,
        }
    }

    /// Create a cell with the given temperature, no source and no insulation.
    pub const fn with_temperature(temperature: f32) -> Self {
        Self::new(temperature, 0.0, 0.0)
    }

    /// Return a copy of this cell with `temperature` replaced.
    pub fn at_temperature(self, temperature: f32) -> Self {
        Self {
            temperature,
            ..self
        }
    }
}
