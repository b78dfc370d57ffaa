//! Sequential in-place diffusion over a whole grid.

use calor_core::{ConfigError, StepError, TemperatureCell};
use calor_grid::{neighbours_at, GridAccess};
use tracing::trace;

use crate::kernel::DiffusionParams;

/// Reference stepper: one sweep over every cell, updating in place.
///
/// Rows are visited bottom (`y = 0`) to top and cells left to right. Each
/// update sees the *pre-update* values of its left and down neighbours,
/// held in a one-cell and a one-row lookback, and the not-yet-updated
/// values of its right and up neighbours. The result is therefore the same
/// as a double-buffered update, without the second buffer.
///
/// # Examples
///
/// ```
/// use calor_core::TemperatureCell;
/// use calor_diffusion::{CpuDiffusion, DiffusionParams};
/// use calor_grid::Grid;
///
/// let mut grid = Grid::<TemperatureCell>::new(3, 3).unwrap();
/// grid.set(1, 1, TemperatureCell::with_temperature(10.0)).unwrap();
///
/// let cpu = CpuDiffusion::new(DiffusionParams::new(0.2, 0.0)).unwrap();
/// cpu.step_all(&mut grid, 1.0, 0.0).unwrap();
///
/// let centre = grid.get(1, 1).unwrap().temperature;
/// assert!((centre - 2.0).abs() < 1e-5);
/// ```
#[derive(Clone, Debug)]
pub struct CpuDiffusion {
    params: DiffusionParams,
}

impl CpuDiffusion {
    /// Create a stepper, validating `params`.
    pub fn new(params: DiffusionParams) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Current factors.
    pub fn params(&self) -> DiffusionParams {
        self.params
    }

    /// Replace the factors.
    pub fn set_params(&mut self, params: DiffusionParams) -> Result<(), ConfigError> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    /// Advance every cell of `grid` by `delta_time`.
    ///
    /// Bit-for-bit deterministic for the same input.
    pub fn step_all<G>(
        &self,
        grid: &mut G,
        delta_time: f32,
        ambient_temperature: f32,
    ) -> Result<(), StepError>
    where
        G: GridAccess<TemperatureCell> + ?Sized,
    {
        if !delta_time.is_finite() {
            return Err(StepError::NonFiniteDeltaTime { value: delta_time });
        }
        let (width, height) = grid.dims();
        trace!(width, height, delta_time, "cpu diffusion sweep");

        let mut down_row: Vec<Option<TemperatureCell>> = vec![None; width as usize];
        for y in 0..height as i32 {
            let mut left_cell = None;
            for x in 0..width as i32 {
                let cell = grid.get(x, y)?;
                let neighbours = neighbours_at(&*grid, x, y, left_cell, down_row[x as usize])?;
                let next = self
                    .params
                    .apply(&cell, &neighbours, delta_time, ambient_temperature);
                grid.set(x, y, next)?;
                left_cell = Some(cell);
                down_row[x as usize] = Some(cell);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calor_grid::{Grid, WorldGrid};
    use proptest::prelude::*;

    fn hot_centre() -> Grid<TemperatureCell> {
        let mut grid = Grid::new(3, 3).unwrap();
        grid.set(1, 1, TemperatureCell::with_temperature(10.0)).unwrap();
        grid
    }

    #[test]
    fn hot_cell_spreads_to_cross() {
        let mut grid = hot_centre();
        CpuDiffusion::new(DiffusionParams::new(0.2, 0.0))
            .unwrap()
            .step_all(&mut grid, 1.0, 0.0)
            .unwrap();
        for (x, y) in [(1, 1), (0, 1), (2, 1), (1, 0), (1, 2)] {
            let t = grid.get(x, y).unwrap().temperature;
            assert!((t - 2.0).abs() < 1e-5, "({x}, {y}) = {t}");
        }
        for (x, y) in [(0, 0), (2, 0), (0, 2), (2, 2)] {
            assert_eq!(grid.get(x, y).unwrap().temperature, 0.0);
        }
    }

    #[test]
    fn uniform_field_is_unchanged() {
        let mut grid = Grid::filled(6, 4, TemperatureCell::with_temperature(12.5)).unwrap();
        let before = grid.clone();
        CpuDiffusion::new(DiffusionParams::new(0.9, -0.4))
            .unwrap()
            .step_all(&mut grid, 0.1, 12.5)
            .unwrap();
        assert_eq!(grid, before);
    }

    #[test]
    fn heat_source_scaled_by_dt() {
        let mut grid = Grid::filled(1, 1, TemperatureCell::new(0.0, 10.0, 0.0)).unwrap();
        CpuDiffusion::new(DiffusionParams::default())
            .unwrap()
            .step_all(&mut grid, 0.5, 0.0)
            .unwrap();
        assert_eq!(grid.get(0, 0).unwrap().temperature, 5.0);
    }

    #[test]
    fn rejects_non_finite_dt() {
        let mut grid = hot_centre();
        let before = grid.clone();
        let cpu = CpuDiffusion::new(DiffusionParams::default()).unwrap();
        assert_eq!(
            cpu.step_all(&mut grid, f32::NAN, 0.0).unwrap_err().to_string(),
            "delta_time must be finite, got NaN"
        );
        assert!(cpu.step_all(&mut grid, f32::INFINITY, 0.0).is_err());
        assert_eq!(grid, before);
    }

    #[test]
    fn rejects_invalid_params() {
        assert!(CpuDiffusion::new(DiffusionParams::new(f32::NAN, 0.0)).is_err());
        let mut cpu = CpuDiffusion::new(DiffusionParams::default()).unwrap();
        assert!(cpu.set_params(DiffusionParams::new(0.1, f32::NEG_INFINITY)).is_err());
        assert_eq!(cpu.params(), DiffusionParams::default());
    }

    #[test]
    fn works_on_world_grid() {
        let mut world = WorldGrid::<TemperatureCell>::new(3, 3, 2.0, 2.0).unwrap();
        world.set(1, 1, TemperatureCell::with_temperature(10.0)).unwrap();
        CpuDiffusion::new(DiffusionParams::new(0.2, 0.0))
            .unwrap()
            .step_all(&mut world, 1.0, 0.0)
            .unwrap();
        assert!((world.get(1, 0).unwrap().temperature - 2.0).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn closed_field_conserves_heat(
            temps in proptest::collection::vec(0.0f32..100.0, 16),
        ) {
            let cells = temps.iter().map(|&t| TemperatureCell::with_temperature(t)).collect();
            let mut grid = Grid::from_data(4, 4, cells).unwrap();
            let before: f32 = grid.iter().map(|c| c.temperature).sum();
            CpuDiffusion::new(DiffusionParams::new(0.1, 0.0))
                .unwrap()
                .step_all(&mut grid, 1.0, 0.0)
                .unwrap();
            let after: f32 = grid.iter().map(|c| c.temperature).sum();
            prop_assert!((before - after).abs() < 5e-2);
        }

        #[test]
        fn deterministic(temps in proptest::collection::vec(-50.0f32..50.0, 25)) {
            let cells: Vec<_> = temps.iter().map(|&t| TemperatureCell::with_temperature(t)).collect();
            let mut a = Grid::from_data(5, 5, cells.clone()).unwrap();
            let mut b = Grid::from_data(5, 5, cells).unwrap();
            let cpu = CpuDiffusion::new(DiffusionParams::new(0.2, -0.1)).unwrap();
            cpu.step_all(&mut a, 0.3, 5.0).unwrap();
            cpu.step_all(&mut b, 0.3, 5.0).unwrap();
            let bits = |g: &Grid<TemperatureCell>| g.iter().map(|c| c.temperature.to_bits()).collect::<Vec<_>>();
            prop_assert_eq!(bits(&a), bits(&b));
        }
    }
}
