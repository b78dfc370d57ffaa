//! The per-cell diffusion update rule.
//!
//! Every stepper in this crate (the sequential CPU sweep, the software
//! engine and any hardware engine) computes the same formula:
//!
//! ```text
//! next = T + Σ(n - T)·D·dt + (T - ambient)·C·dt + source
//! ```
//!
//! where `T` is the cell temperature, `n` ranges over the 4-connected
//! neighbours present in the grid, `D` is the diffusion factor and `C` the
//! cooling factor. Nothing is clamped: when
//! `dt · D · neighbour_count > 1` the explicit scheme overshoots and
//! oscillates. [`DiffusionParams::stable_dt`] reports that boundary.
//!
//! The cooling term has the sign as written above, so a negative cooling
//! factor pulls temperatures toward ambient and a positive one pushes them
//! away.

use calor_core::{ConfigError, TemperatureCell};
use calor_grid::neighbour_indices;
use smallvec::SmallVec;

/// Compute the next temperature of `cell`.
///
/// `source_heat` is added as-is; the steppers pass
/// `cell.heat_source * delta_time`. `cell.insulation` is not read.
///
/// ```
/// use calor_core::TemperatureCell;
/// use calor_diffusion::kernel::next_temperature;
///
/// let cell = TemperatureCell::with_temperature(10.0);
/// let cold = [TemperatureCell::default(); 4];
/// let next = next_temperature(&cell, &cold, 1.0, 0.0, 0.0, 0.2, 0.0);
/// assert!((next - 2.0).abs() < 1e-6);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn next_temperature(
    cell: &TemperatureCell,
    neighbours: &[TemperatureCell],
    delta_time: f32,
    ambient_temperature: f32,
    source_heat: f32,
    diffusion_factor: f32,
    cooling_factor: f32,
) -> f32 {
    let t = cell.temperature;
    let sum_diff: f32 = neighbours.iter().map(|n| n.temperature - t).sum();
    let diffusion = sum_diff * diffusion_factor * delta_time;
    let ambient_cooling = (t - ambient_temperature) * cooling_factor * delta_time;
    t + diffusion + ambient_cooling + source_heat
}

/// The two tunable coefficients of the update rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiffusionParams {
    /// Strength of neighbour coupling per unit time.
    pub diffusion_factor: f32,
    /// Strength of ambient coupling per unit time (see module docs for sign).
    pub cooling_factor: f32,
}

impl Default for DiffusionParams {
    fn default() -> Self {
        Self {
            diffusion_factor: 0.9,
            cooling_factor: 0.0,
        }
    }
}

impl DiffusionParams {
    /// Create a parameter set.
    pub const fn new(diffusion_factor: f32, cooling_factor: f32) -> Self {
        Self {
            diffusion_factor,
            cooling_factor,
        }
    }

    /// Both factors must be finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.diffusion_factor.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "diffusion_factor",
                value: self.diffusion_factor,
            });
        }
        if !self.cooling_factor.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "cooling_factor",
                value: self.cooling_factor,
            });
        }
        Ok(())
    }

    /// Largest `delta_time` for which an interior cell does not overshoot:
    /// `1 / (4 · diffusion_factor)`. Infinite when the factor is not positive.
    ///
    /// Informational only; no stepper clamps to it.
    pub fn stable_dt(&self) -> f32 {
        if self.diffusion_factor > 0.0 {
            1.0 / (4.0 * self.diffusion_factor)
        } else {
            f32::INFINITY
        }
    }

    /// Apply the update rule to one cell with its own heat source.
    pub fn apply(
        &self,
        cell: &TemperatureCell,
        neighbours: &[TemperatureCell],
        delta_time: f32,
        ambient_temperature: f32,
    ) -> TemperatureCell {
        let next = next_temperature(
            cell,
            neighbours,
            delta_time,
            ambient_temperature,
            cell.heat_source * delta_time,
            self.diffusion_factor,
            self.cooling_factor,
        );
        cell.at_temperature(next)
    }
}

/// Update the cell at flattened `index` of a `width x height` buffer,
/// reading only `input`.
///
/// Neighbours outside the buffer are omitted, never wrapped. This is the
/// work-item body shared by compute engines.
pub fn diffuse_cell(
    input: &[TemperatureCell],
    width: u32,
    height: u32,
    index: usize,
    params: &DiffusionParams,
    delta_time: f32,
    ambient_temperature: f32,
) -> TemperatureCell {
    let w = width as usize;
    let (x, y) = ((index % w) as u32, (index / w) as u32);
    let neighbours: SmallVec<[TemperatureCell; 4]> = neighbour_indices(x, y, width, height)
        .into_iter()
        .map(|i| input[i])
        .collect();
    params.apply(&input[index], &neighbours, delta_time, ambient_temperature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cell(t: f32) -> TemperatureCell {
        TemperatureCell::with_temperature(t)
    }

    #[test]
    fn no_neighbours_no_cooling_no_source_is_identity() {
        assert_eq!(next_temperature(&cell(7.5), &[], 1.0, 3.0, 0.0, 0.9, 0.0), 7.5);
    }

    #[test]
    fn diffusion_term() {
        let next = next_temperature(&cell(0.0), &[cell(10.0), cell(0.0)], 0.5, 0.0, 0.0, 0.2, 0.0);
        assert!((next - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cooling_term_sign_as_written() {
        // (T - ambient) * C * dt = (10 - 4) * -0.5 * 1 = -3
        let next = next_temperature(&cell(10.0), &[], 1.0, 4.0, 0.0, 0.0, -0.5);
        assert!((next - 7.0).abs() < 1e-6);
    }

    #[test]
    fn source_heat_added_verbatim() {
        let next = next_temperature(&cell(1.0), &[], 0.25, 0.0, 2.0, 0.0, 0.0);
        assert_eq!(next, 3.0);
    }

    #[test]
    fn apply_scales_heat_source_by_dt() {
        let c = TemperatureCell::new(1.0, 4.0, 0.3);
        let next = DiffusionParams::new(0.0, 0.0).apply(&c, &[], 0.5, 0.0);
        assert_eq!(next.temperature, 3.0);
        assert_eq!(next.heat_source, 4.0);
        assert_eq!(next.insulation, 0.3);
    }

    #[test]
    fn insulation_is_ignored() {
        let neighbours = [cell(5.0); 3];
        let bare = DiffusionParams::default().apply(&cell(0.0), &neighbours, 0.1, 0.0);
        let insulated =
            DiffusionParams::default().apply(&TemperatureCell::new(0.0, 0.0, 1.0), &neighbours, 0.1, 0.0);
        assert_eq!(bare.temperature, insulated.temperature);
    }

    #[test]
    fn validate_rejects_non_finite() {
        assert!(DiffusionParams::default().validate().is_ok());
        assert!(matches!(
            DiffusionParams::new(f32::NAN, 0.0).validate(),
            Err(ConfigError::InvalidParameter { name: "diffusion_factor", .. })
        ));
        assert!(matches!(
            DiffusionParams::new(0.1, f32::INFINITY).validate(),
            Err(ConfigError::InvalidParameter { name: "cooling_factor", .. })
        ));
    }

    #[test]
    fn stable_dt_boundary() {
        assert_eq!(DiffusionParams::new(0.25, 0.0).stable_dt(), 1.0);
        assert!(DiffusionParams::new(0.0, 0.0).stable_dt().is_infinite());
    }

    #[test]
    fn large_step_overshoots() {
        // Past the stability boundary the centre swings below its neighbours.
        let neighbours = [cell(0.0); 4];
        let next = next_temperature(&cell(10.0), &neighbours, 1.0, 0.0, 0.0, 0.9, 0.0);
        assert!(next < 0.0);
    }

    #[test]
    fn diffuse_cell_omits_out_of_buffer_neighbours() {
        // 2x1 buffer: each cell sees exactly one neighbour.
        let input = [cell(4.0), cell(0.0)];
        let params = DiffusionParams::new(0.25, 0.0);
        let left = diffuse_cell(&input, 2, 1, 0, &params, 1.0, 0.0);
        let right = diffuse_cell(&input, 2, 1, 1, &params, 1.0, 0.0);
        assert_eq!(left.temperature, 3.0);
        assert_eq!(right.temperature, 1.0);
    }

    proptest! {
        #[test]
        fn uniform_neighbourhood_is_fixed_point(
            t in -100.0f32..100.0,
            n in 0usize..=4,
            dt in 0.0f32..2.0,
            d in 0.0f32..2.0,
        ) {
            let neighbours = vec![cell(t); n];
            let next = next_temperature(&cell(t), &neighbours, dt, t, 0.0, d, -0.3);
            prop_assert_eq!(next, t);
        }
    }
}
