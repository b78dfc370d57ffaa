//! Field population and whole-field statistics.

use calor_core::{ConfigError, TemperatureCell};
use calor_grid::GridAccess;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Set every cell's temperature to a uniform random value in `[min, max]`.
///
/// Heat source and insulation are kept. The same `seed` always produces the
/// same field. Returns [`ConfigError::InvalidRange`] if either bound is not
/// finite or `min > max`.
pub fn populate_random_temperatures<G>(
    grid: &mut G,
    min: f32,
    max: f32,
    seed: u64,
) -> Result<(), ConfigError>
where
    G: GridAccess<TemperatureCell> + ?Sized,
{
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(ConfigError::InvalidRange { min, max });
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for cell in grid.data_mut() {
        cell.temperature = rng.random_range(min..=max);
    }
    debug!(min, max, seed, cells = grid.cell_count(), "populated random temperatures");
    Ok(())
}

/// Mean temperature over the whole grid.
///
/// Diffusion alone (no sources, no cooling, closed boundary) conserves total
/// heat, so this is the temperature a closed field relaxes toward.
pub fn mean_temperature<G>(grid: &G) -> f32
where
    G: GridAccess<TemperatureCell> + ?Sized,
{
    let sum: f64 = grid.data().iter().map(|c| f64::from(c.temperature)).sum();
    (sum / grid.cell_count() as f64) as f32
}
