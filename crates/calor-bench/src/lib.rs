//! Benchmark profiles for the Calor heat simulation.
//!
//! - [`reference_profile`]: 1000x1000 field with the default 32x32 window.
//! - [`stress_profile`]: same field with a 256x256 window (64K cells per step).
//! - [`sweep_offsets`]: deterministic window positions covering the field.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use calor_core::{ConfigError, GridPos, TemperatureCell};
use calor_diffusion::{
    populate_random_temperatures, DiffusionParams, FieldConfig, StepperConfig,
};
use calor_grid::WorldGrid;

/// A field plus stepper configuration to benchmark against.
#[derive(Clone, Debug)]
pub struct BenchProfile {
    /// Backing field.
    pub field: FieldConfig,
    /// Windowed stepper.
    pub stepper: StepperConfig,
    /// Seed for the random initial temperatures.
    pub seed: u64,
    /// Step size. Kept under `DiffusionParams::stable_dt`.
    pub delta_time: f32,
}

impl BenchProfile {
    /// Build the field and fill it with seeded random temperatures in
    /// `[0, 100]`.
    pub fn build_world(&self) -> Result<WorldGrid<TemperatureCell>, ConfigError> {
        let mut world = self.field.build()?;
        populate_random_temperatures(&mut world, 0.0, 100.0, self.seed)?;
        Ok(world)
    }
}

/// Reference profile: 1000x1000 field, 32x32 window, D=0.2, dt=0.1
/// (within the stability limit of 1/(4*0.2) = 1.25).
pub fn reference_profile(seed: u64) -> BenchProfile {
    BenchProfile {
        field: FieldConfig::default(),
        stepper: StepperConfig {
            params: DiffusionParams::new(0.2, 0.0),
            ..StepperConfig::default()
        },
        seed,
        delta_time: 0.1,
    }
}

/// Stress profile: as [`reference_profile`] with a 256x256 window.
pub fn stress_profile(seed: u64) -> BenchProfile {
    let mut profile = reference_profile(seed);
    profile.stepper.window_width = 256;
    profile.stepper.window_height = 256;
    profile
}

/// `count` window offsets walking diagonally across the field and wrapping
/// so every window fits. `window` must fit inside `field`.
pub fn sweep_offsets(
    field: (u32, u32),
    window: (u32, u32),
    count: usize,
) -> Vec<GridPos> {
    let span_x = (field.0 - window.0 + 1) as usize;
    let span_y = (field.1 - window.1 + 1) as usize;
    (0..count)
        .map(|i| {
            let step = i * window.0.max(1) as usize;
            GridPos::new((step % span_x) as i32, ((step / 3) % span_y) as i32)
        })
        .collect()
}
