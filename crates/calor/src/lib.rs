//! Calor: windowed heat diffusion over large 2D fields.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Calor sub-crates. For most users, adding `calor` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use calor::prelude::*;
//!
//! // A 200x200 field at 10 degrees, with one hot spot.
//! let field = FieldConfig { width: 200, height: 200, ..FieldConfig::default() };
//! let mut world = field.build().unwrap();
//! let hot = world.world_to_cell(WorldPos::new(40.5, 40.5));
//! world.set_at(hot, TemperatureCell::new(80.0, 5.0, 0.0)).unwrap();
//!
//! // Step a 32x32 window around the hot spot on the host engine.
//! let config = StepperConfig {
//!     params: DiffusionParams::new(0.2, 0.0),
//!     ..StepperConfig::default()
//! };
//! let mut stepper = WindowedStepper::new(SoftwareEngine::new(), 200, 200, config).unwrap();
//! for _ in 0..10 {
//!     stepper.step(&mut world, GridPos::new(24, 24), 0.1).unwrap();
//! }
//! assert!(world.get_at(hot).unwrap().temperature < 80.0);
//! assert_eq!(world.get(0, 0).unwrap().temperature, 10.0);
//! assert_eq!(stepper.step_count(), 10);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `calor-core` | `TemperatureCell`, positions, error types |
//! | [`grid`] | `calor-grid` | Grids, world mapping, neighbours, window sync |
//! | [`diffusion`] | `calor-diffusion` | Kernel, CPU stepper, compute engines, windowed stepper |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Cell type, positions and errors (`calor-core`).
pub use calor_core as types;

/// Grid storage and spatial operations (`calor-grid`).
///
/// [`grid::Grid`] and [`grid::WorldGrid`] share the [`grid::GridAccess`]
/// trait; [`grid::read_into`] and [`grid::write_from`] move windows.
pub use calor_grid as grid;

/// Diffusion kernels and steppers (`calor-diffusion`).
///
/// [`diffusion::CpuDiffusion`] for whole-grid sequential sweeps,
/// [`diffusion::WindowedStepper`] over any [`diffusion::ComputeEngine`].
pub use calor_diffusion as diffusion;

/// Common imports for typical Calor usage.
///
/// ```rust
/// use calor::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use calor_core::{GridPos, TemperatureCell, WorldPos};

    // Errors
    pub use calor_core::{ConfigError, EngineError, GridError, StepError};

    // Grids
    pub use calor_grid::{neighbours_at, read_into, write_from, Grid, GridAccess, WorldGrid};

    // Diffusion
    pub use calor_diffusion::{
        ComputeEngine, CpuDiffusion, DiffusionParams, FieldConfig, HeatmapParams,
        RemainderPolicy, SoftwareEngine, StepMetrics, StepperConfig, WindowedStepper,
    };
}
