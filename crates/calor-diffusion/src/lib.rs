//! Heat diffusion for Calor.
//!
//! Two ways to advance a temperature field:
//!
//! - [`CpuDiffusion`]: a sequential in-place sweep over a whole grid, the
//!   reference for correctness.
//! - [`WindowedStepper`]: copies a fixed-size window of a large field into
//!   engine buffers, runs the kernel across work groups on a
//!   [`ComputeEngine`], and writes the result back. [`SoftwareEngine`] is
//!   the host implementation.
//!
//! Both compute the update rule in [`kernel`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod cpu;
pub mod engine;
pub mod heatmap;
pub mod kernel;
pub mod metrics;
pub mod populate;
pub mod software;
pub mod stepper;

pub use config::{FieldConfig, StepperConfig};
pub use cpu::CpuDiffusion;
pub use engine::{ComputeEngine, DiffusionDispatch, HeatmapDispatch, RemainderPolicy, WorkGroups};
pub use heatmap::{HeatmapImage, HeatmapParams};
pub use kernel::{next_temperature, DiffusionParams};
pub use metrics::StepMetrics;
pub use populate::{mean_temperature, populate_random_temperatures};
pub use software::{SoftwareBuffer, SoftwareEngine};
pub use stepper::WindowedStepper;
