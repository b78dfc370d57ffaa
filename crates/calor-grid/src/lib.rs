//! Grid storage for Calor simulations.
//!
//! This crate defines [`Grid`], a dense bounds-checked 2D container for
//! plain-data cells, [`WorldGrid`], which adds a physical cell size and
//! world/grid coordinate conversion, and the [`GridAccess`] capability
//! trait both implement.
//!
//! On top of those it provides the two spatial operations the diffusion
//! steppers are built from:
//!
//! - [`neighbours_at`]: 4-connected neighbour lookup with optional
//!   lookback overrides for row-major sweeps.
//! - [`read_into`] / [`write_from`]: all-or-nothing copies of a rectangular
//!   window between a backing grid and a smaller window grid.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod access;
pub mod grid;
pub mod neighbours;
pub mod window;
pub mod world;

pub use access::GridAccess;
pub use grid::Grid;
pub use neighbours::{neighbour_indices, neighbours_at};
pub use window::{read_into, write_from, GridBounds};
pub use world::WorldGrid;
