//! Core types for the Calor heat simulation.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! per-cell record, the grid/world position types and the error enums
//! shared by every other Calor crate.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod cell;
pub mod error;
pub mod pos;

pub use cell::TemperatureCell;
pub use error::{ConfigError, EngineError, GridError, StepError};
pub use pos::{GridPos, WorldPos};
