#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Levees and blocked areas on the octagon model of a cell.
//!
//! [`schematic`] turns levee lines into claimed octagon sides, [`crest`]
//! assigns crest elevations to those sides from surveyed points or
//! elevation polygons, and [`blocked`] computes area and width reduction
//! factors for cells covered by blocked-area polygons.

pub mod blocked;
pub mod crest;
pub mod schematic;

pub use schematic::{LeveeFailure, LeveeRun, LeveeSchematizer};

use schematizer_grid::GridError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LeveeError {
    #[error("Geometry operation failed: {message}")]
    GeometryOpFailed { message: String },

    #[error(transparent)]
    Grid(#[from] GridError),
}
