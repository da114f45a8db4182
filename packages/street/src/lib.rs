#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Streets and floodplain cross-sections on the grid.

pub mod floodplain;
pub mod streets;

pub use floodplain::{FloodplainRun, FloodplainSampler};
pub use streets::{StreetRun, StreetSchematizer};

use schematizer_grid::GridError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StreetError {
    #[error("Geometry operation failed: {message}")]
    GeometryOpFailed { message: String },

    #[error(transparent)]
    Grid(#[from] GridError),
}

/// A feature that could not be schematized.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFailure {
    pub fid: i64,
    pub error: StreetError,
}
