#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Leaf utilities shared by every schematizer.
//!
//! - [`calibration`] derives the offset that makes float-to-grid rounding
//!   exact for a given grid.
//! - [`locator`] defines the [`CellLocator`] oracle and [`grid`] provides an
//!   in-memory, R-tree backed implementation of it.
//! - [`raster`] snaps float coordinates to the grid and rasterizes lines
//!   with integer Bresenham stepping.
//! - [`octagon`] classifies vectors against the octagon inscribed in a cell
//!   and builds per-side edge geometry.
//! - [`measure`] holds the along-line measurements (locate, nearest point,
//!   closest vertex) the channel, levee and floodplain code share.
//! - [`orient`] rounds a two-point line onto one of the eight axis/diagonal
//!   directions.

pub mod calibration;
pub mod grid;
pub mod locator;
pub mod measure;
pub mod octagon;
pub mod orient;
pub mod raster;

pub use calibration::calibrate;
pub use grid::Grid;
pub use locator::CellLocator;

use schematizer_grid_models::CellId;
use thiserror::Error;

/// Errors raised by grid lookups and calibration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// The grid cannot be calibrated (degenerate cell size, empty grid).
    #[error("Calibration error: {message}")]
    Calibration {
        /// Description of what went wrong.
        message: String,
    },

    /// A query point lies outside the grid domain.
    #[error("No grid cell found at ({x}, {y})")]
    NoCellFound {
        /// Query x coordinate.
        x: f64,
        /// Query y coordinate.
        y: f64,
    },

    /// A cell id is not part of the grid.
    #[error("Unknown grid cell {0}")]
    UnknownCell(CellId),
}
