#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Levee and blocked-area inputs and the rows produced from them.

use geo::{Line, LineString, Point, Polygon};
use schematizer_grid_models::{CellId, Direction};
use serde::{Deserialize, Serialize};

/// A user-drawn levee crest line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeveeLine {
    pub fid: i64,
    pub geometry: LineString<f64>,
    /// Crest elevation applied to every side the line claims.
    pub elevation: Option<f64>,
    pub name: Option<String>,
}

/// A surveyed crest elevation near a levee line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrestPoint {
    pub fid: i64,
    pub geometry: Point<f64>,
    pub elevation: f64,
}

/// A polygon assigning crest elevations to the levee sides inside it.
///
/// `elevation` replaces the crest, `correction` is added to it (or to the
/// existing crest when no elevation is given).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElevationPolygon {
    pub fid: i64,
    pub geometry: Polygon<f64>,
    pub elevation: Option<f64>,
    pub correction: Option<f64>,
}

/// A polygon obstructing flow through the cells it covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedArea {
    pub fid: i64,
    pub geometry: Polygon<f64>,
}

/// A levee on one octagon side of one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeveeSideRow {
    pub cell: CellId,
    pub direction: Direction,
    /// Crest elevation, from the owning line or a crest profile.
    pub elevation: Option<f64>,
    /// Levee line that claimed the side.
    pub line_fid: i64,
    /// Short edge of the (scaled) octagon along the side.
    pub geometry: Line<f64>,
}

/// Reduction factors of a cell partly covered by a blocked area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedCellRow {
    pub cell: CellId,
    pub area_fid: i64,
    pub centroid: Point<f64>,
    /// Blocked share of the cell area, rounded to two decimals.
    pub arf: f64,
    /// Blocked share of each octagon edge, in [`Direction::all`] order.
    pub wrf: [f64; 8],
}

impl BlockedCellRow {
    /// Whether the cell is treated as completely blocked.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.arf >= 1.0
    }
}
