#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Street and floodplain cross-section inputs and rows.

use geo::{Line, LineString, MultiLineString, Point};
use schematizer_grid_models::{CellId, Direction};
use serde::{Deserialize, Serialize};

/// A user-drawn street centerline with its hydraulic attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetLine {
    pub fid: i64,
    pub geometry: LineString<f64>,
    pub name: Option<String>,
    pub notes: Option<String>,
    pub curb_height: Option<f64>,
    /// Manning's n of the street surface.
    pub roughness: Option<f64>,
    pub elevation: Option<f64>,
    pub width: Option<f64>,
}

/// One schematized street.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetRow {
    pub fid: i64,
    pub name: Option<String>,
    pub notes: Option<String>,
}

/// The street directions leaving one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetSegmentRow {
    /// 1-based segment id.
    pub fid: u32,
    /// Street that first reached the cell.
    pub street_fid: i64,
    pub cell: CellId,
    /// Half-cell stubs from the centroid, one per direction.
    pub geometry: MultiLineString<f64>,
    pub curb_height: Option<f64>,
    pub roughness: Option<f64>,
    pub elevation: Option<f64>,
}

/// One direction of a street segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetElementRow {
    pub seg_fid: u32,
    pub direction: Direction,
    pub width: Option<f64>,
}

/// A user-drawn floodplain cross-section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloodplainLine {
    pub fid: i64,
    pub geometry: LineString<f64>,
    /// Flow direction code the cross-section reports discharge for.
    pub iflo: Option<u8>,
}

/// A schematized floodplain cross-section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloodplainRow {
    pub fid: i64,
    pub iflo: Option<u8>,
    pub start_cell: CellId,
    pub end_cell: CellId,
    /// Start cell centroid to end cell centroid.
    pub geometry: Line<f64>,
    pub sample_count: usize,
}

/// A cell sampled along a floodplain cross-section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloodplainCellRow {
    pub floodplain_fid: i64,
    pub cell: CellId,
    pub geometry: Point<f64>,
}
