#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Channel input features and schematic output rows.
//!
//! A channel is drawn by the user as a left bank line (optionally with a
//! right bank line) crossed by cross-sections. Schematization turns each
//! bank line into a [`SchematicSegment`] that owns an ordered chain of
//! [`SchematicCrossSection`]s, one per rasterized bank vertex.

use geo::{Line, LineString};
use schematizer_grid_models::CellId;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Shape family of a cross-section as drawn by the user.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum CrossSectionKind {
    /// Rectangular prismatic section.
    #[serde(rename = "R")]
    #[strum(serialize = "R")]
    Rectangular,
    /// Variable-area section described by regression coefficients.
    #[serde(rename = "V")]
    #[strum(serialize = "V")]
    Variable,
    /// Trapezoidal prismatic section.
    #[serde(rename = "T")]
    #[strum(serialize = "T")]
    Trapezoidal,
    /// Natural section described by surveyed station/elevation pairs.
    #[serde(rename = "N")]
    #[strum(serialize = "N")]
    Natural,
}

/// A user-drawn channel bank line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankLine {
    /// Source feature id, reused as the schematic segment id.
    pub fid: i64,
    /// Left bank vertices in flow direction.
    pub geometry: LineString<f64>,
    /// Depth in the confluence tree; `None` or `<= 1` is a main channel.
    pub rank: Option<u32>,
    /// Optional user-drawn right bank.
    pub right_bank: Option<LineString<f64>>,
    /// Display name carried through unchanged.
    pub name: Option<String>,
}

/// A user-drawn cross-section. The first vertex is the left bank end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCrossSection {
    /// Source feature id.
    pub fid: i64,
    /// Shape family.
    pub kind: CrossSectionKind,
    /// Vertices from left to right.
    pub geometry: LineString<f64>,
}

/// A schematized bank segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchematicSegment {
    /// Segment id (the source bank line id).
    pub fid: i64,
    /// Confluence rank of the source bank line.
    pub rank: Option<u32>,
    /// Display name of the source bank line.
    pub name: Option<String>,
    /// Rasterized left bank through cell centroids.
    pub left_bank: LineString<f64>,
    /// Rasterized user right bank, or the chain of cross-section far ends.
    pub right_bank: LineString<f64>,
    /// Whether `right_bank` was derived from the cross-sections.
    pub right_bank_derived: bool,
}

/// A schematized cross-section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchematicCrossSection {
    /// Owning segment id.
    pub seg_fid: i64,
    /// 1-based position along the owning segment.
    pub nr_in_seg: u32,
    /// Id of the user cross-section this one was placed or translated from.
    pub user_xs_fid: i64,
    /// Shape family of the source cross-section.
    pub kind: CrossSectionKind,
    /// `false` for user-drawn, `true` for synthesized.
    pub interpolated: bool,
    /// Left (bank) end to right end, both on cell centroids unless clipped.
    pub geometry: Line<f64>,
    /// Cell containing the left end.
    pub left_cell: CellId,
    /// Cell containing the right end.
    pub right_cell: CellId,
}

/// Along-bank distances of a cross-section inside its interval.
///
/// An interval runs from one user-drawn cross-section to the next; the last
/// interval of a segment is open-ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceRow {
    /// Owning segment id.
    pub seg_fid: i64,
    /// Position of the cross-section along the segment.
    pub nr_in_seg: u32,
    /// Source user cross-section id.
    pub user_xs_fid: i64,
    /// Whether the cross-section is synthesized.
    pub interpolated: bool,
    /// Position of the interval's opening cross-section.
    pub up_nr: u32,
    /// Position of the interval's closing cross-section, `None` if open.
    pub lo_nr: Option<u32>,
    /// Distance from the interval start along the left bank.
    pub up_dist_left: f64,
    /// Distance from the interval start along the right bank.
    pub up_dist_right: f64,
    /// Interval length along the left bank (0 when open-ended).
    pub up_lo_dist_left: f64,
    /// Interval length along the right bank (0 when open-ended).
    pub up_lo_dist_right: f64,
}

/// Which bank of the receiving segment a tributary joins.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BankSide {
    Left,
    Right,
}

/// A tributary/receiver junction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfluenceRow {
    /// 1-based confluence id.
    pub conf_fid: u32,
    /// Trimmed tributary segment.
    pub tributary_seg_fid: i64,
    /// Receiving segment.
    pub main_seg_fid: i64,
    /// Last retained vertex position on the tributary.
    pub tributary_nr: u32,
    /// Tributary cell at the retained vertex.
    pub tributary_cell: CellId,
    /// Receiver cell nearest to the junction.
    pub main_cell: CellId,
    /// Receiver bank the tributary joins.
    pub side: BankSide,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_section_kind_uses_single_letter_tags() {
        assert_eq!("T".parse::<CrossSectionKind>(), Ok(CrossSectionKind::Trapezoidal));
        assert_eq!(CrossSectionKind::Natural.to_string(), "N");
        assert!("X".parse::<CrossSectionKind>().is_err());
    }

    #[test]
    fn bank_side_names() {
        assert_eq!(BankSide::Left.as_ref(), "left");
        assert_eq!("right".parse::<BankSide>(), Ok(BankSide::Right));
    }
}
