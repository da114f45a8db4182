//! Output side of a pass.
//!
//! Every feature's rows reach the sink in one [`Rows`] value, after the
//! feature's whole pipeline has succeeded. A sink therefore never sees rows
//! of a feature that was skipped.

use schematizer_channel_models::{ConfluenceRow, DistanceRow, SchematicCrossSection, SchematicSegment};
use schematizer_levee_models::{BlockedCellRow, LeveeSideRow};
use schematizer_street_models::{
    FloodplainCellRow, FloodplainRow, StreetElementRow, StreetRow, StreetSegmentRow,
};
use serde::Serialize;

/// Rows produced by one feature, or by the confluence stage of a channel
/// pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Rows {
    Channel {
        segment: SchematicSegment,
        cross_sections: Vec<SchematicCrossSection>,
        distances: Vec<DistanceRow>,
    },
    Confluences(Vec<ConfluenceRow>),
    LeveeSides(Vec<LeveeSideRow>),
    BlockedCells(Vec<BlockedCellRow>),
    Street {
        street: StreetRow,
        segments: Vec<StreetSegmentRow>,
        elements: Vec<StreetElementRow>,
    },
    Floodplain {
        line: FloodplainRow,
        cells: Vec<FloodplainCellRow>,
    },
}

impl Rows {
    /// Number of table rows carried.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Channel {
                cross_sections,
                distances,
                ..
            } => 1 + cross_sections.len() + distances.len(),
            Self::Confluences(rows) => rows.len(),
            Self::LeveeSides(rows) => rows.len(),
            Self::BlockedCells(rows) => rows.len(),
            Self::Street {
                segments, elements, ..
            } => 1 + segments.len() + elements.len(),
            Self::Floodplain { cells, .. } => 1 + cells.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Destination for schematized rows.
pub trait RowSink {
    fn emit(&mut self, rows: Rows);
}

/// Collects every emitted row into per-table lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchematicOutput {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<SchematicSegment>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cross_sections: Vec<SchematicCrossSection>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub distances: Vec<DistanceRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub confluences: Vec<ConfluenceRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub levee_sides: Vec<LeveeSideRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocked_cells: Vec<BlockedCellRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub streets: Vec<StreetRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub street_segments: Vec<StreetSegmentRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub street_elements: Vec<StreetElementRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub floodplain_lines: Vec<FloodplainRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub floodplain_cells: Vec<FloodplainCellRow>,
}

impl RowSink for SchematicOutput {
    fn emit(&mut self, rows: Rows) {
        match rows {
            Rows::Channel {
                segment,
                cross_sections,
                distances,
            } => {
                self.segments.push(segment);
                self.cross_sections.extend(cross_sections);
                self.distances.extend(distances);
            }
            Rows::Confluences(rows) => self.confluences.extend(rows),
            Rows::LeveeSides(rows) => self.levee_sides.extend(rows),
            Rows::BlockedCells(rows) => self.blocked_cells.extend(rows),
            Rows::Street {
                street,
                segments,
                elements,
            } => {
                self.streets.push(street);
                self.street_segments.extend(segments);
                self.street_elements.extend(elements);
            }
            Rows::Floodplain { line, cells } => {
                self.floodplain_lines.push(line);
                self.floodplain_cells.extend(cells);
            }
        }
    }
}

impl<S: RowSink + ?Sized> RowSink for &mut S {
    fn emit(&mut self, rows: Rows) {
        (**self).emit(rows);
    }
}
