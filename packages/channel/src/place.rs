//! Attaching user cross-sections to the rasterized bank.
//!
//! A cross-section is translated so its left end sits on the rasterized bank
//! vertex nearest to where it met the original bank, then rotated about
//! that end onto one of the eight grid directions and rasterized down to its
//! first and last cell centroids.

use geo::{Coord, Line, LineString, Translate};
use schematizer_channel_models::{CrossSectionKind, UserCrossSection};
use schematizer_grid::{measure, orient::orient_to_octant, raster};
use schematizer_grid_models::Calibration;

use crate::ChannelError;

/// A cross-section attached to one vertex of a rasterized bank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedCrossSection {
    pub user_xs_fid: i64,
    pub kind: CrossSectionKind,
    /// Index of the rasterized bank vertex at the left end.
    pub vertex: usize,
    pub line: Line<f64>,
    pub interpolated: bool,
}

impl PlacedCrossSection {
    /// A synthesized copy shifted by `(dx, dy)` onto bank vertex `vertex`.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64, vertex: usize) -> Self {
        Self {
            vertex,
            line: self.line.translate(dx, dy),
            interpolated: true,
            ..*self
        }
    }
}

/// Snaps `xs` onto `rasterized` (the grid chain of `bank`) and orients it.
///
/// # Errors
///
/// Returns [`ChannelError::GeometryOpFailed`] if the cross-section or the
/// rasterized bank has no vertices, or the cross-section collapses to a
/// point so its direction is undefined.
pub fn place(
    xs: &UserCrossSection,
    bank: &LineString<f64>,
    rasterized: &LineString<f64>,
    calibration: &Calibration,
) -> Result<PlacedCrossSection, ChannelError> {
    let (Some(&first), Some(&last)) = (xs.geometry.0.first(), xs.geometry.0.last()) else {
        return Err(ChannelError::GeometryOpFailed {
            message: format!("cross-section {} has no vertices", xs.fid),
        });
    };

    let station = measure::nearest_point(bank, first.into());
    let (vertex, node) = measure::closest_vertex(rasterized, station).ok_or_else(|| {
        ChannelError::GeometryOpFailed {
            message: "rasterized bank has no vertices".to_string(),
        }
    })?;

    let shifted = Line::new(first, last).translate(node.x - first.x, node.y - first.y);
    let line = orient(shifted, calibration).ok_or_else(|| ChannelError::GeometryOpFailed {
        message: format!("cross-section {} has coincident ends", xs.fid),
    })?;

    Ok(PlacedCrossSection {
        user_xs_fid: xs.fid,
        kind: xs.kind,
        vertex,
        line,
        interpolated: false,
    })
}

/// Rounds `line` onto the nearest grid direction and rasterizes it, keeping
/// only the first and last cell centroids.
#[must_use]
pub fn orient(line: Line<f64>, calibration: &Calibration) -> Option<Line<f64>> {
    let oriented = orient_to_octant(line.start.into(), line.end.into())?;
    let cells: Vec<Coord<f64>> =
        raster::snap_segment(oriented.start.into(), oriented.end.into(), calibration);
    Some(Line::new(*cells.first()?, *cells.last()?))
}

/// Drops user cross-sections that do not advance along the bank.
///
/// Two cross-sections snapping to the same vertex keep the first one; one
/// snapping behind its predecessor is dropped as well.
#[must_use]
pub fn retain_advancing(bank_fid: i64, placed: Vec<PlacedCrossSection>) -> Vec<PlacedCrossSection> {
    let mut kept: Vec<PlacedCrossSection> = Vec::with_capacity(placed.len());
    for xs in placed {
        if let Some(previous) = kept.last()
            && xs.vertex <= previous.vertex
        {
            log::warn!(
                "Bank line {bank_fid}: cross-section {} snaps to vertex {} already covered by \
                 cross-section {}, dropping it",
                xs.user_xs_fid,
                xs.vertex,
                previous.user_xs_fid
            );
            continue;
        }
        kept.push(xs);
    }
    kept
}
