//! Levee lines to claimed octagon sides.
//!
//! Every levee line is clipped to each cell it crosses. Each contiguous part
//! inside the cell enters it in one octant and leaves it in another, crossing
//! the octagon sides between them. Interior vertices do not split a part. A (cell, side) pair belongs to the first line
//! that crosses it; later lines crossing the same side are ignored there.

use std::collections::{BTreeMap, BTreeSet, btree_map::Entry};

use geo::{BoundingRect, Coord, Line, LineString, Point, Rect};
use schematizer_grid::{
    CellLocator,
    octagon::{OCTAGON_RATIO, classify, edge_geometry, is_clockwise, side_walk},
};
use schematizer_grid_models::{CellId, OctagonSide};
use schematizer_levee_models::{LeveeLine, LeveeSideRow};

use crate::LeveeError;

/// Share of the cell the levee octagon is drawn at.
pub const DEFAULT_SCALE: f64 = 0.9;

/// Sides one levee line crosses in one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellCrossing {
    pub cell: CellId,
    pub centroid: Point<f64>,
    /// Ascending side indices.
    pub sides: Vec<OctagonSide>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeveeFailure {
    pub line_fid: i64,
    pub error: LeveeError,
}

#[derive(Debug, Default)]
pub struct LeveeRun {
    /// Ordered by cell, then side.
    pub rows: Vec<LeveeSideRow>,
    pub failures: Vec<LeveeFailure>,
}

struct Claim {
    line: usize,
    centroid: Point<f64>,
}

pub struct LeveeSchematizer<'a, L: CellLocator> {
    locator: &'a L,
    scale: f64,
}

impl<'a, L: CellLocator> LeveeSchematizer<'a, L> {
    #[must_use]
    pub const fn new(locator: &'a L) -> Self {
        Self {
            locator,
            scale: DEFAULT_SCALE,
        }
    }

    /// Overrides the octagon scale factor.
    #[must_use]
    pub const fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Cells `line` crosses along with the sides it crosses in each. Cells
    /// where the line never leaves its entry octant are omitted.
    ///
    /// # Errors
    ///
    /// * [`LeveeError::GeometryOpFailed`] if the line has fewer than two
    ///   vertices
    /// * [`LeveeError::Grid`] if a crossed cell cannot be resolved
    pub fn crossed_sides(&self, line: &LeveeLine) -> Result<Vec<CellCrossing>, LeveeError> {
        if line.geometry.0.len() < 2 {
            return Err(LeveeError::GeometryOpFailed {
                message: format!("levee line {} has fewer than 2 vertices", line.fid),
            });
        }

        let mut crossings = Vec::new();
        for cell in self.locator.cells_intersecting(&line.geometry) {
            let square = self.locator.cell_polygon(cell)?;
            let centroid = self.locator.centroid_of(cell)?;
            let Some(bounds) = square.bounding_rect() else {
                continue;
            };

            let mut sides = BTreeSet::new();
            for (entry, exit) in contiguous_parts(&line.geometry, bounds) {
                let from = (entry.x - centroid.x(), entry.y - centroid.y());
                let to = (exit.x - centroid.x(), exit.y - centroid.y());
                sides.extend(side_walk(
                    classify(from.0, from.1),
                    classify(to.0, to.1),
                    is_clockwise(from, to),
                ));
            }

            if !sides.is_empty() {
                crossings.push(CellCrossing {
                    cell,
                    centroid,
                    sides: sides.into_iter().collect(),
                });
            }
        }
        Ok(crossings)
    }

    /// Schematizes `lines` in order, the earlier line winning contested
    /// sides. A failing line claims nothing and is reported.
    #[must_use]
    pub fn schematize_all(&self, lines: &[LeveeLine]) -> LeveeRun {
        let mut claims: BTreeMap<(CellId, OctagonSide), Claim> = BTreeMap::new();
        let mut failures = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            let crossings = match self.crossed_sides(line) {
                Ok(crossings) => crossings,
                Err(error) => {
                    log::warn!("Skipping levee line {}: {error}", line.fid);
                    failures.push(LeveeFailure {
                        line_fid: line.fid,
                        error,
                    });
                    continue;
                }
            };

            for crossing in crossings {
                for side in crossing.sides {
                    match claims.entry((crossing.cell, side)) {
                        Entry::Vacant(slot) => {
                            slot.insert(Claim {
                                line: index,
                                centroid: crossing.centroid,
                            });
                        }
                        Entry::Occupied(claimed) => log::debug!(
                            "Cell {} side {}: line {} already claimed it, ignoring line {}",
                            crossing.cell,
                            side.index(),
                            lines[claimed.get().line].fid,
                            line.fid
                        ),
                    }
                }
            }
        }

        let half_square = self.half_square();
        let half_octagon = half_square / OCTAGON_RATIO;
        let rows: Vec<LeveeSideRow> = claims
            .into_iter()
            .map(|((cell, side), claim)| {
                let owner = &lines[claim.line];
                LeveeSideRow {
                    cell,
                    direction: side.direction(),
                    elevation: owner.elevation,
                    line_fid: owner.fid,
                    geometry: edge_geometry(claim.centroid, side, half_square, half_octagon),
                }
            })
            .collect();

        log::info!(
            "Schematized {} levee side(s) from {} line(s)",
            rows.len(),
            lines.len() - failures.len()
        );
        LeveeRun { rows, failures }
    }

    fn half_square(&self) -> f64 {
        self.locator.cell_size() * 0.5 * self.scale
    }
}

/// Entry and exit points of each contiguous run of `line` inside `bounds`,
/// in line order.
fn contiguous_parts(line: &LineString<f64>, bounds: Rect<f64>) -> Vec<(Coord<f64>, Coord<f64>)> {
    let mut parts: Vec<(Coord<f64>, Coord<f64>)> = Vec::new();
    let mut open = false;
    for segment in line.lines() {
        let Some((t0, t1)) = clip_segment(segment, bounds) else {
            open = false;
            continue;
        };
        let delta = segment.delta();
        let entry = segment.start + delta * t0;
        let exit = segment.start + delta * t1;
        match parts.last_mut() {
            Some(part) if open && t0 <= 0.0 => part.1 = exit,
            _ => parts.push((entry, exit)),
        }
        open = t1 >= 1.0;
    }
    parts
}

/// Liang-Barsky parameter range of `segment` inside `bounds`.
fn clip_segment(segment: Line<f64>, bounds: Rect<f64>) -> Option<(f64, f64)> {
    let delta = segment.delta();
    let (min, max) = (bounds.min(), bounds.max());
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [
        (-delta.x, segment.start.x - min.x),
        (delta.x, max.x - segment.start.x),
        (-delta.y, segment.start.y - min.y),
        (delta.y, max.y - segment.start.y),
    ] {
        if p.abs() < f64::EPSILON {
            if q < 0.0 {
                return None;
            }
        } else {
            let t = q / p;
            if p < 0.0 {
                t0 = t0.max(t);
            } else {
                t1 = t1.min(t);
            }
        }
    }
    (t0 <= t1).then_some((t0, t1))
}
