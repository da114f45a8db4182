//! Floodplain cross-section sampling.
//!
//! A floodplain cross-section is moved so it starts on its start cell's
//! centroid, rotated onto the nearest of the eight grid directions and then
//! sampled at a fixed step: one cell for axis-aligned lines, one cell
//! diagonal otherwise.

use geo::{Coord, Line, Point};
use schematizer_grid::{CellLocator, orient::orient_to_octant};
use schematizer_grid_models::CellId;
use schematizer_street_models::{FloodplainCellRow, FloodplainLine, FloodplainRow};

use crate::{FeatureFailure, StreetError};

#[derive(Debug, Default)]
pub struct FloodplainRun {
    pub lines: Vec<FloodplainRow>,
    pub cells: Vec<FloodplainCellRow>,
    pub failures: Vec<FeatureFailure>,
}

pub struct FloodplainSampler<'a, L: CellLocator> {
    locator: &'a L,
}

impl<'a, L: CellLocator> FloodplainSampler<'a, L> {
    #[must_use]
    pub const fn new(locator: &'a L) -> Self {
        Self { locator }
    }

    /// Schematizes one floodplain cross-section.
    ///
    /// Samples past the edge of the grid are skipped.
    ///
    /// # Errors
    ///
    /// * [`StreetError::GeometryOpFailed`] if the line has no vertices or
    ///   its ends coincide once moved onto the start centroid
    /// * [`StreetError::Grid`] if the start or rotated end lies outside the
    ///   grid
    pub fn sample(&self, line: &FloodplainLine) -> Result<(FloodplainRow, Vec<FloodplainCellRow>), StreetError> {
        let (Some(&start), Some(&end)) = (line.geometry.0.first(), line.geometry.0.last()) else {
            return Err(StreetError::GeometryOpFailed {
                message: format!("floodplain cross-section {} has no vertices", line.fid),
            });
        };

        let start_cell = self.locator.cell_id_at(start.into())?;
        let start_centroid = self.locator.centroid_of(start_cell)?;
        let shifted_end = Point::new(
            end.x + (start_centroid.x() - start.x),
            end.y + (start_centroid.y() - start.y),
        );

        let oriented = orient_to_octant(start_centroid, shifted_end).ok_or_else(|| {
            StreetError::GeometryOpFailed {
                message: format!("floodplain cross-section {} has coincident ends", line.fid),
            }
        })?;
        let end_cell = self.locator.cell_id_at(oriented.end)?;
        let end_centroid = self.locator.centroid_of(end_cell)?;

        let cell_size = self.locator.cell_size();
        let step = if oriented.is_axis_aligned() {
            cell_size
        } else {
            cell_size * std::f64::consts::SQRT_2
        };
        let geometry = Line::new(Coord::from(start_centroid), Coord::from(end_centroid));

        let cells: Vec<FloodplainCellRow> = sample_points(geometry, step)
            .into_iter()
            .filter_map(|point| match self.cell_at(point) {
                Ok((cell, centroid)) => Some(FloodplainCellRow {
                    floodplain_fid: line.fid,
                    cell,
                    geometry: centroid,
                }),
                Err(e) => {
                    log::debug!("Floodplain cross-section {}: skipping sample: {e}", line.fid);
                    None
                }
            })
            .collect();

        let row = FloodplainRow {
            fid: line.fid,
            iflo: line.iflo,
            start_cell,
            end_cell,
            geometry,
            sample_count: cells.len(),
        };
        Ok((row, cells))
    }

    #[must_use]
    pub fn sample_all(&self, lines: &[FloodplainLine]) -> FloodplainRun {
        let mut run = FloodplainRun::default();
        for line in lines {
            match self.sample(line) {
                Ok((row, cells)) => {
                    run.lines.push(row);
                    run.cells.extend(cells);
                }
                Err(error) => {
                    log::warn!("Skipping floodplain cross-section {}: {error}", line.fid);
                    run.failures.push(FeatureFailure {
                        fid: line.fid,
                        error,
                    });
                }
            }
        }
        log::info!(
            "Sampled {} floodplain cross-section(s) into {} cell(s)",
            run.lines.len(),
            run.cells.len()
        );
        run
    }

    fn cell_at(&self, point: Point<f64>) -> Result<(CellId, Point<f64>), StreetError> {
        let cell = self.locator.cell_id_at(point)?;
        Ok((cell, self.locator.centroid_of(cell)?))
    }
}

/// Points along `line` from its start at multiples of `step`. The number of
/// steps is the rounded ratio of length to step, and samples never pass the
/// line's end.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn sample_points(line: Line<f64>, step: f64) -> Vec<Point<f64>> {
    let length = line.dx().hypot(line.dy());
    if length <= 0.0 || step <= 0.0 {
        return vec![line.start.into()];
    }

    let reps = (length / step).round_ties_even() as usize;
    (0..=reps)
        .map(|k| {
            let t = (k as f64 * step).min(length) / length;
            Point::new(
                line.dx().mul_add(t, line.start.x),
                line.dy().mul_add(t, line.start.y),
            )
        })
        .collect()
}
