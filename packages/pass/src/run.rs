//! Pass runners.

use std::collections::BTreeMap;

use schematizer_channel::{ChannelSchematizer, distance_rows, resolve_confluences};
use schematizer_channel_models::{BankLine, UserCrossSection};
use schematizer_grid::{CellLocator, Grid, calibrate};
use schematizer_grid_models::{Calibration, GridMetadata};
use schematizer_levee::{LeveeSchematizer, blocked::blocked_cells, crest};
use schematizer_levee_models::{BlockedArea, CrestPoint, ElevationPolygon, LeveeLine};
use schematizer_street::{FloodplainSampler, StreetSchematizer};
use schematizer_street_models::{FloodplainLine, StreetLine};

use crate::{PassError, PassKind, PassReport, RowSink, Rows};

/// Levee pass settings beyond the lines themselves.
#[derive(Debug, Clone, Copy)]
pub struct LeveeOptions<'a> {
    /// Fraction of the cell the levee octagon spans.
    pub scale: f64,
    pub crest_points: &'a [CrestPoint],
    /// Maximum distance between a crest point and its levee line.
    pub crest_buffer: f64,
    pub elevation_polygons: &'a [ElevationPolygon],
}

impl Default for LeveeOptions<'_> {
    fn default() -> Self {
        Self {
            scale: schematizer_levee::schematic::DEFAULT_SCALE,
            crest_points: &[],
            crest_buffer: 0.0,
            elevation_polygons: &[],
        }
    }
}

/// A calibrated grid that passes run against.
pub struct PassContext<'a, L: CellLocator> {
    locator: &'a L,
    calibration: Calibration,
}

impl<'a> PassContext<'a, Grid> {
    /// Calibrates from the grid's lowest-id cell.
    ///
    /// # Errors
    ///
    /// Returns [`PassError::Calibration`] if the grid has no cells.
    pub fn from_grid(grid: &'a Grid) -> Result<Self, PassError> {
        let calibration = grid.calibration().map_err(PassError::Calibration)?;
        Ok(Self {
            locator: grid,
            calibration,
        })
    }
}

impl<'a, L: CellLocator> PassContext<'a, L> {
    /// Calibrates from caller-supplied grid metadata.
    ///
    /// # Errors
    ///
    /// Returns [`PassError::Calibration`] if the cell size is degenerate.
    pub fn new(locator: &'a L, metadata: GridMetadata) -> Result<Self, PassError> {
        let calibration =
            calibrate(metadata.reference_point, metadata.cell_size).map_err(PassError::Calibration)?;
        Ok(Self {
            locator,
            calibration,
        })
    }

    #[must_use]
    pub const fn calibration(&self) -> Calibration {
        self.calibration
    }

    /// Schematizes bank lines, resolves confluences between them and emits
    /// one [`Rows::Channel`] per surviving segment followed by the
    /// confluence rows.
    ///
    /// # Errors
    ///
    /// Returns [`PassError::EmptyInput`] if there are no bank lines or no
    /// cross-sections.
    pub fn run_channels(
        &self,
        banks: &[BankLine],
        cross_sections: &[UserCrossSection],
        mut sink: impl RowSink,
    ) -> Result<PassReport, PassError> {
        let mut report = start(PassKind::Channels, banks.is_empty() || cross_sections.is_empty())?;

        let schematizer = ChannelSchematizer::new(self.locator, self.calibration, cross_sections);
        let mut run = schematizer.schematize_all(banks);
        for failure in run.failures {
            report.skip(failure.bank_fid, failure.error);
        }

        let confluences = resolve_confluences(&mut run.segments, self.locator);

        for rows in run.segments {
            let distances = distance_rows(&rows.segment, &rows.cross_sections);
            emit(
                &mut sink,
                &mut report,
                Rows::Channel {
                    segment: rows.segment,
                    cross_sections: rows.cross_sections,
                    distances,
                },
            );
            report.processed += 1;
        }
        if !confluences.is_empty() {
            emit(&mut sink, &mut report, Rows::Confluences(confluences));
        }

        report.log();
        Ok(report)
    }

    /// Schematizes levee lines and refines side elevations from crest
    /// points and elevation polygons. Each line's sides are emitted
    /// together.
    ///
    /// # Errors
    ///
    /// Returns [`PassError::EmptyInput`] if there are no levee lines.
    pub fn run_levees(
        &self,
        lines: &[LeveeLine],
        options: &LeveeOptions<'_>,
        mut sink: impl RowSink,
    ) -> Result<PassReport, PassError> {
        let mut report = start(PassKind::Levees, lines.is_empty())?;

        let run = LeveeSchematizer::new(self.locator)
            .with_scale(options.scale)
            .schematize_all(lines);
        for failure in run.failures {
            report.skip(failure.line_fid, failure.error);
        }

        let mut by_line: BTreeMap<i64, Vec<_>> = BTreeMap::new();
        for row in run.rows {
            by_line.entry(row.line_fid).or_default().push(row);
        }

        for line in lines {
            let Some(mut rows) = by_line.remove(&line.fid) else {
                continue;
            };
            if !options.crest_points.is_empty() {
                let intervals = crest::intervals(&line.geometry, options.crest_points, options.crest_buffer);
                crest::apply_crest_profile(&mut rows, line, &intervals);
            }
            if !options.elevation_polygons.is_empty() {
                crest::apply_elevation_polygons(&mut rows, line, options.elevation_polygons);
            }
            emit(&mut sink, &mut report, Rows::LeveeSides(rows));
            report.processed += 1;
        }

        report.log();
        Ok(report)
    }

    /// Computes reduction factors for every blocked area, in input order.
    ///
    /// # Errors
    ///
    /// Returns [`PassError::EmptyInput`] if there are no blocked areas.
    pub fn run_blocked(&self, areas: &[BlockedArea], mut sink: impl RowSink) -> Result<PassReport, PassError> {
        let mut report = start(PassKind::Blocked, areas.is_empty())?;

        for area in areas {
            match blocked_cells(self.locator, area) {
                Ok(rows) => {
                    emit(&mut sink, &mut report, Rows::BlockedCells(rows));
                    report.processed += 1;
                }
                Err(error) => report.skip(area.fid, error),
            }
        }

        report.log();
        Ok(report)
    }

    /// Schematizes streets and emits each street with the segments it owns.
    ///
    /// # Errors
    ///
    /// Returns [`PassError::EmptyInput`] if there are no street lines.
    pub fn run_streets(&self, lines: &[StreetLine], mut sink: impl RowSink) -> Result<PassReport, PassError> {
        let mut report = start(PassKind::Streets, lines.is_empty())?;

        let run = StreetSchematizer::new(self.locator, self.calibration).schematize_all(lines);
        for failure in run.failures {
            report.skip(failure.fid, failure.error);
        }

        let mut elements: BTreeMap<u32, Vec<_>> = BTreeMap::new();
        for element in run.elements {
            elements.entry(element.seg_fid).or_default().push(element);
        }
        let mut segments: BTreeMap<i64, Vec<_>> = BTreeMap::new();
        for segment in run.segments {
            segments.entry(segment.street_fid).or_default().push(segment);
        }

        for street in run.streets {
            let owned = segments.remove(&street.fid).unwrap_or_default();
            let owned_elements = owned
                .iter()
                .flat_map(|segment| elements.remove(&segment.fid).unwrap_or_default())
                .collect();
            emit(
                &mut sink,
                &mut report,
                Rows::Street {
                    street,
                    segments: owned,
                    elements: owned_elements,
                },
            );
            report.processed += 1;
        }

        report.log();
        Ok(report)
    }

    /// Samples floodplain cross-sections and emits each with its cells.
    ///
    /// # Errors
    ///
    /// Returns [`PassError::EmptyInput`] if there are no floodplain lines.
    pub fn run_floodplain(&self, lines: &[FloodplainLine], mut sink: impl RowSink) -> Result<PassReport, PassError> {
        let mut report = start(PassKind::Floodplain, lines.is_empty())?;

        let sampler = FloodplainSampler::new(self.locator);
        for line in lines {
            match sampler.sample(line) {
                Ok((row, cells)) => {
                    emit(&mut sink, &mut report, Rows::Floodplain { line: row, cells });
                    report.processed += 1;
                }
                Err(error) => report.skip(line.fid, error),
            }
        }

        report.log();
        Ok(report)
    }
}

fn start(kind: PassKind, empty: bool) -> Result<PassReport, PassError> {
    if empty {
        log::error!("Nothing to schematize for the {kind} pass");
        return Err(PassError::EmptyInput { kind });
    }
    log::info!("Starting {kind} pass");
    Ok(PassReport::new(kind))
}

fn emit(sink: &mut impl RowSink, report: &mut PassReport, rows: Rows) {
    report.rows += rows.len();
    sink.emit(rows);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SchematicOutput;
    use geo::{LineString, Point, Polygon, Rect, coord};
    use schematizer_channel_models::CrossSectionKind;
    use schematizer_grid::{
        GridError,
        raster::{snap, unsnap},
    };
    use schematizer_grid_models::{CellId, Direction};

    /// 3 by 3 cells of 100 units over `[0, 300] x [0, 300]`. Ids run down
    /// each column from the north-west corner: (50, 250) is 1, (50, 50) is 3,
    /// (150, 150) is 5.
    fn grid() -> Grid {
        let boundary: Polygon<f64> =
            Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 300.0, y: 300.0 }).to_polygon();
        Grid::build(&boundary, 100.0).unwrap()
    }

    fn levee(fid: i64, points: Vec<(f64, f64)>, elevation: Option<f64>) -> LeveeLine {
        LeveeLine {
            fid,
            geometry: LineString::from(points),
            elevation,
            name: None,
        }
    }

    fn street(fid: i64, points: Vec<(f64, f64)>) -> StreetLine {
        StreetLine {
            fid,
            geometry: LineString::from(points),
            name: Some(format!("Street {fid}")),
            notes: None,
            curb_height: Some(0.5),
            roughness: None,
            elevation: None,
            width: Some(8.0),
        }
    }

    #[test]
    fn rejects_empty_input() {
        let grid = grid();
        let context = PassContext::from_grid(&grid).unwrap();
        let mut output = SchematicOutput::default();

        let result = context.run_streets(&[], &mut output);

        assert_eq!(result, Err(PassError::EmptyInput { kind: PassKind::Streets }));
    }

    #[test]
    fn rejects_degenerate_cell_size() {
        let grid = grid();
        let metadata = GridMetadata {
            cell_size: 0.0,
            reference_point: Point::new(50.0, 50.0),
        };

        let result = PassContext::new(&grid, metadata);

        assert!(matches!(
            result,
            Err(PassError::Calibration(GridError::Calibration { .. }))
        ));
    }

    #[test]
    fn calibrates_from_metadata() {
        let grid = grid();
        let metadata = GridMetadata {
            cell_size: 100.0,
            reference_point: Point::new(150.0, 150.0),
        };

        let context = PassContext::new(&grid, metadata).unwrap();
        let from_metadata = context.calibration();
        let from_first_cell = grid.calibration().unwrap();

        for calibration in [from_metadata, from_first_cell] {
            for cell in grid.cells() {
                let coord = snap(cell.centroid.x(), cell.centroid.y(), &calibration);
                let back = unsnap(coord, &calibration);
                assert!((back.x - cell.centroid.x()).abs() < 1e-9);
                assert!((back.y - cell.centroid.y()).abs() < 1e-9);
                assert_eq!(grid.cell_id_at(Point::from(back)).unwrap(), cell.id);
            }
        }
    }

    #[test]
    fn channel_pass_skips_bad_bank_and_keeps_good_one() {
        let grid = grid();
        let context = PassContext::from_grid(&grid).unwrap();
        let cross_sections = [
            UserCrossSection {
                fid: 10,
                kind: CrossSectionKind::Rectangular,
                geometry: LineString::from(vec![(50.0, 250.0), (50.0, 50.0)]),
            },
            UserCrossSection {
                fid: 11,
                kind: CrossSectionKind::Rectangular,
                geometry: LineString::from(vec![(250.0, 250.0), (250.0, 50.0)]),
            },
        ];
        let banks = [
            BankLine {
                fid: 1,
                geometry: LineString::from(vec![(50.0, 250.0), (250.0, 250.0)]),
                rank: None,
                right_bank: None,
                name: None,
            },
            BankLine {
                fid: 2,
                geometry: LineString::from(vec![(10.0, 290.0), (20.0, 290.0)]),
                rank: None,
                right_bank: None,
                name: None,
            },
        ];
        let mut output = SchematicOutput::default();

        let report = context.run_channels(&banks, &cross_sections, &mut output).unwrap();

        assert_eq!(report.processed, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].fid, 2);
        assert_eq!(output.segments.len(), 1);
        assert_eq!(output.segments[0].fid, 1);
        assert_eq!(output.cross_sections.len(), 3);
        assert_eq!(output.distances.len(), 3);
        assert!(output.confluences.is_empty());
        assert_eq!(report.rows, 1 + 3 + 3);
    }

    #[test]
    fn levee_pass_applies_line_elevation_and_crest_profile() {
        let grid = grid();
        let context = PassContext::from_grid(&grid).unwrap();
        let lines = [
            levee(1, vec![(10.0, 150.0), (290.0, 150.0)], Some(4.0)),
            levee(2, vec![(150.0, 10.0), (150.0, 90.0)], Some(2.0)),
        ];
        let crest_points = [
            CrestPoint {
                fid: 1,
                geometry: Point::new(10.0, 155.0),
                elevation: 10.0,
            },
            CrestPoint {
                fid: 2,
                geometry: Point::new(290.0, 155.0),
                elevation: 20.0,
            },
        ];
        let options = LeveeOptions {
            crest_points: &crest_points,
            crest_buffer: 10.0,
            ..LeveeOptions::default()
        };
        let mut output = SchematicOutput::default();

        let report = context.run_levees(&lines, &options, &mut output).unwrap();

        assert_eq!(report.processed, 2);
        assert!(report.skipped.is_empty());
        let first: Vec<f64> = output
            .levee_sides
            .iter()
            .filter(|row| row.line_fid == 1)
            .filter_map(|row| row.elevation)
            .collect();
        assert!(!first.is_empty());
        assert!(first.iter().all(|value| (10.0..=20.0).contains(value)));
        assert!(
            output
                .levee_sides
                .iter()
                .filter(|row| row.line_fid == 2)
                .all(|row| row.elevation == Some(2.0))
        );
    }

    #[test]
    fn blocked_pass_emits_each_area() {
        let grid = grid();
        let context = PassContext::from_grid(&grid).unwrap();
        let areas = [
            BlockedArea {
                fid: 1,
                geometry: Rect::new(coord! { x: 105.0, y: 105.0 }, coord! { x: 195.0, y: 195.0 })
                    .to_polygon(),
            },
            BlockedArea {
                fid: 2,
                geometry: Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 100.0, y: 100.0 }).to_polygon(),
            },
        ];
        let mut output = SchematicOutput::default();

        let report = context.run_blocked(&areas, &mut output).unwrap();

        assert_eq!(report.processed, 2);
        let first = &output.blocked_cells[0];
        assert_eq!(first.cell, CellId(5));
        assert_eq!(first.area_fid, 1);
        assert!((first.arf - 0.81).abs() < 1e-9);
        assert!(output.blocked_cells.iter().any(|row| row.area_fid == 2 && row.cell == CellId(3) && row.is_full()));
    }

    #[test]
    fn street_pass_groups_segments_by_owner() {
        let grid = grid();
        let context = PassContext::from_grid(&grid).unwrap();
        let lines = [
            street(1, vec![(50.0, 150.0), (250.0, 150.0)]),
            street(2, vec![(150.0, 250.0), (150.0, 150.0)]),
        ];
        let mut output = SchematicOutput::default();

        let report = context.run_streets(&lines, &mut output).unwrap();

        assert_eq!(report.processed, 2);
        assert_eq!(output.streets.len(), 2);
        let first_cells: Vec<CellId> = output
            .street_segments
            .iter()
            .filter(|segment| segment.street_fid == 1)
            .map(|segment| segment.cell)
            .collect();
        assert_eq!(first_cells, vec![CellId(2), CellId(5), CellId(8)]);

        let centre = output
            .street_segments
            .iter()
            .find(|segment| segment.cell == CellId(5))
            .unwrap();
        let mut directions: Vec<Direction> = output
            .street_elements
            .iter()
            .filter(|element| element.seg_fid == centre.fid)
            .map(|element| element.direction)
            .collect();
        directions.sort();
        assert_eq!(directions, vec![Direction::North, Direction::East, Direction::West]);
    }

    #[test]
    fn floodplain_pass_reports_lines_off_grid() {
        let grid = grid();
        let context = PassContext::from_grid(&grid).unwrap();
        let lines = [
            FloodplainLine {
                fid: 1,
                geometry: LineString::from(vec![(50.0, 50.0), (250.0, 50.0)]),
                iflo: Some(2),
            },
            FloodplainLine {
                fid: 2,
                geometry: LineString::from(vec![(500.0, 500.0), (600.0, 500.0)]),
                iflo: None,
            },
        ];
        let mut output = SchematicOutput::default();

        let report = context.run_floodplain(&lines, &mut output).unwrap();

        assert_eq!(report.processed, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].fid, 2);
        assert_eq!(output.floodplain_lines[0].sample_count, 3);
        assert_eq!(report.rows, 1 + 3);
    }
}
