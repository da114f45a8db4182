//! Per-cell street direction sets.
//!
//! Streets are rasterized onto integer grid coordinates. Every step between
//! consecutive cells adds the step direction to the cell it leaves and the
//! opposite direction to the cell it enters. The street that first reaches
//! a cell owns it; cells outside the grid are dropped.

use std::{
    cmp::Ordering,
    collections::{BTreeSet, HashMap},
};

use geo::{Coord, Line, MultiLineString};
use schematizer_grid::{CellLocator, raster};
use schematizer_grid_models::{Calibration, Direction, GridCoord};
use schematizer_street_models::{StreetElementRow, StreetLine, StreetRow, StreetSegmentRow};

use crate::{FeatureFailure, StreetError};

/// Direction of a step between two cells, `None` for no step.
#[must_use]
pub fn transition(from: GridCoord, to: GridCoord) -> Option<Direction> {
    match (to.tx.cmp(&from.tx), to.ty.cmp(&from.ty)) {
        (Ordering::Equal, Ordering::Greater) => Some(Direction::North),
        (Ordering::Greater, Ordering::Equal) => Some(Direction::East),
        (Ordering::Equal, Ordering::Less) => Some(Direction::South),
        (Ordering::Less, Ordering::Equal) => Some(Direction::West),
        (Ordering::Greater, Ordering::Greater) => Some(Direction::NorthEast),
        (Ordering::Greater, Ordering::Less) => Some(Direction::SouthEast),
        (Ordering::Less, Ordering::Less) => Some(Direction::SouthWest),
        (Ordering::Less, Ordering::Greater) => Some(Direction::NorthWest),
        (Ordering::Equal, Ordering::Equal) => None,
    }
}

#[derive(Debug, Default)]
pub struct StreetRun {
    pub streets: Vec<StreetRow>,
    pub segments: Vec<StreetSegmentRow>,
    pub elements: Vec<StreetElementRow>,
    pub failures: Vec<FeatureFailure>,
}

struct CellDirections {
    coord: GridCoord,
    owner: usize,
    directions: BTreeSet<Direction>,
}

pub struct StreetSchematizer<'a, L: CellLocator> {
    locator: &'a L,
    calibration: Calibration,
}

impl<'a, L: CellLocator> StreetSchematizer<'a, L> {
    #[must_use]
    pub const fn new(locator: &'a L, calibration: Calibration) -> Self {
        Self {
            locator,
            calibration,
        }
    }

    /// Directions added to each cell along `line`, in walk order.
    ///
    /// # Errors
    ///
    /// Returns [`StreetError::GeometryOpFailed`] if the line has no vertices.
    pub fn directions(&self, line: &StreetLine) -> Result<Vec<(GridCoord, Direction)>, StreetError> {
        if line.geometry.0.is_empty() {
            return Err(StreetError::GeometryOpFailed {
                message: format!("street {} has no vertices", line.fid),
            });
        }

        let chain = raster::rasterize_line(&line.geometry, &self.calibration);
        Ok(chain
            .windows(2)
            .filter_map(|pair| {
                transition(pair[0], pair[1]).map(|direction| (pair[0], pair[1], direction))
            })
            .flat_map(|(from, to, direction)| [(from, direction), (to, direction.opposite())])
            .collect())
    }

    #[must_use]
    pub fn schematize_all(&self, lines: &[StreetLine]) -> StreetRun {
        let mut run = StreetRun::default();
        let mut cells: Vec<CellDirections> = Vec::new();
        let mut index: HashMap<GridCoord, usize> = HashMap::new();

        for (owner, line) in lines.iter().enumerate() {
            let directions = match self.directions(line) {
                Ok(directions) => directions,
                Err(error) => {
                    log::warn!("Skipping street {}: {error}", line.fid);
                    run.failures.push(FeatureFailure {
                        fid: line.fid,
                        error,
                    });
                    continue;
                }
            };

            for (coord, direction) in directions {
                let slot = *index.entry(coord).or_insert_with(|| {
                    cells.push(CellDirections {
                        coord,
                        owner,
                        directions: BTreeSet::new(),
                    });
                    cells.len() - 1
                });
                cells[slot].directions.insert(direction);
            }

            run.streets.push(StreetRow {
                fid: line.fid,
                name: line.name.clone(),
                notes: line.notes.clone(),
            });
        }

        let half_cell = self.calibration.cell_size * 0.5;
        for cell in cells {
            let centroid = raster::unsnap(cell.coord, &self.calibration);
            let id = match self.locator.cell_id_at(centroid.into()) {
                Ok(id) => id,
                Err(e) => {
                    log::debug!("Dropping street cell at ({}, {}): {e}", centroid.x, centroid.y);
                    continue;
                }
            };

            let street = &lines[cell.owner];
            let fid = u32::try_from(run.segments.len() + 1).unwrap_or(u32::MAX);
            let stubs = cell
                .directions
                .iter()
                .map(|direction| stub(centroid, *direction, half_cell).into())
                .collect();

            run.elements.extend(cell.directions.iter().map(|&direction| StreetElementRow {
                seg_fid: fid,
                direction,
                width: street.width,
            }));
            run.segments.push(StreetSegmentRow {
                fid,
                street_fid: street.fid,
                cell: id,
                geometry: MultiLineString::new(stubs),
                curb_height: street.curb_height,
                roughness: street.roughness,
                elevation: street.elevation,
            });
        }

        log::info!(
            "Schematized {} street(s) into {} cell segment(s)",
            run.streets.len(),
            run.segments.len()
        );
        run
    }
}

/// Line from `centroid` towards `direction`, `shift` along each moving axis.
fn stub(centroid: Coord<f64>, direction: Direction, shift: f64) -> Line<f64> {
    let (dx, dy) = direction.unit_offset();
    Line::new(
        centroid,
        Coord {
            x: f64::from(dx).mul_add(shift, centroid.x),
            y: f64::from(dy).mul_add(shift, centroid.y),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Polygon, Rect, coord};
    use schematizer_grid::Grid;
    use schematizer_grid_models::CellId;

    /// 3 x 3 cells over `[0, 300]`, ids column by column from the north-west.
    fn grid() -> Grid {
        let boundary: Polygon<f64> =
            Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 300.0, y: 300.0 }).to_polygon();
        Grid::build(&boundary, 100.0).unwrap()
    }

    fn street(fid: i64, points: Vec<(f64, f64)>, width: f64) -> StreetLine {
        StreetLine {
            fid,
            geometry: LineString::from(points),
            name: Some(format!("Street {fid}")),
            notes: None,
            curb_height: Some(0.2),
            roughness: Some(0.02),
            elevation: Some(10.0),
            width: Some(width),
        }
    }

    fn run(lines: &[StreetLine]) -> StreetRun {
        let grid = grid();
        let calibration = grid.calibration().unwrap();
        StreetSchematizer::new(&grid, calibration).schematize_all(lines)
    }

    fn directions_of(run: &StreetRun, cell: CellId) -> Vec<Direction> {
        let segment = run.segments.iter().find(|s| s.cell == cell).unwrap();
        run.elements
            .iter()
            .filter(|e| e.seg_fid == segment.fid)
            .map(|e| e.direction)
            .collect()
    }

    #[test]
    fn classifies_all_eight_steps() {
        let o = GridCoord::new(0, 0);
        let cases = [
            ((0, 1), Direction::North),
            ((1, 0), Direction::East),
            ((0, -1), Direction::South),
            ((-1, 0), Direction::West),
            ((1, 1), Direction::NorthEast),
            ((1, -1), Direction::SouthEast),
            ((-1, -1), Direction::SouthWest),
            ((-1, 1), Direction::NorthWest),
        ];
        for ((tx, ty), expected) in cases {
            assert_eq!(transition(o, GridCoord::new(tx, ty)), Some(expected));
        }
        assert_eq!(transition(o, o), None);
    }

    #[test]
    fn straight_street_links_neighbouring_cells() {
        let run = run(&[street(1, vec![(50.0, 150.0), (250.0, 150.0)], 8.0)]);

        assert_eq!(run.segments.len(), 3);
        assert_eq!(directions_of(&run, CellId(2)), vec![Direction::East]);
        assert_eq!(
            directions_of(&run, CellId(5)),
            vec![Direction::East, Direction::West]
        );
        assert_eq!(directions_of(&run, CellId(8)), vec![Direction::West]);
        assert!(run.elements.iter().all(|e| e.width == Some(8.0)));
    }

    #[test]
    fn stubs_reach_half_a_cell() {
        let run = run(&[street(1, vec![(50.0, 50.0), (150.0, 150.0)], 8.0)]);
        let first = run.segments.iter().find(|s| s.cell == CellId(3)).unwrap();

        assert_eq!(
            first.geometry.0[0],
            LineString::from(vec![(50.0, 50.0), (100.0, 100.0)])
        );
        assert_eq!(first.roughness, Some(0.02));
    }

    #[test]
    fn first_street_owns_shared_cells() {
        let run = run(&[
            street(1, vec![(50.0, 150.0), (250.0, 150.0)], 8.0),
            street(2, vec![(150.0, 250.0), (150.0, 50.0)], 6.0),
        ]);

        let centre = run.segments.iter().find(|s| s.cell == CellId(5)).unwrap();
        assert_eq!(centre.street_fid, 1);
        assert_eq!(
            directions_of(&run, CellId(5)),
            vec![Direction::North, Direction::East, Direction::South, Direction::West]
        );
        let top = run.segments.iter().find(|s| s.cell == CellId(4)).unwrap();
        assert_eq!(top.street_fid, 2);
        assert_eq!(run.streets.len(), 2);
    }

    #[test]
    fn cells_outside_the_grid_are_dropped() {
        let run = run(&[street(1, vec![(250.0, 150.0), (450.0, 150.0)], 8.0)]);

        assert_eq!(run.segments.len(), 1);
        assert_eq!(run.segments[0].cell, CellId(8));
        assert_eq!(run.segments[0].fid, 1);
    }

    #[test]
    fn empty_street_is_reported() {
        let run = run(&[street(9, vec![], 1.0)]);
        assert_eq!(run.failures.len(), 1);
        assert!(run.streets.is_empty());
    }
}
