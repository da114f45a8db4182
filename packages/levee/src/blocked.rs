//! Area and width reduction factors of blocked areas.

use geo::{Area, BooleanOps, LineString, MultiLineString};
use schematizer_grid::{
    CellLocator, measure,
    octagon::{OCTAGON_RATIO, edge_geometry},
};
use schematizer_grid_models::Direction;
use schematizer_levee_models::{BlockedArea, BlockedCellRow};

use crate::LeveeError;

/// Cells blocked above this share are treated as fully blocked.
pub const FULL_BLOCKAGE: f64 = 0.95;

fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Reduction factors for every cell `area` overlaps, in cell id order.
///
/// # Errors
///
/// Returns [`LeveeError::Grid`] if an overlapped cell cannot be resolved.
pub fn blocked_cells<L: CellLocator>(locator: &L, area: &BlockedArea) -> Result<Vec<BlockedCellRow>, LeveeError> {
    let cell_size = locator.cell_size();
    let cell_area = cell_size * cell_size;
    let octagon_side = cell_size / OCTAGON_RATIO;
    let half_square = cell_size * 0.5;
    let half_octagon = octagon_side * 0.5;

    let mut rows = Vec::new();
    for cell in locator.cells_overlapping(&area.geometry) {
        let square = locator.cell_polygon(cell)?;
        let centroid = locator.centroid_of(cell)?;

        let arf = round2(area.geometry.intersection(&square).unsigned_area() / cell_area);
        if arf > FULL_BLOCKAGE {
            rows.push(BlockedCellRow {
                cell,
                area_fid: area.fid,
                centroid,
                arf: 1.0,
                wrf: [1.0; 8],
            });
            continue;
        }

        let mut wrf = [0.0; 8];
        for (factor, direction) in wrf.iter_mut().zip(Direction::all()) {
            let edge = edge_geometry(centroid, direction.side(), half_square, half_octagon);
            let edge = MultiLineString::new(vec![LineString::from(vec![edge.start, edge.end])]);
            let blocked: f64 = area.geometry.clip(&edge, false).0.iter().map(measure::length).sum();
            *factor = round2(blocked / octagon_side);
        }

        rows.push(BlockedCellRow {
            cell,
            area_fid: area.fid,
            centroid,
            arf,
            wrf,
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Polygon, Rect, coord};
    use schematizer_grid::Grid;
    use schematizer_grid_models::CellId;

    fn grid() -> Grid {
        let boundary: Polygon<f64> =
            Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 300.0, y: 300.0 }).to_polygon();
        Grid::build(&boundary, 100.0).unwrap()
    }

    fn area(min: (f64, f64), max: (f64, f64)) -> BlockedArea {
        BlockedArea {
            fid: 11,
            geometry: Rect::new(coord! { x: min.0, y: min.1 }, coord! { x: max.0, y: max.1 }).to_polygon(),
        }
    }

    #[test]
    fn covered_cells_are_fully_blocked() {
        let rows = blocked_cells(&grid(), &area((-10.0, -10.0), (310.0, 310.0))).unwrap();

        assert_eq!(rows.len(), 9);
        assert!(rows.iter().all(BlockedCellRow::is_full));
        assert!(rows.iter().all(|row| row.wrf == [1.0; 8] && row.area_fid == 11));
    }

    #[test]
    fn half_covered_cell_reports_edge_shares() {
        let rows = blocked_cells(&grid(), &area((90.0, 90.0), (150.0, 210.0))).unwrap();
        let centre = rows.iter().find(|row| row.cell == CellId(5)).unwrap();

        assert!((centre.arf - 0.5).abs() < 1e-12);
        assert!(!centre.is_full());
        // N, E, S, W, NE, SE, SW, NW
        let expected = [0.5, 0.0, 0.5, 1.0, 0.0, 0.0, 1.0, 1.0];
        for (actual, expected) in centre.wrf.iter().zip(expected) {
            assert!((actual - expected).abs() < 1e-12, "{:?}", centre.wrf);
        }
    }

    #[test]
    fn rounds_half_to_even() {
        assert!((round2(0.125) - 0.12).abs() < 1e-12);
        assert!((round2(0.135) - 0.14).abs() < 1e-12);
    }
}
