//! Line rasterization onto the cell-centroid lattice.
//!
//! Float coordinates are snapped to integer grid coordinates through the
//! calibration offset, rasterized with integer Bresenham stepping and mapped
//! back to cell centroids. Everything here is pure and deterministic.

use geo::{Coord, LineString};
use schematizer_grid_models::{Calibration, GridCoord};

/// Snaps a float coordinate to its integer grid coordinate.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn snap(x: f64, y: f64, calibration: &Calibration) -> GridCoord {
    let tx = ((x + calibration.offset_x) / calibration.cell_size).round_ties_even();
    let ty = ((y + calibration.offset_y) / calibration.cell_size).round_ties_even();
    GridCoord::new(tx as i64, ty as i64)
}

/// Maps an integer grid coordinate back to the cell centroid it denotes.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn unsnap(coord: GridCoord, calibration: &Calibration) -> Coord<f64> {
    Coord {
        x: (coord.tx as f64).mul_add(calibration.cell_size, -calibration.offset_x),
        y: (coord.ty as f64).mul_add(calibration.cell_size, -calibration.offset_y),
    }
}

/// Bresenham rasterization between two integer grid coordinates.
///
/// The axis with the greater delta drives the iteration. The returned cells
/// always run from `start` to `end`, both inclusive.
#[must_use]
pub fn rasterize(start: GridCoord, end: GridCoord) -> Vec<GridCoord> {
    let (mut x1, mut y1, mut x2, mut y2) = (start.tx, start.ty, end.tx, end.ty);

    let steep = (y2 - y1).abs() > (x2 - x1).abs();
    if steep {
        std::mem::swap(&mut x1, &mut y1);
        std::mem::swap(&mut x2, &mut y2);
    }

    let swapped = x1 > x2;
    if swapped {
        std::mem::swap(&mut x1, &mut x2);
        std::mem::swap(&mut y1, &mut y2);
    }

    let dx = x2 - x1;
    let dy = (y2 - y1).abs();
    let y_step = if y1 < y2 { 1 } else { -1 };

    let mut error = dx / 2;
    let mut y = y1;
    let mut cells = Vec::with_capacity(usize::try_from(dx + 1).unwrap_or_default());

    for x in x1..=x2 {
        cells.push(if steep {
            GridCoord::new(y, x)
        } else {
            GridCoord::new(x, y)
        });
        error -= dy;
        if error < 0 {
            y += y_step;
            error += dx;
        }
    }

    if swapped {
        cells.reverse();
    }
    cells
}

/// Rasterizes a single float segment and returns the covered cell centroids.
#[must_use]
pub fn snap_segment(start: Coord<f64>, end: Coord<f64>, calibration: &Calibration) -> Vec<Coord<f64>> {
    let from = snap(start.x, start.y, calibration);
    let to = snap(end.x, end.y, calibration);
    rasterize(from, to)
        .into_iter()
        .map(|cell| unsnap(cell, calibration))
        .collect()
}

/// Rasterizes every vertex pair of a polyline and concatenates the results
/// into one chain of integer grid coordinates.
///
/// The first cell of every pair after the first is dropped since it repeats
/// the previous pair's last cell. A line may revisit a cell after leaving it;
/// only consecutive repeats are impossible.
#[must_use]
pub fn rasterize_line(line: &LineString<f64>, calibration: &Calibration) -> Vec<GridCoord> {
    let snapped: Vec<GridCoord> = line
        .coords()
        .map(|c| snap(c.x, c.y, calibration))
        .collect();

    let mut chain = Vec::new();
    if let [only] = snapped.as_slice() {
        chain.push(*only);
    }
    for (i, pair) in snapped.windows(2).enumerate() {
        let skip = usize::from(i > 0);
        chain.extend(rasterize(pair[0], pair[1]).into_iter().skip(skip));
    }
    chain
}

/// [`rasterize_line`] mapped back to cell centroids.
#[must_use]
pub fn schematize_line(line: &LineString<f64>, calibration: &Calibration) -> LineString<f64> {
    rasterize_line(line, calibration)
        .into_iter()
        .map(|cell| unsnap(cell, calibration))
        .collect()
}
