//! Octagon inscribed in a square cell.
//!
//! Sides are numbered 0-7 clockwise from north (see [`OctagonSide`]).
//! Directions are measured as azimuths: clockwise from north, in radians.

use std::f64::consts::{FRAC_PI_4, PI, TAU};

use geo::{Coord, Line, Point};
use schematizer_grid_models::OctagonSide;

/// Ratio of a cell side to the side of its regular inscribed octagon
/// (`1 + sqrt(2)`, rounded the way the model input files expect).
pub const OCTAGON_RATIO: f64 = 2.414;

/// Azimuth of a vector in `[0, 2π)`.
#[must_use]
pub fn azimuth(dx: f64, dy: f64) -> f64 {
    let angle = dx.atan2(dy);
    if angle < 0.0 { angle + TAU } else { angle }
}

/// Octant a vector from the cell centroid points into.
///
/// Octant `k` covers azimuths `[45k, 45(k+1))` degrees. The result does not
/// depend on the vector's length.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn classify(dx: f64, dy: f64) -> OctagonSide {
    let octant = (azimuth(dx, dy) / FRAC_PI_4).floor() as i64;
    OctagonSide::wrapping(octant)
}

/// Whether going from `from` to `to` around the centroid is a clockwise
/// turn, i.e. the counter-clockwise angle between them is at least π.
#[must_use]
pub fn is_clockwise(from: (f64, f64), to: (f64, f64)) -> bool {
    let mut angle = to.1.atan2(to.0) - from.1.atan2(from.0);
    if angle < 0.0 {
        angle += TAU;
    }
    angle >= PI
}

/// Sides crossed when a line enters the cell in octant `entry` and leaves it
/// in octant `exit`.
///
/// Clockwise walks start at the side after `entry` and end at `exit`;
/// counter-clockwise walks start at `entry` and end at the side after
/// `exit`. Entry and exit in the same octant cross nothing.
#[must_use]
pub fn side_walk(entry: OctagonSide, exit: OctagonSide, clockwise: bool) -> Vec<OctagonSide> {
    if entry == exit {
        return Vec::new();
    }

    let (mut side, last) = if clockwise {
        (entry.clockwise(), exit)
    } else {
        (entry, exit.clockwise())
    };

    let mut sides = Vec::with_capacity(usize::from(OctagonSide::COUNT));
    loop {
        sides.push(side);
        if side == last {
            break;
        }
        side = if clockwise {
            side.clockwise()
        } else {
            side.counter_clockwise()
        };
    }
    sides
}

/// Octagon vertex `j` (0-7) relative to the centroid, clockwise from the
/// western end of the north side.
fn octagon_vertex(j: u8, half_square: f64, half_octagon: f64) -> (f64, f64) {
    let (mut x, mut y) = if j % 2 == 0 {
        (-half_octagon, half_square)
    } else {
        (half_octagon, half_square)
    };
    for _ in 0..(j % 8) / 2 {
        (x, y) = (y, -x);
    }
    (x, y)
}

/// Edge segment of one octagon side around a cell centroid.
///
/// `half_square` is half the extent of the (possibly scaled) cell and
/// `half_octagon` half the octagon edge length. The segment runs clockwise
/// along the octagon.
#[must_use]
pub fn edge_geometry(
    centroid: Point<f64>,
    side: OctagonSide,
    half_square: f64,
    half_octagon: f64,
) -> Line<f64> {
    let index = side.index();
    let (sx, sy) = octagon_vertex(index, half_square, half_octagon);
    let (ex, ey) = octagon_vertex((index + 1) % 8, half_square, half_octagon);
    Line::new(
        Coord {
            x: centroid.x() + sx,
            y: centroid.y() + sy,
        },
        Coord {
            x: centroid.x() + ex,
            y: centroid.y() + ey,
        },
    )
}
