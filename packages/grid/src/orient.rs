//! Rounding two-point lines onto the eight grid directions.

use geo::{Point, Rotate};

/// A two-point line rotated about its start onto a multiple of 45 degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedSegment {
    /// Unchanged start point.
    pub start: Point<f64>,
    /// End point after rotation.
    pub end: Point<f64>,
    /// Resulting azimuth in degrees, a multiple of 45 in `[0, 360]`.
    pub angle: f64,
}

impl OrientedSegment {
    /// Whether the segment runs along a grid axis rather than a diagonal.
    #[must_use]
    pub fn is_axis_aligned(&self) -> bool {
        self.angle % 90.0 == 0.0
    }
}

/// Azimuth from `start` to `end` in degrees, clockwise from north, in
/// `[0, 360)`. Returns `None` for coincident points.
#[must_use]
pub fn azimuth_degrees(start: Point<f64>, end: Point<f64>) -> Option<f64> {
    let dx = end.x() - start.x();
    let dy = end.y() - start.y();
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    let degrees = dx.atan2(dy).to_degrees();
    Some(if degrees < 0.0 { degrees + 360.0 } else { degrees })
}

/// Rotates `end` about `start` onto the nearest multiple of 45 degrees.
///
/// Returns `None` when the azimuth is undefined (coincident points).
#[must_use]
pub fn orient_to_octant(start: Point<f64>, end: Point<f64>) -> Option<OrientedSegment> {
    let azimuth = azimuth_degrees(start, end)?;
    let angle = (azimuth / 45.0).round_ties_even() * 45.0;
    let clockwise = angle - azimuth;
    // geo rotates counter-clockwise for positive angles.
    let end = end.rotate_around_point(-clockwise, start);
    Some(OrientedSegment { start, end, angle })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn azimuth_is_clockwise_from_north() {
        let origin = Point::new(0.0, 0.0);
        let close = |a: Option<f64>, b: f64| (a.unwrap() - b).abs() < 1e-9;
        assert!(close(azimuth_degrees(origin, Point::new(0.0, 5.0)), 0.0));
        assert!(close(azimuth_degrees(origin, Point::new(5.0, 0.0)), 90.0));
        assert!(close(azimuth_degrees(origin, Point::new(0.0, -5.0)), 180.0));
        assert!(close(azimuth_degrees(origin, Point::new(-5.0, 0.0)), 270.0));
        assert!(azimuth_degrees(origin, origin).is_none());
    }

    #[test]
    fn rotates_onto_nearest_diagonal() {
        let seg = orient_to_octant(Point::new(0.0, 0.0), Point::new(100.0, 80.0)).unwrap();
        assert!((seg.angle - 45.0).abs() < f64::EPSILON);
        assert!(!seg.is_axis_aligned());
        assert!((seg.end.x() - seg.end.y()).abs() < 1e-9);
        let length = 100.0_f64.hypot(80.0);
        assert!((seg.end.x().hypot(seg.end.y()) - length).abs() < 1e-9);
    }

    #[test]
    fn rotates_onto_nearest_axis() {
        let seg = orient_to_octant(Point::new(10.0, 10.0), Point::new(12.0, -90.0)).unwrap();
        assert!((seg.angle - 180.0).abs() < f64::EPSILON);
        assert!(seg.is_axis_aligned());
        assert!((seg.end.x() - 10.0).abs() < 1e-9);
        assert!(seg.end.y() < 10.0);
    }

    #[test]
    fn near_north_wraps_to_full_turn() {
        let seg = orient_to_octant(Point::new(0.0, 0.0), Point::new(-1.0, 50.0)).unwrap();
        assert!((seg.angle - 360.0).abs() < f64::EPSILON);
        assert!(seg.is_axis_aligned());
        assert!(seg.end.x().abs() < 1e-9);
    }
}
