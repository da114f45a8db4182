//! Along-line measurements built on `geo`'s projection algorithms.

use geo::{Closest, ClosestPoint, Coord, LineLocatePoint, LineString, Point};

/// Euclidean length of a polyline.
#[must_use]
pub fn length(line: &LineString<f64>) -> f64 {
    line.lines().map(|segment| segment.dx().hypot(segment.dy())).sum()
}

/// Point on `line` nearest to `point`.
///
/// Falls back to the first vertex when the projection is indeterminate
/// (empty or degenerate line).
#[must_use]
pub fn nearest_point(line: &LineString<f64>, point: Point<f64>) -> Point<f64> {
    match line.closest_point(&point) {
        Closest::Intersection(p) | Closest::SinglePoint(p) => p,
        Closest::Indeterminate => line.0.first().map_or(point, |&c| Point::from(c)),
    }
}

/// Distance along `line` from its start to the projection of `point`.
#[must_use]
pub fn locate(line: &LineString<f64>, point: Point<f64>) -> f64 {
    line.line_locate_point(&point)
        .filter(|fraction| fraction.is_finite())
        .map_or(0.0, |fraction| fraction * length(line))
}

/// Shortest distance between `point` and `line`.
#[must_use]
pub fn distance_to(line: &LineString<f64>, point: Point<f64>) -> f64 {
    let nearest = nearest_point(line, point);
    (nearest.x() - point.x()).hypot(nearest.y() - point.y())
}

/// Index and value of the vertex of `line` closest to `point`. Ties go to
/// the earlier vertex.
#[must_use]
pub fn closest_vertex(line: &LineString<f64>, point: Point<f64>) -> Option<(usize, Coord<f64>)> {
    line.0
        .iter()
        .enumerate()
        .map(|(i, &c)| (i, c, (c.x - point.x()).hypot(c.y - point.y())))
        .min_by(|a, b| a.2.total_cmp(&b.2).then(a.0.cmp(&b.0)))
        .map(|(i, c, _)| (i, c))
}

/// Point at `distance` along `line`, clamped to its ends.
#[must_use]
pub fn interpolate(line: &LineString<f64>, distance: f64) -> Option<Point<f64>> {
    let first = *line.0.first()?;
    if distance <= 0.0 {
        return Some(first.into());
    }
    let mut travelled = 0.0;
    for segment in line.lines() {
        let segment_length = segment.dx().hypot(segment.dy());
        if segment_length > 0.0 && travelled + segment_length >= distance {
            let t = (distance - travelled) / segment_length;
            return Some(Point::new(
                segment.dx().mul_add(t, segment.start.x),
                segment.dy().mul_add(t, segment.start.y),
            ));
        }
        travelled += segment_length;
    }
    line.0.last().map(|&c| c.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ell() -> LineString<f64> {
        LineString::from(vec![(0.0, 0.0), (100.0, 0.0), (100.0, 50.0)])
    }

    #[test]
    fn measures_polyline_length() {
        assert!((length(&ell()) - 150.0).abs() < 1e-9);
    }

    #[test]
    fn locates_points_along_line() {
        assert!((locate(&ell(), Point::new(40.0, 10.0)) - 40.0).abs() < 1e-9);
        assert!((locate(&ell(), Point::new(120.0, 30.0)) - 130.0).abs() < 1e-9);
    }

    #[test]
    fn finds_nearest_point_and_distance() {
        let p = nearest_point(&ell(), Point::new(40.0, -10.0));
        assert!((p.x() - 40.0).abs() < 1e-9 && p.y().abs() < 1e-9);
        assert!((distance_to(&ell(), Point::new(40.0, -10.0)) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn closest_vertex_prefers_earlier_on_ties() {
        let (i, c) = closest_vertex(&ell(), Point::new(50.0, 0.0)).unwrap();
        assert_eq!(i, 0);
        assert_eq!(c, Coord { x: 0.0, y: 0.0 });
        assert_eq!(closest_vertex(&ell(), Point::new(99.0, 40.0)).unwrap().0, 2);
    }

    #[test]
    fn interpolates_and_clamps() {
        let p = interpolate(&ell(), 125.0).unwrap();
        assert!((p.x() - 100.0).abs() < 1e-9 && (p.y() - 25.0).abs() < 1e-9);
        assert_eq!(interpolate(&ell(), 1_000.0), Some(Point::new(100.0, 50.0)));
        assert_eq!(interpolate(&ell(), -1.0), Some(Point::new(0.0, 0.0)));
    }
}
