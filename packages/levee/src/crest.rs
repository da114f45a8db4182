//! Crest elevations along levee lines.
//!
//! Positions along a levee line are normalized to `[0, 1]`. Surveyed crest
//! points near the line become a piecewise linear profile that is sampled at
//! the midpoint of each schematized levee side.

use geo::{Contains, Intersects, LineString, Point};
use schematizer_grid::measure;
use schematizer_levee_models::{CrestPoint, ElevationPolygon, LeveeLine, LeveeSideRow};

/// Linear crest profile between two consecutive crest points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrestInterval {
    pub start: f64,
    pub end: f64,
    pub start_value: f64,
    pub end_value: f64,
}

impl CrestInterval {
    fn value_at(&self, position: f64) -> f64 {
        if position <= self.start {
            return self.start_value;
        }
        if position >= self.end {
            return self.end_value;
        }
        let coefficient = (position - self.start) / (self.end - self.start);
        (self.end_value - self.start_value).mul_add(coefficient, self.start_value)
    }
}

/// Normalized position of `point` projected onto `line`.
fn position_on(line: &LineString<f64>, point: Point<f64>) -> Option<f64> {
    let length = measure::length(line);
    (length > 0.0).then(|| measure::locate(line, point) / length)
}

/// Builds the crest profile of `line` from the points within `buffer` of it.
///
/// Points projecting onto the same position keep the one closest to the
/// line. Fewer than two usable points produce no intervals.
#[must_use]
pub fn intervals(line: &LineString<f64>, points: &[CrestPoint], buffer: f64) -> Vec<CrestInterval> {
    let mut snapped: Vec<(f64, f64, f64)> = points
        .iter()
        .filter_map(|point| {
            let distance = measure::distance_to(line, point.geometry);
            if distance > buffer {
                return None;
            }
            position_on(line, point.geometry).map(|position| (position, point.elevation, distance))
        })
        .collect();

    snapped.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.2.total_cmp(&b.2)));
    snapped.dedup_by(|later, kept| (later.0 - kept.0).abs() <= f64::EPSILON);

    snapped
        .windows(2)
        .map(|pair| CrestInterval {
            start: pair[0].0,
            end: pair[1].0,
            start_value: pair[0].1,
            end_value: pair[1].1,
        })
        .collect()
}

/// Crest value at a normalized `position`.
///
/// Positions before the profile take its first value, positions after it
/// its last value.
#[must_use]
pub fn interpolate(intervals: &[CrestInterval], position: f64) -> Option<f64> {
    let (first, last) = (intervals.first()?, intervals.last()?);
    if position < first.start {
        return Some(first.start_value);
    }
    if position > last.end {
        return Some(last.end_value);
    }
    intervals
        .iter()
        .find(|interval| position <= interval.end)
        .map(|interval| interval.value_at(position))
}

fn midpoint(row: &LeveeSideRow) -> Point<f64> {
    let (start, end) = (row.geometry.start, row.geometry.end);
    Point::new((start.x + end.x) * 0.5, (start.y + end.y) * 0.5)
}

/// Sets the elevation of every side owned by `line` from its crest profile.
/// Returns the number of updated rows.
pub fn apply_crest_profile(rows: &mut [LeveeSideRow], line: &LeveeLine, intervals: &[CrestInterval]) -> usize {
    let mut updated = 0;
    for row in rows.iter_mut().filter(|row| row.line_fid == line.fid) {
        let value = position_on(&line.geometry, midpoint(row))
            .and_then(|position| interpolate(intervals, position));
        if let Some(value) = value {
            row.elevation = Some(value);
            updated += 1;
        }
    }
    log::debug!("Levee line {}: {updated} side(s) took crest profile values", line.fid);
    updated
}

/// Sets the elevation of every side owned by `line` from the first
/// elevation polygon containing the side's projection onto the line.
/// Returns the number of updated rows.
pub fn apply_elevation_polygons(
    rows: &mut [LeveeSideRow],
    line: &LeveeLine,
    polygons: &[ElevationPolygon],
) -> usize {
    let candidates: Vec<&ElevationPolygon> = polygons
        .iter()
        .filter(|polygon| polygon.geometry.intersects(&line.geometry))
        .collect();

    let mut updated = 0;
    for row in rows.iter_mut().filter(|row| row.line_fid == line.fid) {
        let on_line = measure::nearest_point(&line.geometry, midpoint(row));
        let Some(polygon) = candidates.iter().find(|p| p.geometry.contains(&on_line)) else {
            continue;
        };
        let value = match (polygon.elevation, polygon.correction, row.elevation) {
            (Some(elevation), Some(correction), _) => Some(elevation + correction),
            (Some(elevation), None, _) => Some(elevation),
            (None, Some(correction), Some(crest)) => Some(crest + correction),
            _ => None,
        };
        if let Some(value) = value {
            row.elevation = Some(value);
            updated += 1;
        }
    }
    updated
}
