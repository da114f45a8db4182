//! Shortening cross-sections that cross earlier ones.
//!
//! Two passes run over a bank's cross-section chain in bank order. The first
//! clips user cross-sections against the preceding user cross-sections. The
//! second clips synthesized cross-sections against every clipped user
//! cross-section and against the preceding synthesized ones. Clipping moves
//! the far (right) end of the later cross-section to the crossing point.

use std::collections::VecDeque;

use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use geo::{BoundingRect, Intersects, Line};
use rstar::{AABB, RTree, RTreeObject};

use crate::place::PlacedCrossSection;

const MIN_CLIP_LENGTH: f64 = 1e-9;

/// Moves the end of `line` to where it crosses `other`.
///
/// Crossings at `line`'s own start and collinear overlaps leave it unchanged.
#[must_use]
pub fn clip_end(line: Line<f64>, other: &Line<f64>) -> Line<f64> {
    match line_intersection(line, *other) {
        Some(LineIntersection::SinglePoint { intersection, .. })
            if (intersection.x - line.start.x).hypot(intersection.y - line.start.y)
                > MIN_CLIP_LENGTH =>
        {
            Line::new(line.start, intersection)
        }
        _ => line,
    }
}

/// Recently accepted cross-sections, oldest first, keyed by source
/// cross-section so a later line from the same source replaces the earlier
/// one in place.
#[derive(Default)]
struct Window {
    entries: VecDeque<(i64, Line<f64>)>,
}

impl Window {
    /// Clips `line` against the window. Every window entry the line does
    /// not touch evicts the oldest entry.
    fn clip(&mut self, mut line: Line<f64>) -> Line<f64> {
        let snapshot: Vec<Line<f64>> = self.entries.iter().map(|(_, l)| *l).collect();
        for previous in snapshot {
            if line.intersects(&previous) {
                line = clip_end(line, &previous);
            } else {
                self.entries.pop_front();
            }
        }
        line
    }

    fn record(&mut self, key: i64, line: Line<f64>) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = line;
        } else {
            self.entries.push_back((key, line));
        }
    }
}

/// A clipped user cross-section stored in the R-tree.
struct ClipEntry {
    vertex: usize,
    line: Line<f64>,
}

impl RTreeObject for ClipEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        envelope_of(&self.line)
    }
}

fn envelope_of(line: &Line<f64>) -> AABB<[f64; 2]> {
    let rect = line.bounding_rect();
    AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
}

/// Runs both clipping passes over a chain ordered by bank vertex.
#[must_use]
pub fn clip_crossings(mut chain: Vec<PlacedCrossSection>) -> Vec<PlacedCrossSection> {
    let mut window = Window::default();
    for xs in chain.iter_mut().filter(|xs| !xs.interpolated) {
        xs.line = window.clip(xs.line);
        window.record(xs.user_xs_fid, xs.line);
    }

    let originals = RTree::bulk_load(
        chain
            .iter()
            .filter(|xs| !xs.interpolated)
            .map(|xs| ClipEntry {
                vertex: xs.vertex,
                line: xs.line,
            })
            .collect(),
    );

    let mut window = Window::default();
    for xs in chain.iter_mut().filter(|xs| xs.interpolated) {
        let mut candidates: Vec<&ClipEntry> = originals
            .locate_in_envelope_intersecting(&envelope_of(&xs.line))
            .collect();
        candidates.sort_by_key(|entry| entry.vertex);
        for candidate in candidates {
            if xs.line.intersects(&candidate.line) {
                xs.line = clip_end(xs.line, &candidate.line);
            }
        }

        xs.line = window.clip(xs.line);
        window.record(xs.user_xs_fid, xs.line);
    }

    chain
}
