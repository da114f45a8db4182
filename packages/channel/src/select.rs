//! Selecting and ordering the cross-sections that cross a bank line.

use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use geo::{BoundingRect, Intersects, LineString};
use rstar::{AABB, RTree, RTreeObject};
use schematizer_channel_models::UserCrossSection;
use schematizer_grid::measure;

/// A cross-section's bounding box stored in the R-tree.
struct CrossSectionEntry {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for CrossSectionEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn envelope_of(line: &LineString<f64>) -> Option<AABB<[f64; 2]>> {
    let rect = line.bounding_rect()?;
    Some(AABB::from_corners(
        [rect.min().x, rect.min().y],
        [rect.max().x, rect.max().y],
    ))
}

/// Spatial index over every user cross-section of a pass.
pub struct CrossSectionIndex<'a> {
    cross_sections: &'a [UserCrossSection],
    tree: RTree<CrossSectionEntry>,
}

impl<'a> CrossSectionIndex<'a> {
    #[must_use]
    pub fn new(cross_sections: &'a [UserCrossSection]) -> Self {
        let entries = cross_sections
            .iter()
            .enumerate()
            .filter_map(|(index, xs)| {
                envelope_of(&xs.geometry).map(|envelope| CrossSectionEntry { index, envelope })
            })
            .collect();

        Self {
            cross_sections,
            tree: RTree::bulk_load(entries),
        }
    }

    /// Cross-sections that truly intersect `bank`, ordered by where they
    /// cross it. Cross-sections crossing at the same station keep fid order.
    #[must_use]
    pub fn crossing(&self, bank: &LineString<f64>) -> Vec<&'a UserCrossSection> {
        let Some(query) = envelope_of(bank) else {
            return Vec::new();
        };

        let mut found: Vec<(f64, &'a UserCrossSection)> = self
            .tree
            .locate_in_envelope_intersecting(&query)
            .filter_map(|entry| self.cross_sections.get(entry.index))
            .filter(|xs| xs.geometry.intersects(bank))
            .filter_map(|xs| crossing_station(bank, &xs.geometry).map(|station| (station, xs)))
            .collect();

        found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.fid.cmp(&b.1.fid)));
        found.into_iter().map(|(_, xs)| xs).collect()
    }
}

/// Distance along `bank` of the first point `other` shares with it.
#[must_use]
pub fn crossing_station(bank: &LineString<f64>, other: &LineString<f64>) -> Option<f64> {
    bank.lines()
        .flat_map(|a| other.lines().map(move |b| (a, b)))
        .filter_map(|(a, b)| match line_intersection(a, b)? {
            LineIntersection::SinglePoint { intersection, .. } => Some(intersection),
            LineIntersection::Collinear { intersection } => Some(intersection.start),
        })
        .map(|point| measure::locate(bank, point.into()))
        .min_by(f64::total_cmp)
}
