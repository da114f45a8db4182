//! Trimming tributaries where they join their receiving segment.
//!
//! Segments are visited by ascending rank, then fid. A segment of rank
//! `r > 1` looks for a receiver among the segments of rank `r - 1` in fid
//! order; the first receiver whose left or right bank it crosses wins. The
//! tributary then loses trailing vertices until it stops crossing that
//! receiver, and every cross-section past the last retained vertex is
//! removed.

use geo::{Coord, Intersects, LineString, Point};
use schematizer_channel_models::{BankSide, ConfluenceRow, SchematicSegment};
use schematizer_grid::CellLocator;
use schematizer_grid_models::CellId;

use crate::schematize::{SegmentRows, derive_right_bank};

/// Outcome of trimming a tributary against one receiver.
#[derive(Debug, Clone, PartialEq)]
pub struct Trim {
    /// Tributary vertices left after trimming, at least one.
    pub retained: LineString<f64>,
    /// First removed vertex, where the tributary met the receiver.
    pub junction: Option<Coord<f64>>,
}

/// Drops trailing vertices of `tributary` while it still crosses `left` or
/// `right`. Never removes the first vertex.
#[must_use]
pub fn trim_at(tributary: &LineString<f64>, left: &LineString<f64>, right: &LineString<f64>) -> Trim {
    let mut coords = tributary.0.clone();
    let mut junction = None;

    while coords.len() > 1 {
        junction = coords.pop();
        let remaining = LineString::new(coords.clone());
        if !(remaining.intersects(left) || remaining.intersects(right)) {
            break;
        }
    }

    Trim {
        retained: LineString::new(coords),
        junction,
    }
}

fn receiver_side(tributary: &LineString<f64>, receiver: &SchematicSegment) -> Option<BankSide> {
    if tributary.intersects(&receiver.left_bank) {
        Some(BankSide::Left)
    } else if tributary.intersects(&receiver.right_bank) {
        Some(BankSide::Right)
    } else {
        None
    }
}

/// Trims every tributary in `segments` and returns one row per junction.
pub fn resolve_confluences<L: CellLocator>(segments: &mut [SegmentRows], locator: &L) -> Vec<ConfluenceRow> {
    let mut tributaries: Vec<usize> = (0..segments.len())
        .filter(|&i| segments[i].segment.rank.is_some_and(|rank| rank > 1))
        .collect();
    tributaries.sort_by_key(|&i| (segments[i].segment.rank, segments[i].segment.fid));

    let mut rows = Vec::new();

    for t in tributaries {
        let Some(rank) = segments[t].segment.rank else {
            continue;
        };
        let mut receivers: Vec<usize> = (0..segments.len())
            .filter(|&j| j != t && segments[j].segment.rank == Some(rank - 1))
            .collect();
        receivers.sort_by_key(|&j| segments[j].segment.fid);

        let tributary = &segments[t].segment.left_bank;
        let Some((receiver, side)) = receivers
            .iter()
            .find_map(|&j| receiver_side(tributary, &segments[j].segment).map(|side| (j, side)))
        else {
            log::debug!("Segment {} has no rank {} receiver", segments[t].segment.fid, rank - 1);
            continue;
        };

        let trim = trim_at(
            tributary,
            &segments[receiver].segment.left_bank,
            &segments[receiver].segment.right_bank,
        );
        let main_cell = trim
            .junction
            .or_else(|| trim.retained.0.last().copied())
            .and_then(|junction| nearest_main_cell(&segments[receiver], junction, locator));
        let main_seg_fid = segments[receiver].segment.fid;

        let tributary_rows = &mut segments[t];
        let tributary_nr = apply_trim(tributary_rows, trim);
        log::info!(
            "Segment {} joins segment {main_seg_fid} ({side}) at vertex {tributary_nr}",
            tributary_rows.segment.fid
        );

        match (cell_at_vertex(tributary_rows, tributary_nr, locator), main_cell) {
            (Some(tributary_cell), Some(main_cell)) => rows.push(ConfluenceRow {
                conf_fid: u32::try_from(rows.len() + 1).unwrap_or(u32::MAX),
                tributary_seg_fid: tributary_rows.segment.fid,
                main_seg_fid,
                tributary_nr,
                tributary_cell,
                main_cell,
                side,
            }),
            _ => log::warn!(
                "Segment {}: junction with segment {main_seg_fid} lies outside the grid",
                tributary_rows.segment.fid
            ),
        }
    }

    rows
}

/// Replaces the tributary geometry and drops its cross-sections past the
/// retained vertices. Returns the last retained vertex position.
fn apply_trim(rows: &mut SegmentRows, trim: Trim) -> u32 {
    let tributary_nr = u32::try_from(trim.retained.0.len()).unwrap_or(u32::MAX);
    rows.segment.left_bank = trim.retained;
    rows.cross_sections.retain(|xs| xs.nr_in_seg <= tributary_nr);
    if rows.segment.right_bank_derived {
        rows.segment.right_bank = derive_right_bank(&rows.cross_sections);
    }
    tributary_nr
}

fn cell_at_vertex<L: CellLocator>(rows: &SegmentRows, nr: u32, locator: &L) -> Option<CellId> {
    if let Some(xs) = rows.cross_sections.iter().find(|xs| xs.nr_in_seg == nr) {
        return Some(xs.left_cell);
    }
    let last = rows.segment.left_bank.0.last()?;
    locator.cell_id_at((*last).into()).ok()
}

/// Cell of the receiver cross-section starting nearest to `junction`.
fn nearest_main_cell<L: CellLocator>(receiver: &SegmentRows, junction: Coord<f64>, locator: &L) -> Option<CellId> {
    let distance = |c: Coord<f64>| (c.x - junction.x).hypot(c.y - junction.y);
    receiver
        .cross_sections
        .iter()
        .min_by(|a, b| distance(a.geometry.start).total_cmp(&distance(b.geometry.start)))
        .map(|xs| xs.left_cell)
        .or_else(|| locator.cell_id_at(Point::from(junction)).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Line, Polygon, Rect, coord};
    use schematizer_channel_models::{CrossSectionKind, SchematicCrossSection};
    use schematizer_grid::Grid;

    fn grid() -> Grid {
        let boundary: Polygon<f64> =
            Rect::new(coord! { x: 0.0, y: -300.0 }, coord! { x: 500.0, y: 100.0 }).to_polygon();
        Grid::build(&boundary, 100.0).unwrap()
    }

    fn rows(fid: i64, rank: Option<u32>, left: &[(f64, f64)], reach: (f64, f64)) -> SegmentRows {
        let cross_sections: Vec<SchematicCrossSection> = left
            .iter()
            .zip(1_u32..)
            .map(|(&(x, y), nr_in_seg)| SchematicCrossSection {
                seg_fid: fid,
                nr_in_seg,
                user_xs_fid: fid * 100,
                kind: CrossSectionKind::Natural,
                interpolated: nr_in_seg != 1,
                geometry: Line::new(coord! { x: x, y: y }, coord! { x: x + reach.0, y: y + reach.1 }),
                left_cell: CellId(u32::try_from(fid).unwrap() * 10 + nr_in_seg),
                right_cell: CellId(0),
            })
            .collect();
        let right_bank = derive_right_bank(&cross_sections);
        SegmentRows {
            segment: SchematicSegment {
                fid,
                rank,
                name: None,
                left_bank: LineString::from(left.to_vec()),
                right_bank,
                right_bank_derived: true,
            },
            cross_sections,
        }
    }

    fn receiver() -> SegmentRows {
        rows(
            1,
            Some(1),
            &[(50.0, -150.0), (150.0, -150.0), (250.0, -150.0), (350.0, -150.0), (450.0, -150.0)],
            (0.0, -100.0),
        )
    }

    fn tributary(rank: u32) -> SegmentRows {
        rows(
            2,
            Some(rank),
            &[(250.0, 50.0), (250.0, -50.0), (250.0, -150.0), (250.0, -250.0)],
            (100.0, 0.0),
        )
    }

    #[test]
    fn tributary_is_trimmed_at_receiver() {
        let mut segments = vec![receiver(), tributary(2)];
        let confluences = resolve_confluences(&mut segments, &grid());

        assert_eq!(
            confluences,
            vec![ConfluenceRow {
                conf_fid: 1,
                tributary_seg_fid: 2,
                main_seg_fid: 1,
                tributary_nr: 2,
                tributary_cell: CellId(22),
                main_cell: CellId(13),
                side: BankSide::Left,
            }]
        );

        let trimmed = &segments[1];
        assert_eq!(trimmed.segment.left_bank, LineString::from(vec![(250.0, 50.0), (250.0, -50.0)]));
        assert!(trimmed.cross_sections.iter().all(|xs| xs.nr_in_seg <= 2));
        assert_eq!(trimmed.cross_sections.len(), 2);
        assert_eq!(trimmed.segment.right_bank.0.len(), 2);
        assert_eq!(segments[0], receiver());
    }

    #[test]
    fn joins_right_bank_when_left_is_missed() {
        let mut main = receiver();
        main.segment.left_bank = LineString::from(vec![(50.0, 50.0), (150.0, 50.0)]);
        let mut trib = tributary(2);
        trib.segment.left_bank = LineString::from(vec![(450.0, 50.0), (350.0, -150.0), (350.0, -250.0)]);
        let mut segments = vec![main, trib];

        let confluences = resolve_confluences(&mut segments, &grid());

        assert_eq!(confluences.len(), 1);
        assert_eq!(confluences[0].side, BankSide::Right);
        assert_eq!(confluences[0].tributary_nr, 2);
        assert_eq!(confluences[0].main_cell, CellId(14));
    }

    #[test]
    fn rank_gap_leaves_tributary_untouched() {
        let mut segments = vec![receiver(), tributary(3)];
        let confluences = resolve_confluences(&mut segments, &grid());

        assert!(confluences.is_empty());
        assert_eq!(segments[1], tributary(3));
    }

    #[test]
    fn main_channels_are_never_trimmed() {
        let mut segments = vec![receiver(), tributary(1)];
        assert!(resolve_confluences(&mut segments, &grid()).is_empty());
        assert_eq!(segments[1], tributary(1));
    }

    #[test]
    fn first_receiver_by_fid_wins() {
        let mut other = receiver();
        other.segment.fid = 0;
        other.segment.left_bank = LineString::from(vec![(150.0, -50.0), (350.0, -50.0)]);
        let mut segments = vec![receiver(), tributary(2), other];

        let confluences = resolve_confluences(&mut segments, &grid());

        assert_eq!(confluences.len(), 1);
        assert_eq!(confluences[0].main_seg_fid, 0);
        assert_eq!(confluences[0].tributary_nr, 1);
    }

    #[test]
    fn trimming_terminates_on_full_overlap() {
        let line = LineString::from(vec![(50.0, 50.0), (150.0, 50.0), (250.0, 50.0)]);
        let trim = trim_at(&line, &line, &LineString::new(vec![]));

        assert_eq!(trim.retained.0.len(), 1);
        assert_eq!(trim.junction, Some(coord! { x: 150.0, y: 50.0 }));
    }

    #[test]
    fn disjoint_lines_lose_only_the_last_vertex() {
        let line = LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        let far = LineString::from(vec![(0.0, 100.0), (10.0, 100.0)]);
        let trim = trim_at(&line, &far, &far);

        assert_eq!(trim.retained.0.len(), 2);
        assert_eq!(trim.junction, Some(coord! { x: 20.0, y: 0.0 }));
    }
}
