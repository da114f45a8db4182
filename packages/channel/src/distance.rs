//! Along-bank distance tables.
//!
//! A segment's cross-sections are split into intervals, each opened by a
//! user cross-section and closed by the next one. The last interval has no
//! closing cross-section and records zero lengths. Cross-sections placed
//! before the first user cross-section fall into the first interval with
//! negative distances.

use geo::{LineString, Point};
use schematizer_channel_models::{DistanceRow, SchematicCrossSection, SchematicSegment};
use schematizer_grid::measure;

/// Station of one cross-section on both banks.
#[derive(Debug, Clone, Copy)]
struct Station {
    left: f64,
    right: f64,
}

/// Distance rows for every cross-section of `segment`, in `nr_in_seg` order.
///
/// Returns nothing if the segment has no user cross-section left.
#[must_use]
pub fn distance_rows(segment: &SchematicSegment, cross_sections: &[SchematicCrossSection]) -> Vec<DistanceRow> {
    let mut ordered: Vec<&SchematicCrossSection> = cross_sections.iter().collect();
    ordered.sort_by_key(|xs| xs.nr_in_seg);

    let stations: Vec<Station> = ordered
        .iter()
        .map(|xs| Station {
            left: station_on(&segment.left_bank, xs.geometry.start.into()),
            right: station_on(&segment.right_bank, xs.geometry.end.into()),
        })
        .collect();

    let bounds: Vec<usize> = ordered
        .iter()
        .enumerate()
        .filter(|(_, xs)| !xs.interpolated)
        .map(|(i, _)| i)
        .collect();
    if bounds.is_empty() {
        log::warn!("Segment {} has no user cross-sections, no distances", segment.fid);
        return Vec::new();
    }

    let mut rows = Vec::with_capacity(ordered.len());
    for (k, &up) in bounds.iter().enumerate() {
        let lo = bounds.get(k + 1).copied();
        let from = if k == 0 { 0 } else { up };
        let to = lo.unwrap_or(ordered.len());
        let base = stations[up];
        let (length_left, length_right) = lo.map_or((0.0, 0.0), |lo| {
            (stations[lo].left - base.left, stations[lo].right - base.right)
        });

        let members = ordered[from..to].iter().zip(&stations[from..to]);
        for (xs, station) in members {
            rows.push(DistanceRow {
                seg_fid: segment.fid,
                nr_in_seg: xs.nr_in_seg,
                user_xs_fid: xs.user_xs_fid,
                interpolated: xs.interpolated,
                up_nr: ordered[up].nr_in_seg,
                lo_nr: lo.map(|lo| ordered[lo].nr_in_seg),
                up_dist_left: station.left - base.left,
                up_dist_right: station.right - base.right,
                up_lo_dist_left: length_left,
                up_lo_dist_right: length_right,
            });
        }
    }
    rows
}

fn station_on(bank: &LineString<f64>, point: Point<f64>) -> f64 {
    measure::locate(bank, measure::nearest_point(bank, point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Line, coord};
    use schematizer_channel_models::CrossSectionKind;
    use schematizer_grid_models::CellId;

    fn segment() -> SchematicSegment {
        SchematicSegment {
            fid: 1,
            rank: None,
            name: None,
            left_bank: LineString::from(vec![
                (50.0, 50.0),
                (150.0, 50.0),
                (250.0, 150.0),
                (350.0, 150.0),
                (450.0, 150.0),
            ]),
            right_bank: LineString::from(vec![(50.0, -150.0), (450.0, -150.0)]),
            right_bank_derived: false,
        }
    }

    fn xs(nr_in_seg: u32, interpolated: bool) -> SchematicCrossSection {
        let start = segment().left_bank.0[nr_in_seg as usize - 1];
        SchematicCrossSection {
            seg_fid: 1,
            nr_in_seg,
            user_xs_fid: 100,
            kind: CrossSectionKind::Natural,
            interpolated,
            geometry: Line::new(start, coord! { x: start.x, y: -150.0 }),
            left_cell: CellId(nr_in_seg),
            right_cell: CellId(nr_in_seg + 10),
        }
    }

    fn chain() -> Vec<SchematicCrossSection> {
        vec![xs(1, false), xs(2, true), xs(3, true), xs(4, false), xs(5, true)]
    }

    #[test]
    fn every_cross_section_lands_in_one_interval() {
        let rows = distance_rows(&segment(), &chain());

        let numbers: Vec<u32> = rows.iter().map(|row| row.nr_in_seg).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        let intervals: Vec<(u32, Option<u32>)> = rows.iter().map(|row| (row.up_nr, row.lo_nr)).collect();
        assert_eq!(
            intervals,
            vec![(1, Some(4)), (1, Some(4)), (1, Some(4)), (4, None), (4, None)]
        );
    }

    /// Steps between consecutive cross-sections, closed by the step to the
    /// interval end.
    fn increments(distances: &[f64], total: f64) -> Vec<f64> {
        let mut previous = 0.0;
        let mut steps: Vec<f64> = distances
            .iter()
            .skip(1)
            .map(|&d| {
                let step = d - previous;
                previous = d;
                step
            })
            .collect();
        steps.push(total - previous);
        steps
    }

    #[test]
    fn increments_sum_to_interval_length() {
        let rows = distance_rows(&segment(), &chain());
        let closed: Vec<&DistanceRow> = rows.iter().filter(|row| row.lo_nr == Some(4)).collect();
        let diagonal = 100.0 * std::f64::consts::SQRT_2;

        let left: Vec<f64> = closed.iter().map(|row| row.up_dist_left).collect();
        let left_steps = increments(&left, closed[0].up_lo_dist_left);
        for (step, expected) in left_steps.iter().zip([100.0, diagonal, 100.0]) {
            assert!((step - expected).abs() < 1e-9, "{step} != {expected}");
        }
        let left_sum: f64 = left_steps.iter().sum();
        assert!((left_sum - (200.0 + diagonal)).abs() < 1e-9);

        let right: Vec<f64> = closed.iter().map(|row| row.up_dist_right).collect();
        let right_sum: f64 = increments(&right, closed[0].up_lo_dist_right).iter().sum();
        assert!((right_sum - 300.0).abs() < 1e-9);
        assert!((closed[0].up_lo_dist_right - 300.0).abs() < 1e-9);
    }

    #[test]
    fn open_interval_has_zero_length() {
        let rows = distance_rows(&segment(), &chain());
        let last = rows.last().unwrap();

        assert_eq!(last.lo_nr, None);
        assert!(last.up_lo_dist_left.abs() < 1e-12);
        assert!((last.up_dist_left - 100.0).abs() < 1e-9);
        assert!((last.up_dist_right - 100.0).abs() < 1e-9);
    }

    #[test]
    fn leading_cross_sections_join_first_interval() {
        let rows = distance_rows(&segment(), &[xs(1, true), xs(2, false), xs(4, false)]);

        assert_eq!(rows[0].up_nr, 2);
        assert!((rows[0].up_dist_left + 100.0).abs() < 1e-9);
        assert_eq!(rows[2].up_nr, 4);
    }

    #[test]
    fn no_user_cross_sections_no_rows() {
        assert!(distance_rows(&segment(), &[xs(2, true)]).is_empty());
    }
}
