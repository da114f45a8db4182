//! Densifying cross-sections so every rasterized bank vertex owns one.

use geo::LineString;

use crate::place::PlacedCrossSection;

/// Fills the gaps between user cross-sections along `bank`.
///
/// `originals` must be ordered by strictly increasing bank vertex. Every
/// vertex without a user cross-section receives a copy of the previous
/// cross-section shifted by the vertex-to-vertex step, so the shifts
/// accumulate along the bank. Vertices past the last user cross-section keep
/// receiving shifted copies until the bank ends. Vertices before the first
/// one receive copies of it shifted backwards.
#[must_use]
pub fn densify(bank: &LineString<f64>, originals: &[PlacedCrossSection]) -> Vec<PlacedCrossSection> {
    let vertices = &bank.0;
    let Some(first) = originals.first() else {
        return Vec::new();
    };
    let Some(&anchor) = vertices.get(first.vertex) else {
        return Vec::new();
    };

    let mut chain = Vec::with_capacity(vertices.len());

    for (i, vertex) in vertices.iter().enumerate().take(first.vertex) {
        chain.push(first.translated(vertex.x - anchor.x, vertex.y - anchor.y, i));
    }

    let mut pending = originals.iter().peekable();
    for i in first.vertex..vertices.len() {
        if let Some(original) = pending.next_if(|xs| xs.vertex == i) {
            chain.push(*original);
            continue;
        }
        let Some(previous) = chain.last() else {
            continue;
        };
        let step = (vertices[i].x - vertices[i - 1].x, vertices[i].y - vertices[i - 1].y);
        chain.push(previous.translated(step.0, step.1, i));
    }

    if pending.peek().is_some() {
        log::warn!(
            "{} cross-section(s) reference vertices past the end of the bank",
            pending.count()
        );
    }

    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Line, coord};
    use schematizer_channel_models::CrossSectionKind;

    fn bank() -> LineString<f64> {
        LineString::from(vec![(50.0, 50.0), (150.0, 50.0), (250.0, 150.0), (350.0, 150.0)])
    }

    fn original(fid: i64, vertex: usize) -> PlacedCrossSection {
        let start = bank().0[vertex];
        PlacedCrossSection {
            user_xs_fid: fid,
            kind: CrossSectionKind::Rectangular,
            vertex,
            line: Line::new(start, coord! { x: start.x, y: start.y - 300.0 }),
            interpolated: false,
        }
    }

    #[test]
    fn one_cross_section_per_vertex() {
        let chain = densify(&bank(), &[original(1, 0), original(2, 3)]);

        assert_eq!(chain.len(), 4);
        let flags: Vec<bool> = chain.iter().map(|xs| xs.interpolated).collect();
        assert_eq!(flags, vec![false, true, true, false]);
        let fids: Vec<i64> = chain.iter().map(|xs| xs.user_xs_fid).collect();
        assert_eq!(fids, vec![1, 1, 1, 2]);
    }

    #[test]
    fn shifts_accumulate_from_previous_cross_section() {
        let chain = densify(&bank(), &[original(1, 0), original(2, 3)]);

        assert_eq!(chain[1].line.start, coord! { x: 150.0, y: 50.0 });
        assert_eq!(chain[1].line.end, coord! { x: 150.0, y: -250.0 });
        assert_eq!(chain[2].line.start, coord! { x: 250.0, y: 150.0 });
        assert_eq!(chain[2].line.end, coord! { x: 250.0, y: -150.0 });
    }

    #[test]
    fn keeps_translating_past_last_original() {
        let chain = densify(&bank(), &[original(1, 0), original(2, 1)]);

        assert_eq!(chain.len(), 4);
        assert!(chain[2].interpolated && chain[3].interpolated);
        assert_eq!(chain[3].user_xs_fid, 2);
        assert_eq!(chain[3].line.start, coord! { x: 350.0, y: 150.0 });
    }

    #[test]
    fn back_translates_before_first_original() {
        let chain = densify(&bank(), &[original(4, 2), original(5, 3)]);

        assert_eq!(chain.len(), 4);
        assert_eq!(chain[0].vertex, 0);
        assert!(chain[0].interpolated);
        assert_eq!(chain[0].user_xs_fid, 4);
        assert_eq!(chain[0].line.start, coord! { x: 50.0, y: 50.0 });
        assert_eq!(chain[0].line.end, coord! { x: 50.0, y: -250.0 });
    }

    #[test]
    fn empty_originals_yield_nothing() {
        assert!(densify(&bank(), &[]).is_empty());
    }
}
