//! The per-bank channel pipeline.

use geo::{Coord, LineString};
use schematizer_channel_models::{BankLine, SchematicCrossSection, SchematicSegment, UserCrossSection};
use schematizer_grid::{CellLocator, raster};
use schematizer_grid_models::Calibration;

use crate::{
    ChannelError, clip,
    interpolate::densify,
    place::{self, PlacedCrossSection},
    select::CrossSectionIndex,
};

/// Everything produced for one bank line.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRows {
    pub segment: SchematicSegment,
    /// Ordered by `nr_in_seg`.
    pub cross_sections: Vec<SchematicCrossSection>,
}

/// A bank line that could not be schematized.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentFailure {
    pub bank_fid: i64,
    pub error: ChannelError,
}

/// Result of schematizing a batch of bank lines.
#[derive(Debug, Default)]
pub struct ChannelRun {
    pub segments: Vec<SegmentRows>,
    pub failures: Vec<SegmentFailure>,
}

/// Schematizes bank lines against a grid and a set of user cross-sections.
pub struct ChannelSchematizer<'a, L: CellLocator> {
    locator: &'a L,
    calibration: Calibration,
    index: CrossSectionIndex<'a>,
}

impl<'a, L: CellLocator> ChannelSchematizer<'a, L> {
    #[must_use]
    pub fn new(locator: &'a L, calibration: Calibration, cross_sections: &'a [UserCrossSection]) -> Self {
        Self {
            locator,
            calibration,
            index: CrossSectionIndex::new(cross_sections),
        }
    }

    /// Schematizes every bank line. A failing bank line is logged and
    /// recorded in [`ChannelRun::failures`]; the others still run.
    #[must_use]
    pub fn schematize_all(&self, banks: &[BankLine]) -> ChannelRun {
        let mut run = ChannelRun::default();

        for bank in banks {
            match self.schematize(bank) {
                Ok(rows) => {
                    log::debug!(
                        "Bank line {}: {} cells, {} cross-sections",
                        bank.fid,
                        rows.segment.left_bank.0.len(),
                        rows.cross_sections.len()
                    );
                    run.segments.push(rows);
                }
                Err(error) => {
                    log::warn!("Skipping bank line {}: {error}", bank.fid);
                    run.failures.push(SegmentFailure {
                        bank_fid: bank.fid,
                        error,
                    });
                }
            }
        }

        log::info!(
            "Schematized {} of {} bank line(s)",
            run.segments.len(),
            banks.len()
        );
        run
    }

    /// Schematizes one bank line.
    ///
    /// # Errors
    ///
    /// * [`ChannelError::InsufficientCrossSections`] if fewer than two user
    ///   cross-sections cross the bank line
    /// * [`ChannelError::MisalignedStart`] if the bank line and its first
    ///   cross-section start in different cells
    /// * [`ChannelError::Grid`] if either start lies outside the grid
    /// * [`ChannelError::GeometryOpFailed`] for degenerate geometry
    pub fn schematize(&self, bank: &BankLine) -> Result<SegmentRows, ChannelError> {
        let crossing = self.index.crossing(&bank.geometry);
        let [first, _, ..] = crossing.as_slice() else {
            return Err(ChannelError::InsufficientCrossSections {
                bank_fid: bank.fid,
                found: crossing.len(),
            });
        };
        self.check_start(bank, first)?;

        let left_bank = raster::schematize_line(&bank.geometry, &self.calibration);
        let placed = crossing
            .iter()
            .map(|xs| place::place(xs, &bank.geometry, &left_bank, &self.calibration))
            .collect::<Result<Vec<_>, _>>()?;
        let originals = place::retain_advancing(bank.fid, placed);
        let chain = clip::clip_crossings(densify(&left_bank, &originals));
        let cross_sections = self.rows(bank.fid, &chain);

        let (right_bank, right_bank_derived) = match &bank.right_bank {
            Some(right) => (raster::schematize_line(right, &self.calibration), false),
            None => (derive_right_bank(&cross_sections), true),
        };

        Ok(SegmentRows {
            segment: SchematicSegment {
                fid: bank.fid,
                rank: bank.rank,
                name: bank.name.clone(),
                left_bank,
                right_bank,
                right_bank_derived,
            },
            cross_sections,
        })
    }

    fn check_start(&self, bank: &BankLine, first: &UserCrossSection) -> Result<(), ChannelError> {
        let (Some(&bank_start), Some(&xs_start)) = (bank.geometry.0.first(), first.geometry.0.first())
        else {
            return Err(ChannelError::GeometryOpFailed {
                message: format!("bank line {} has no vertices", bank.fid),
            });
        };

        let bank_cell = self.locator.cell_id_at(bank_start.into())?;
        let xs_cell = self.locator.cell_id_at(xs_start.into())?;
        if bank_cell == xs_cell {
            Ok(())
        } else {
            Err(ChannelError::MisalignedStart {
                bank_fid: bank.fid,
                xs_fid: first.fid,
            })
        }
    }

    /// Numbers the chain from 1 and resolves end cells. A cross-section with
    /// an end outside the grid is skipped but keeps its number.
    fn rows(&self, seg_fid: i64, chain: &[PlacedCrossSection]) -> Vec<SchematicCrossSection> {
        chain
            .iter()
            .zip(1_u32..)
            .filter_map(|(xs, nr_in_seg)| {
                let cells = self.locator.cell_id_at(xs.line.start.into()).and_then(|left| {
                    self.locator
                        .cell_id_at(xs.line.end.into())
                        .map(|right| (left, right))
                });
                match cells {
                    Ok((left_cell, right_cell)) => Some(SchematicCrossSection {
                        seg_fid,
                        nr_in_seg,
                        user_xs_fid: xs.user_xs_fid,
                        kind: xs.kind,
                        interpolated: xs.interpolated,
                        geometry: xs.line,
                        left_cell,
                        right_cell,
                    }),
                    Err(e) => {
                        log::warn!("Segment {seg_fid}: skipping cross-section {nr_in_seg}: {e}");
                        None
                    }
                }
            })
            .collect()
    }
}

/// Right bank traced through the far ends of `cross_sections`.
#[must_use]
pub fn derive_right_bank(cross_sections: &[SchematicCrossSection]) -> LineString<f64> {
    let mut ends: Vec<Coord<f64>> = cross_sections.iter().map(|xs| xs.geometry.end).collect();
    ends.dedup();
    LineString::new(ends)
}
