#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Channel schematization.
//!
//! Each user bank line is rasterized onto cell centroids and the user
//! cross-sections crossing it are snapped to the rasterized bank, rounded to
//! the eight grid directions and densified so that every bank vertex owns
//! exactly one cross-section. Crossing cross-sections are then shortened,
//! tributaries are trimmed at their receivers and along-bank distances are
//! tabulated.
//!
//! The pipeline stages live in their own modules and are driven by
//! [`ChannelSchematizer`]:
//!
//! 1. [`select`] picks and orders the cross-sections of a bank line.
//! 2. [`place`] snaps them onto the rasterized bank and orients them.
//! 3. [`interpolate`] fills the gaps between user cross-sections.
//! 4. [`clip`] shortens cross-sections that cross earlier ones.
//! 5. [`confluence`] trims tributaries where they meet their receivers.
//! 6. [`distance`] measures every cross-section along both banks.

pub mod clip;
pub mod confluence;
pub mod distance;
pub mod interpolate;
pub mod place;
pub mod schematize;
pub mod select;

pub use confluence::resolve_confluences;
pub use distance::distance_rows;
pub use schematize::{ChannelRun, ChannelSchematizer, SegmentFailure, SegmentRows};

use schematizer_grid::GridError;
use thiserror::Error;

/// Errors raised while schematizing a single bank line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChannelError {
    /// Fewer than two user cross-sections cross the bank line.
    #[error("Bank line {bank_fid} is crossed by {found} cross-section(s), at least 2 are required")]
    InsufficientCrossSections {
        /// Offending bank line.
        bank_fid: i64,
        /// Number of crossing cross-sections.
        found: usize,
    },

    /// The bank line and its first cross-section start in different cells.
    #[error("Bank line {bank_fid} and cross-section {xs_fid} do not start in the same grid cell")]
    MisalignedStart {
        /// Offending bank line.
        bank_fid: i64,
        /// First cross-section along it.
        xs_fid: i64,
    },

    /// A geometric primitive produced no usable result.
    #[error("Geometry operation failed: {message}")]
    GeometryOpFailed {
        /// Description of what went wrong.
        message: String,
    },

    #[error(transparent)]
    Grid(#[from] GridError),
}
