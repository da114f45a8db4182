#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Schematization passes.
//!
//! A pass runs one schematizer over a fully loaded feature set and hands the
//! resulting rows to a [`RowSink`]. A feature that fails is logged, listed in
//! the returned [`PassReport`] and contributes no rows; the rest of the pass
//! continues. Only an uncalibratable grid or a pass without input features
//! aborts, before anything is emitted.

pub mod report;
pub mod run;
pub mod sink;

pub use report::{PassKind, PassReport, SkippedFeature};
pub use run::{LeveeOptions, PassContext};
pub use sink::{RowSink, Rows, SchematicOutput};

use schematizer_grid::GridError;
use thiserror::Error;

/// Conditions that abort a whole pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PassError {
    #[error("Cannot calibrate grid: {0}")]
    Calibration(#[source] GridError),

    #[error("No input features for the {kind} pass")]
    EmptyInput { kind: PassKind },
}
