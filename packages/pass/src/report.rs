//! Pass summaries.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PassKind {
    Channels,
    Levees,
    Blocked,
    Streets,
    Floodplain,
}

/// A feature left out of a pass's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedFeature {
    pub fid: i64,
    pub reason: String,
}

/// Outcome of one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReport {
    pub kind: PassKind,
    /// Features that produced rows.
    pub processed: usize,
    /// Rows handed to the sink.
    pub rows: usize,
    pub skipped: Vec<SkippedFeature>,
}

impl PassReport {
    #[must_use]
    pub const fn new(kind: PassKind) -> Self {
        Self {
            kind,
            processed: 0,
            rows: 0,
            skipped: Vec::new(),
        }
    }

    pub fn skip(&mut self, fid: i64, reason: impl Display) {
        self.skipped.push(SkippedFeature {
            fid,
            reason: reason.to_string(),
        });
    }

    /// Logs the summary, one warning per skipped feature.
    pub fn log(&self) {
        log::info!(
            "{} pass: {} feature(s) processed, {} row(s) emitted, {} skipped",
            self.kind,
            self.processed,
            self.rows,
            self.skipped.len()
        );
        for skipped in &self.skipped {
            log::warn!("{} pass skipped feature {}: {}", self.kind, skipped.fid, skipped.reason);
        }
    }
}
