//! Analysis Output Record
//!
//! The record handed to reporting collaborators once a pipeline run
//! finishes. The raw bundle content never appears here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of the quantity-threshold check.
///
/// `Inconclusive` means the quantity could not be determined; it is never
/// silently promoted to a pass or a fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdMatch {
    True,
    False,
    #[default]
    Inconclusive,
}

impl fmt::Display for ThresholdMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Inconclusive => write!(f, "inconclusive"),
        }
    }
}

/// Final analysis record for one document bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub bid_number: String,
    pub city: String,
    pub target_match: bool,
    pub threshold_match: ThresholdMatch,
    pub is_relevant: bool,
    pub summary: String,
    pub justification: String,
    pub generated_at: DateTime<Utc>,
}
