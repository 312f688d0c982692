//! Shared Types
//!
//! Error taxonomy and the analysis output record.

pub mod error;
pub mod report;

pub use error::{BidError, Result};
pub use report::{AnalysisReport, ThresholdMatch};
