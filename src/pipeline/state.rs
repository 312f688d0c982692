//! Pipeline State
//!
//! The single mutable record threaded through the stage sequence. Each
//! stage mutates only its own fields; once `has_error` is set the record
//! is terminal and flows unchanged to the output boundary.

use chrono::Utc;
use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::types::{AnalysisReport, ThresholdMatch};

#[derive(Debug, Clone)]
pub struct PipelineState {
    /// Bundle directory this run analyzes
    pub bundle_dir: PathBuf,

    // Basic information
    pub bid_number: String,
    pub city: String,

    // Metadata and content. `content` is internal working data and never
    // part of the output record.
    pub metadata: Map<String, Value>,
    pub content: String,

    // Analysis results
    pub target_match: bool,
    pub threshold_match: ThresholdMatch,
    pub is_relevant: bool,

    // Outputs
    pub summary: String,
    pub justification: String,

    // Error control
    pub has_error: bool,
    pub error_message: String,
}

impl PipelineState {
    pub fn new(bundle_dir: impl Into<PathBuf>) -> Self {
        Self {
            bundle_dir: bundle_dir.into(),
            bid_number: String::new(),
            city: String::new(),
            metadata: Map::new(),
            content: String::new(),
            target_match: false,
            threshold_match: ThresholdMatch::Inconclusive,
            is_relevant: false,
            summary: String::new(),
            justification: String::new(),
            has_error: false,
            error_message: String::new(),
        }
    }

    /// Terminal failure for an unclassified stage error. The wrapper text
    /// is the only place such errors are caught.
    pub fn fail_stage(&mut self, stage: &str, message: &str) {
        self.has_error = true;
        self.error_message = format!("Erro em {stage}: {message}");
        self.justification = self.error_message.clone();
    }

    /// Terminal failure for a domain outcome (too large, insufficient
    /// content) with its own user-facing justification.
    pub fn fail_domain(&mut self, message: String, justification: String) {
        self.has_error = true;
        self.error_message = message;
        self.justification = justification;
        self.target_match = false;
        self.threshold_match = ThresholdMatch::Inconclusive;
        self.is_relevant = false;
    }

    /// Produce the output record. Content never leaves the pipeline.
    pub fn to_report(&self) -> AnalysisReport {
        AnalysisReport {
            bid_number: self.bid_number.clone(),
            city: self.city.clone(),
            target_match: self.target_match,
            threshold_match: self.threshold_match,
            is_relevant: self.is_relevant,
            summary: self.summary.clone(),
            justification: self.justification.clone(),
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = PipelineState::new("/tmp/edital");
        assert!(!state.has_error);
        assert!(!state.target_match);
        assert_eq!(state.threshold_match, ThresholdMatch::Inconclusive);
        assert!(!state.is_relevant);
    }

    #[test]
    fn test_fail_stage_wraps_message() {
        let mut state = PipelineState::new("/tmp/edital");
        state.fail_stage("generate_summary", "timeout");
        assert!(state.has_error);
        assert_eq!(state.error_message, "Erro em generate_summary: timeout");
        assert_eq!(state.justification, state.error_message);
    }

    #[test]
    fn test_fail_domain_resets_verdict() {
        let mut state = PipelineState::new("/tmp/edital");
        state.target_match = true;
        state.fail_domain("msg".to_string(), "explicação".to_string());
        assert!(state.has_error);
        assert!(!state.target_match);
        assert_eq!(state.threshold_match, ThresholdMatch::Inconclusive);
        assert!(!state.is_relevant);
        assert_eq!(state.justification, "explicação");
    }

    #[test]
    fn test_report_excludes_content() {
        let mut state = PipelineState::new("/tmp/edital");
        state.content = "texto interno".to_string();
        state.bid_number = "001".to_string();
        let report = state.to_report();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("content").is_none());
        assert_eq!(json["bid_number"], "001");
    }
}
