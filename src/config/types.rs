//! Configuration Types
//!
//! All configuration structures with sensible defaults.

use serde::{Deserialize, Serialize};

use crate::ai::ProviderConfig;
use crate::ingest::IngestLimits;
use crate::pipeline::PipelineOptions;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// LLM provider settings
    pub llm: ProviderConfig,

    /// Ingestion and chunking limits
    pub analysis: AnalysisConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: ProviderConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `BidError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(crate::types::BidError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(crate::types::BidError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.analysis.chunk_size == 0 {
            return Err(crate::types::BidError::Config(
                "analysis chunk_size must be greater than 0".to_string(),
            ));
        }

        if self.analysis.max_content_chars == 0 {
            return Err(crate::types::BidError::Config(
                "analysis max_content_chars must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Pipeline limits derived from the analysis section.
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            ingest: IngestLimits {
                max_content_chars: self.analysis.max_content_chars,
                zip_char_budget: self.analysis.zip_char_budget,
                zip_max_depth: self.analysis.zip_max_depth,
            },
            chunk_size: self.analysis.chunk_size,
            chunk_overlap: self.analysis.chunk_overlap,
        }
    }
}

// =============================================================================
// Analysis Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Ceiling on the normalized bundle text, in characters
    pub max_content_chars: usize,

    /// Characters per model-call window
    pub chunk_size: usize,

    /// Characters carried between consecutive windows
    pub chunk_overlap: usize,

    /// Nested-archive depth bound
    pub zip_max_depth: usize,

    /// Character budget per archive
    pub zip_char_budget: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_content_chars: crate::constants::ingest::MAX_CONTENT_CHARS,
            chunk_size: crate::constants::chunk::CHUNK_SIZE,
            chunk_overlap: crate::constants::chunk::CHUNK_OVERLAP,
            zip_max_depth: crate::constants::extraction::ZIP_MAX_DEPTH,
            zip_char_budget: crate::constants::extraction::ZIP_CHAR_BUDGET,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.analysis.chunk_size, 15_000);
        assert_eq!(config.analysis.chunk_overlap, 1_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_temperature() {
        let mut config = Config::default();
        config.llm.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_chunk_size() {
        let mut config = Config::default();
        config.analysis.chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pipeline_options_carry_limits() {
        let mut config = Config::default();
        config.analysis.max_content_chars = 5_000;
        config.analysis.zip_max_depth = 2;
        let options = config.pipeline_options();
        assert_eq!(options.ingest.max_content_chars, 5_000);
        assert_eq!(options.ingest.zip_max_depth, 2);
        assert_eq!(options.chunk_size, config.analysis.chunk_size);
    }
}
