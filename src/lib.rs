//! BidSift - Public-Tender Bundle Relevance Analyzer
//!
//! Ingests a directory of edital documents (PDF, DOCX, CSV, text, JSON,
//! ZIP archives), normalizes the extracted text into one corpus, and runs
//! a staged LLM analysis that decides whether the tender is relevant for a
//! given target product or service and minimum volume.
//!
//! ## Core Features
//!
//! - **Format Extraction**: PDF (two backends), DOCX, CSV, text and JSON
//!   with an ordered encoding-fallback chain for legacy files
//! - **Archive Handling**: nested ZIP expansion with a depth bound and a
//!   per-archive character budget
//! - **Staged Pipeline**: metadata → content → summary → target →
//!   threshold → justification, with terminal error short-circuiting
//! - **Quantity Reconciliation**: per-chunk estimates folded by maximum,
//!   never summed
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use bidsift::{AnalysisPipeline, AnalysisRequest, OpenAiProvider, PipelineOptions};
//!
//! let provider = Arc::new(OpenAiProvider::new(config.llm.clone())?);
//! let pipeline = AnalysisPipeline::new(provider, PipelineOptions::default());
//! let report = pipeline.run(&AnalysisRequest {
//!     bundle_dir: "bundles/pe-042-2026".into(),
//!     target: "tablet".into(),
//!     threshold: 500,
//!     force_match: false,
//! }).await;
//! ```
//!
//! ## Modules
//!
//! - [`extract`]: per-format text extraction, encodings, normalization
//! - [`ingest`]: bundle walking, metadata, size guard
//! - [`chunk`]: sentence-aware windowing for model calls
//! - [`pipeline`]: the staged analysis state machine
//! - [`ai`]: LLM provider abstraction and the OpenAI implementation

pub mod ai;
pub mod chunk;
pub mod cli;
pub mod config;
pub mod constants;
pub mod extract;
pub mod ingest;
pub mod pipeline;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{AnalysisConfig, Config, ConfigLoader};

// Error Types
pub use types::{AnalysisReport, BidError, Result, ThresholdMatch};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use pipeline::{
    AnalysisPipeline, AnalysisRequest, PipelineOptions, PipelineState, QuantityEstimate,
    ReconciledQuantity,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{LlmProvider, LlmResponse, OpenAiProvider, ProviderConfig, SharedProvider, TokenUsage};

// =============================================================================
// Ingestion Re-exports
// =============================================================================

pub use chunk::{TextChunk, split_text};
pub use ingest::{IngestLimits, ingest_bundle, read_metadata};
