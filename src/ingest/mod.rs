//! Bundle Ingestion
//!
//! Walks a document-bundle directory, extracts text from every file, and
//! produces the single normalized corpus the analysis pipeline reads.
//! `metadata.json` is classified as metadata; its extraction failures are
//! never counted against the bundle. A bundle with no content files, or
//! whose content files all failed, is rejected with
//! [`BidError::InsufficientContent`] — metadata alone cannot be analyzed.
//!
//! The aggregate passes through the size guard last: exceeding the
//! character ceiling is terminal and deliberately not degraded to a
//! truncated analysis.

pub mod metadata;

pub use metadata::{extract_city, read_metadata};

use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::extract::{FileKind, METADATA_FILE, clean_text, extract_file, extract_zip};
use crate::types::{BidError, Result};

/// Limits applied while ingesting one bundle.
#[derive(Debug, Clone, Copy)]
pub struct IngestLimits {
    /// Ceiling on the normalized aggregate text
    pub max_content_chars: usize,
    /// Character budget per archive
    pub zip_char_budget: usize,
    /// Nested-archive depth bound
    pub zip_max_depth: usize,
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self {
            max_content_chars: crate::constants::ingest::MAX_CONTENT_CHARS,
            zip_char_budget: crate::constants::extraction::ZIP_CHAR_BUDGET,
            zip_max_depth: crate::constants::extraction::ZIP_MAX_DEPTH,
        }
    }
}

fn is_metadata_file(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().eq_ignore_ascii_case(METADATA_FILE))
        .unwrap_or(false)
}

/// Ingest every file in the bundle directory into one normalized corpus.
pub fn ingest_bundle(bundle_dir: &Path, limits: &IngestLimits) -> Result<String> {
    if !bundle_dir.is_dir() {
        return Err(BidError::NotFound(bundle_dir.to_path_buf()));
    }

    let mut content_files = 0usize;
    let mut successful_content = 0usize;
    let mut failed_files: Vec<String> = Vec::new();
    let mut aggregate = String::new();

    for entry in WalkDir::new(bundle_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_metadata = is_metadata_file(path);
        if !is_metadata {
            content_files += 1;
        }

        let extracted = match FileKind::from_path(path) {
            FileKind::Zip => extract_zip(path, limits.zip_char_budget, limits.zip_max_depth, 0),
            _ => extract_file(path),
        };

        match extracted {
            Ok(text) => {
                aggregate.push_str(&format!("\n\n=== {name} ===\n\n{text}"));
                if !is_metadata {
                    successful_content += 1;
                }
                debug!(file = %name, chars = text.chars().count(), "file ingested");
            }
            Err(e) => {
                // Metadata failures are not content failures
                if !is_metadata {
                    failed_files.push(name.clone());
                }
                warn!(file = %name, error = %e, "file skipped");
            }
        }
    }

    if content_files == 0 {
        return Err(BidError::InsufficientContent {
            reason: "Apenas metadata.json encontrado. Não há arquivos de conteúdo para análise."
                .to_string(),
            failed_files: Vec::new(),
        });
    }

    if successful_content == 0 {
        return Err(BidError::InsufficientContent {
            reason: format!(
                "Não foi possível extrair conteúdo de nenhum arquivo de conteúdo. \
                 Arquivos com erro: {}",
                failed_files.join(", ")
            ),
            failed_files,
        });
    }

    let normalized = clean_text(&aggregate);
    enforce_size_limit(&normalized, limits.max_content_chars)?;

    info!(
        files = content_files,
        failed = failed_files.len(),
        chars = normalized.chars().count(),
        "bundle ingested"
    );
    Ok(normalized)
}

/// Content-size guard. A corpus of exactly `max_chars` characters passes;
/// one more character fails with the sizes in the payload.
pub fn enforce_size_limit(text: &str, max_chars: usize) -> Result<()> {
    let actual_chars = text.chars().count();
    if actual_chars > max_chars {
        return Err(BidError::DocumentTooLarge {
            max_chars,
            actual_chars,
        });
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
