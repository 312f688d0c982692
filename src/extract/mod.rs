//! Per-Format Text Extraction
//!
//! One file in, normalized text out. The supported formats are a closed
//! [`FileKind`] enum resolved once per file, so the dispatch table is
//! exhaustive and adding a format is a compiler-checked change.
//!
//! ZIP members are not handled here; the archive walker
//! ([`archive::extract_zip`]) owns recursion and scratch-directory
//! lifecycle and calls back into [`extract_file`] for leaf members.

pub mod archive;
pub mod docx;
pub mod encoding;
pub mod normalize;
pub mod pdf;

pub use archive::extract_zip;
pub use encoding::{DecodedText, decode_bytes};
pub use normalize::clean_text;

use serde_json::Value;
use std::path::Path;
use tracing::debug;

use crate::types::{BidError, Result};

/// File name treated as bundle metadata rather than document content.
pub const METADATA_FILE: &str = "metadata.json";

/// The closed set of supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Docx,
    Text,
    Csv,
    Json,
    Zip,
    Unknown,
}

impl FileKind {
    /// Resolve the kind from the file extension, case-insensitive.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Self::Pdf,
            "docx" | "doc" => Self::Docx,
            "md" | "markdown" | "txt" => Self::Text,
            "csv" => Self::Csv,
            "json" => Self::Json,
            "zip" => Self::Zip,
            _ => Self::Unknown,
        }
    }
}

/// Extract text from one non-archive file, dispatching on [`FileKind`].
///
/// `Unknown` extensions get the generic text decode; callers route
/// [`FileKind::Zip`] to [`extract_zip`] instead.
pub fn extract_file(path: &Path) -> Result<String> {
    let kind = FileKind::from_path(path);
    debug!(path = %path.display(), ?kind, "extracting file");
    match kind {
        FileKind::Pdf => pdf::extract_pdf(path),
        FileKind::Docx => docx::extract_docx(path),
        FileKind::Csv => extract_csv(path),
        FileKind::Json => extract_json(path),
        FileKind::Text | FileKind::Unknown => extract_text(path),
        FileKind::Zip => extract_zip(
            path,
            crate::constants::extraction::ZIP_CHAR_BUDGET,
            crate::constants::extraction::ZIP_MAX_DEPTH,
            0,
        ),
    }
}

fn read_decoded(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    decode_bytes(&bytes)
        .map(|d| {
            debug!(path = %path.display(), encoding = d.encoding, "decoded");
            d.text
        })
        .ok_or_else(|| {
            BidError::extraction(path, "não foi possível decodificar com nenhum encoding")
        })
}

fn extract_text(path: &Path) -> Result<String> {
    read_decoded(path)
}

fn extract_csv(path: &Path) -> Result<String> {
    let decoded = read_decoded(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(decoded.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| BidError::extraction(path, e.to_string()))?;
        let cells: Vec<&str> = record
            .iter()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect();
        if !cells.is_empty() {
            rows.push(cells.join(" | "));
        }
    }

    if rows.is_empty() {
        return Err(BidError::extraction(path, "nenhuma linha com conteúdo no CSV"));
    }
    Ok(rows.join("\n"))
}

/// JSON files are re-serialized as indented text. For `metadata.json` the
/// caller-supplied analysis parameters `threshold` and `target` are
/// stripped first so the model never sees the answer key; the (possibly
/// empty) remainder is still returned because metadata presence is itself
/// meaningful.
fn extract_json(path: &Path) -> Result<String> {
    let decoded = read_decoded(path)?;
    let mut value: Value = serde_json::from_str(&decoded)
        .map_err(|e| BidError::extraction(path, format!("JSON inválido: {e}")))?;

    let is_metadata = path
        .file_name()
        .map(|n| n.to_string_lossy().eq_ignore_ascii_case(METADATA_FILE))
        .unwrap_or(false);

    if is_metadata && let Value::Object(map) = &mut value {
        for key in ["threshold", "target"] {
            if map.remove(key).is_some() {
                debug!(key, "stripped analysis parameter from metadata.json");
            }
        }
    }

    Ok(serde_json::to_string_pretty(&value)?)
}

// =============================================================================
// Tests
// =============================================================================
