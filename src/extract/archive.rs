//! ZIP Archive Extraction
//!
//! Expands an archive into a fresh scratch directory, extracts text from
//! every member, and recurses into nested ZIPs with an explicit depth
//! counter. The scratch directory is a [`tempfile::TempDir`], so it is
//! removed on every exit path, including errors raised mid-walk.
//!
//! Recursion past the depth bound produces a bounded-depth marker instead
//! of an error: partial extraction of a deeply nested archive is still
//! useful to the analysis.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::{FileKind, extract_file};
use crate::types::{BidError, Result};

/// Marker appended when nesting exceeds the depth bound.
fn depth_marker(max_depth: usize) -> String {
    format!("[Profundidade máxima de ZIP atingida ({max_depth}). Conteúdo não expandido.]")
}

/// Extract all member text from a ZIP archive.
///
/// `depth` is the current nesting level; the top-level call passes 0.
/// The result is truncated to `max_chars` characters with an explicit
/// truncation marker.
pub fn extract_zip(path: &Path, max_chars: usize, max_depth: usize, depth: usize) -> Result<String> {
    if depth >= max_depth {
        debug!(path = %path.display(), max_depth, "ZIP depth bound reached");
        return Ok(depth_marker(max_depth));
    }

    if !path.exists() {
        return Err(BidError::NotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file)).map_err(|e| BidError::BadArchive {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    // Scratch area owned by this call; TempDir removes it on drop.
    let scratch = tempfile::tempdir()?;
    archive
        .extract(scratch.path())
        .map_err(|e| BidError::BadArchive {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let mut text = String::new();
    for entry in WalkDir::new(scratch.path())
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let member = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        let extracted = if FileKind::from_path(member) == FileKind::Zip {
            match extract_zip(member, max_chars, max_depth, depth + 1) {
                Ok(nested) => {
                    text.push_str(&format!("\n\n=== ZIP ANINHADO: {name} ===\n\n{nested}"));
                    continue;
                }
                Err(e) => Err(e),
            }
        } else {
            extract_file(member)
        };

        match extracted {
            Ok(member_text) => {
                text.push_str(&format!("\n\n=== {name} ===\n\n{member_text}"));
            }
            Err(e) => {
                warn!(member = %name, error = %e, "archive member skipped");
            }
        }
    }

    if text.trim().is_empty() {
        return Err(BidError::EmptyArchive(path.to_path_buf()));
    }

    Ok(truncate_chars(&text, max_chars))
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}\n\n[Texto truncado em {max_chars} caracteres]")
}

// =============================================================================
// Tests
// =============================================================================
