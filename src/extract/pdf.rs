//! PDF Text Extraction
//!
//! Two backends tried in order: lopdf first (page-by-page, which lets us
//! cap pages and drop near-empty ones), then pdf-extract over the whole
//! document when lopdf cannot parse the file. Pages are capped at
//! [`MAX_PDF_PAGES`] and pages whose cleaned text is at or below
//! [`MIN_PAGE_CHARS`] are discarded as scanned-image noise.

use std::path::Path;
use tracing::{debug, warn};

use super::normalize::clean_text;
use crate::constants::extraction::{MAX_PDF_PAGES, MIN_PAGE_CHARS};
use crate::types::{BidError, Result};

/// Extract text from a PDF, retrying once with the secondary backend.
pub fn extract_pdf(path: &Path) -> Result<String> {
    match extract_with_lopdf(path) {
        Ok(text) => Ok(text),
        Err(primary_err) => {
            warn!(
                path = %path.display(),
                error = %primary_err,
                "primary PDF backend failed, retrying with pdf-extract"
            );
            extract_with_pdf_extract(path)
        }
    }
}

fn extract_with_lopdf(path: &Path) -> Result<String> {
    let doc = lopdf::Document::load(path)
        .map_err(|e| BidError::extraction(path, format!("lopdf: {e}")))?;

    let pages = doc.get_pages();
    debug!(path = %path.display(), pages = pages.len(), "PDF opened");

    let mut text = String::new();
    for (&page_number, _) in pages.iter().take(MAX_PDF_PAGES) {
        let raw = match doc.extract_text(&[page_number]) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(page = page_number, error = %e, "page extraction failed, skipping");
                continue;
            }
        };

        let cleaned = clean_text(&raw);
        if cleaned.chars().count() > MIN_PAGE_CHARS {
            text.push_str(&format!("\n\n=== Página {page_number} ===\n\n{cleaned}"));
        } else {
            debug!(page = page_number, "page dropped: too little text");
        }
    }

    if text.trim().is_empty() {
        return Err(BidError::extraction(path, "nenhum texto extraído do PDF"));
    }
    Ok(clean_text(&text))
}

fn extract_with_pdf_extract(path: &Path) -> Result<String> {
    let raw = pdf_extract::extract_text(path)
        .map_err(|e| BidError::extraction(path, format!("pdf-extract: {e}")))?;

    let cleaned = clean_text(&raw);
    if cleaned.chars().count() <= MIN_PAGE_CHARS {
        return Err(BidError::extraction(path, "nenhum texto extraído do PDF"));
    }
    Ok(format!("=== Página 1 ===\n\n{cleaned}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_extraction_error() {
        let err = extract_pdf(Path::new("/nonexistent/file.pdf")).unwrap_err();
        assert!(matches!(err, BidError::Extraction { .. }));
    }

    #[test]
    fn test_non_pdf_bytes_rejected_by_both_backends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"this is not a pdf at all").unwrap();
        let err = extract_pdf(&path).unwrap_err();
        assert!(matches!(err, BidError::Extraction { .. }));
    }
}
