//! DOCX Text Extraction
//!
//! A .docx file is a ZIP whose `word/document.xml` carries the body. The
//! reader streams that XML and collects paragraph text in document order,
//! then table text with cells joined by `" | "` per row, matching how the
//! other document formats flatten tabular data.

use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::types::{BidError, Result};

const DOCUMENT_XML: &str = "word/document.xml";

pub fn extract_docx(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| BidError::extraction(path, e.to_string()))?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))
        .map_err(|e| BidError::extraction(path, format!("não é um DOCX válido: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_XML)
        .map_err(|e| BidError::extraction(path, format!("{DOCUMENT_XML} ausente: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| BidError::extraction(path, e.to_string()))?;

    let text = collect_body_text(&xml).map_err(|e| BidError::extraction(path, e))?;
    if text.trim().is_empty() {
        return Err(BidError::extraction(path, "nenhum texto extraído do DOCX"));
    }
    Ok(text)
}

/// Walk the document XML once, separating top-level paragraphs from table
/// content so the output mirrors the paragraph-then-tables order used for
/// the other formats.
fn collect_body_text(xml: &str) -> std::result::Result<String, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut paragraphs = String::new();
    let mut tables = String::new();

    let mut table_depth = 0usize;
    let mut in_run_text = false;
    let mut paragraph = String::new();
    let mut cell = String::new();
    let mut row: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:tbl" => table_depth += 1,
                b"w:p" if table_depth == 0 => paragraph.clear(),
                b"w:tr" if table_depth > 0 => row.clear(),
                b"w:tc" if table_depth > 0 => cell.clear(),
                b"w:t" => in_run_text = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                b"w:p" if table_depth == 0 => {
                    if !paragraph.trim().is_empty() {
                        paragraphs.push_str(paragraph.trim());
                        paragraphs.push('\n');
                    }
                }
                b"w:tr" if table_depth > 0 => {
                    if !row.is_empty() {
                        tables.push_str(&row.join(" | "));
                        tables.push('\n');
                    }
                }
                b"w:tc" if table_depth > 0 => {
                    let trimmed = cell.trim();
                    if !trimmed.is_empty() {
                        row.push(trimmed.to_string());
                    }
                }
                b"w:t" => in_run_text = false,
                _ => {}
            },
            Ok(Event::Text(t)) if in_run_text => {
                let chunk = t.unescape().map_err(|e| e.to_string())?;
                if table_depth == 0 {
                    paragraph.push_str(&chunk);
                } else {
                    cell.push_str(&chunk);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(format!("XML inválido: {e}")),
        }
    }

    Ok(format!("{paragraphs}{tables}"))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Objeto: aquisição de notebooks.</w:t></w:r></w:p>
    <w:p><w:r><w:t xml:space="preserve">Prazo de entrega: </w:t></w:r><w:r><w:t>30 dias.</w:t></w:r></w:p>
    <w:p><w:r><w:t>   </w:t></w:r></w:p>
    <w:tbl>
      <w:tr>
        <w:tc><w:p><w:r><w:t>Item</w:t></w:r></w:p></w:tc>
        <w:tc><w:p><w:r><w:t>Quantidade</w:t></w:r></w:p></w:tc>
      </w:tr>
      <w:tr>
        <w:tc><w:p><w:r><w:t>Notebook</w:t></w:r></w:p></w:tc>
        <w:tc><w:p><w:r><w:t>750</w:t></w:r></w:p></w:tc>
      </w:tr>
    </w:tbl>
  </w:body>
</w:document>"#;

    #[test]
    fn test_paragraphs_then_tables() {
        let text = collect_body_text(SAMPLE).unwrap();
        let expected = "Objeto: aquisição de notebooks.\nPrazo de entrega: 30 dias.\nItem | Quantidade\nNotebook | 750\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_blank_paragraphs_dropped() {
        let text = collect_body_text(SAMPLE).unwrap();
        assert!(!text.contains("\n\n"));
    }

    #[test]
    fn test_runs_inside_one_paragraph_concatenate() {
        let text = collect_body_text(SAMPLE).unwrap();
        assert!(text.contains("Prazo de entrega: 30 dias."));
    }

    #[test]
    fn test_not_a_zip_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"plain bytes").unwrap();
        let err = extract_docx(&path).unwrap_err();
        assert!(matches!(err, BidError::Extraction { .. }));
    }
}
