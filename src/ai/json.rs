//! Model Response JSON Extraction
//!
//! Models wrap JSON in markdown fences or prose often enough that a
//! straight `serde_json::from_str` is not good enough. Extraction tries a
//! direct parse first, then strips code fences, then falls back to the
//! outermost brace pair.

use serde_json::Value;

use crate::types::{BidError, Result};

/// Parse the JSON payload out of a raw model response.
pub fn extract_json_from_response(raw: &str) -> Result<Value> {
    let cleaned = preprocess(raw);

    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        return Ok(value);
    }

    // Last resort: outermost object braces
    if let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}'))
        && start < end
        && let Ok(value) = serde_json::from_str::<Value>(&cleaned[start..=end])
    {
        return Ok(value);
    }

    Err(BidError::MalformedResponse(format!(
        "resposta não contém JSON válido: {}",
        truncate_for_log(raw)
    )))
}

fn preprocess(raw: &str) -> String {
    let mut s = raw.trim();
    s = s.trim_start_matches('\u{feff}');

    // Remove ```json ... ``` or ``` ... ```
    let mut out = s.to_string();
    if out.starts_with("```")
        && let Some(first_newline) = out.find('\n')
    {
        out = out[first_newline + 1..].to_string();
    }
    if out.ends_with("```") {
        out = out[..out.len() - 3].trim_end().to_string();
    }
    out.trim().to_string()
}

fn truncate_for_log(raw: &str) -> String {
    const LIMIT: usize = 120;
    if raw.chars().count() <= LIMIT {
        raw.to_string()
    } else {
        let head: String = raw.chars().take(LIMIT).collect();
        format!("{head}…")
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        let value = extract_json_from_response(r#"{"is_relevant": true}"#).unwrap();
        assert_eq!(value["is_relevant"], true);
    }

    #[test]
    fn test_fenced_json() {
        let raw = "```json\n{\"total_quantity\": 750}\n```";
        let value = extract_json_from_response(raw).unwrap();
        assert_eq!(value["total_quantity"], 750);
    }

    #[test]
    fn test_json_buried_in_prose() {
        let raw = "Segue a análise: {\"unit\": \"unidades\"} conforme pedido.";
        let value = extract_json_from_response(raw).unwrap();
        assert_eq!(value["unit"], "unidades");
    }

    #[test]
    fn test_garbage_is_malformed() {
        let err = extract_json_from_response("sem json aqui").unwrap_err();
        assert!(matches!(err, BidError::MalformedResponse(_)));
    }
}
