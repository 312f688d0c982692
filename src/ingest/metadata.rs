//! Bundle Metadata
//!
//! `metadata.json` is optional and best-effort: an absent or unreadable
//! file yields the `{"bid_number": "N/A"}` default instead of an error.
//! Recognized keys are all optional strings (`object`, `dates`,
//! `public_notice`, `status`, `agency`, `city`, `bid_number`, `notes`,
//! `process_id`, `phone`, `website`, `email`, `manager`); unrecognized
//! keys are carried through untouched.

use regex::Regex;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::extract::{METADATA_FILE, decode_bytes};

pub const BID_NUMBER_KEY: &str = "bid_number";
pub const UNKNOWN_BID_NUMBER: &str = "N/A";

/// `Cidade/UF`, `Cidade - UF`, `Cidade, UF`
static CITY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"([A-Za-zÀ-ú ]+)/([A-Z]{2})",
        r"([A-Za-zÀ-ú ]+)\s*-\s*([A-Z]{2})",
        r"([A-Za-zÀ-ú ]+),\s*([A-Z]{2})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static regex"))
    .collect()
});

fn default_metadata() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(
        BID_NUMBER_KEY.to_string(),
        Value::String(UNKNOWN_BID_NUMBER.to_string()),
    );
    map
}

/// Locate `metadata.json` in the bundle directory, case-insensitive.
pub fn find_metadata_file(bundle_dir: &Path) -> Option<std::path::PathBuf> {
    let entries = std::fs::read_dir(bundle_dir).ok()?;
    entries
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .find(|p| {
            p.is_file()
                && p.file_name()
                    .map(|n| n.to_string_lossy().eq_ignore_ascii_case(METADATA_FILE))
                    .unwrap_or(false)
        })
}

/// Read the bundle's metadata map. Never fails; degraded inputs fall back
/// to the default map.
pub fn read_metadata(bundle_dir: &Path) -> Map<String, Value> {
    let Some(path) = find_metadata_file(bundle_dir) else {
        debug!(dir = %bundle_dir.display(), "metadata.json not found, using defaults");
        return default_metadata();
    };

    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read metadata.json");
            return default_metadata();
        }
    };

    let Some(decoded) = decode_bytes(&bytes) else {
        warn!(path = %path.display(), "metadata.json undecodable with every encoding");
        return default_metadata();
    };

    match serde_json::from_str::<Value>(&decoded.text) {
        Ok(Value::Object(mut map)) => {
            map.entry(BID_NUMBER_KEY.to_string())
                .or_insert_with(|| Value::String(UNKNOWN_BID_NUMBER.to_string()));
            map
        }
        Ok(_) => {
            warn!(path = %path.display(), "metadata.json is not a JSON object");
            default_metadata()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "metadata.json is not valid JSON");
            default_metadata()
        }
    }
}

/// Best-effort city/state extraction from the `agency` field, used to seed
/// the pipeline's `city` before the summary stage refines it.
pub fn extract_city(metadata: &Map<String, Value>) -> String {
    let Some(agency) = metadata.get("agency").and_then(Value::as_str) else {
        return UNKNOWN_BID_NUMBER.to_string();
    };

    for pattern in CITY_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(agency) {
            let city = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            let uf = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            if !city.is_empty() {
                return format!("{city}/{uf}");
            }
        }
    }
    UNKNOWN_BID_NUMBER.to_string()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let map = read_metadata(dir.path());
        assert_eq!(map[BID_NUMBER_KEY], "N/A");
    }

    #[test]
    fn test_reads_fields() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("metadata.json"),
            br#"{"bid_number":"PE 12/2026","agency":"Prefeitura de Curitiba/PR","extra":"kept"}"#,
        )
        .unwrap();
        let map = read_metadata(dir.path());
        assert_eq!(map[BID_NUMBER_KEY], "PE 12/2026");
        assert_eq!(map["extra"], "kept");
    }

    #[test]
    fn test_case_insensitive_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Metadata.JSON"), br#"{"bid_number":"7"}"#).unwrap();
        let map = read_metadata(dir.path());
        assert_eq!(map[BID_NUMBER_KEY], "7");
    }

    #[test]
    fn test_invalid_json_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("metadata.json"), b"{not json").unwrap();
        let map = read_metadata(dir.path());
        assert_eq!(map[BID_NUMBER_KEY], "N/A");
    }

    #[test]
    fn test_missing_bid_number_filled_in() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("metadata.json"), br#"{"agency":"X"}"#).unwrap();
        let map = read_metadata(dir.path());
        assert_eq!(map[BID_NUMBER_KEY], "N/A");
    }

    #[test]
    fn test_extract_city_patterns() {
        for agency in [
            "Prefeitura de Curitiba/PR",
            "Prefeitura de Curitiba - PR",
            "Prefeitura de Curitiba, PR",
        ] {
            let mut map = Map::new();
            map.insert("agency".to_string(), Value::String(agency.to_string()));
            let city = extract_city(&map);
            assert!(city.ends_with("/PR"), "agency {agency:?} gave {city:?}");
        }
    }

    #[test]
    fn test_extract_city_absent() {
        assert_eq!(extract_city(&Map::new()), "N/A");
    }
}
