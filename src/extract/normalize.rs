//! Text Normalization
//!
//! Every extracted unit and the final aggregate pass through the same
//! cleaner: control characters out, whitespace runs collapsed, blank runs
//! trimmed. The cleaner is idempotent; `clean_text(clean_text(x)) ==
//! clean_text(x)` is relied on because files are cleaned individually and
//! the concatenation is cleaned again.

use regex::Regex;
use std::sync::LazyLock;

static HORIZONTAL_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\x0b\x0c]+").expect("static regex"));
static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" ([.,;:!?])").expect("static regex"));
static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("static regex"));

/// Collapse whitespace, strip control characters, trim blank lines.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = text.replace('\u{0}', "").replace('\r', " ");

    // Drop remaining control characters; newline and tab survive so the
    // whitespace collapse below turns tab runs into single spaces
    let text: String = text
        .chars()
        .filter(|c| *c == '\n' || *c == '\t' || !c.is_control())
        .collect();

    let text = HORIZONTAL_WS.replace_all(&text, " ");
    let text = SPACE_BEFORE_PUNCT.replace_all(&text, "$1");

    // Trim each line, then collapse runs of blank lines
    let text = text
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    let text = BLANK_RUNS.replace_all(&text, "\n\n");

    text.trim().to_string()
}

// =============================================================================
// Tests
// =============================================================================
