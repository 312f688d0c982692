//! Sentence-Aware Text Chunking
//!
//! Splits normalized text into overlapping windows sized for one model
//! call. The scan is greedy and forward-only: each window ends at the last
//! sentence terminator past its midpoint when one exists, otherwise at the
//! raw boundary. The next window starts `overlap` characters back, but
//! always strictly after the previous start so the scan terminates even
//! when `overlap >= chunk_size`.
//!
//! Offsets are in characters, matching the character-based size limits
//! used everywhere else.

/// One bounded slice of the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub index: usize,
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

/// Split `text` into overlapping, sentence-aligned chunks.
///
/// Empty input yields an empty sequence. `start_offset` is strictly
/// increasing across the result.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<TextChunk> {
    if text.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < total {
        let raw_end = (start + chunk_size).min(total);
        let end = if raw_end < total {
            sentence_boundary(&chars, start, raw_end, chunk_size).unwrap_or(raw_end)
        } else {
            raw_end
        };

        chunks.push(TextChunk {
            index: chunks.len(),
            text: chars[start..end].iter().collect(),
            start_offset: start,
            end_offset: end,
        });

        if end >= total {
            break;
        }
        // Strictly advance even when overlap swallows the whole window
        start = end.saturating_sub(overlap).max(start + 1);
    }

    chunks
}

/// Last `.` in `(midpoint, end)` that keeps the chunk sentence-aligned;
/// the boundary is the position just after the terminator.
fn sentence_boundary(chars: &[char], start: usize, end: usize, chunk_size: usize) -> Option<usize> {
    let midpoint = start + chunk_size / 2;
    (midpoint.max(start)..end)
        .rev()
        .find(|&i| chars[i] == '.')
        .map(|i| i + 1)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_input() {
        assert!(split_text("", 100, 10).is_empty());
    }

    #[test]
    fn test_short_input_single_chunk() {
        let chunks = split_text("texto curto", 100, 10);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "texto curto");
        assert_eq!(chunks[0].start_offset, 0);
        assert_eq!(chunks[0].end_offset, 11);
    }

    #[test]
    fn test_prefers_sentence_boundary() {
        let text = format!("{} fim da primeira frase.{}", "a".repeat(26), "b".repeat(30));
        let period = text.chars().position(|c| c == '.').unwrap();
        // terminator lies past the midpoint (30) of the first 60-char window
        assert!(period > 30 && period < 60);
        let chunks = split_text(&text, 60, 5);
        assert_eq!(chunks[0].end_offset, period + 1);
        assert!(chunks[0].text.ends_with("frase."));
    }

    #[test]
    fn test_terminator_before_midpoint_ignored() {
        let text = format!("curta.{}", "x".repeat(94)); // "." at 5, midpoint 25
        let chunks = split_text(&text, 50, 5);
        assert_eq!(chunks[0].end_offset, 50);
    }

    #[test]
    fn test_overlap_carried() {
        let text = "x".repeat(250);
        let chunks = split_text(&text, 100, 20);
        assert_eq!(chunks[0].end_offset, 100);
        assert_eq!(chunks[1].start_offset, 80);
    }

    #[test]
    fn test_overlap_ge_chunk_size_terminates() {
        let text = "y".repeat(500);
        let chunks = split_text(&text, 10, 100);
        assert!(!chunks.is_empty());
        for pair in chunks.windows(2) {
            assert!(pair[1].start_offset > pair[0].start_offset);
        }
        assert_eq!(chunks.last().unwrap().end_offset, 500);
    }

    #[test]
    fn test_offsets_match_text() {
        let text: String = ("lorem ipsum dolor. ".repeat(40)).trim().to_string();
        let chars: Vec<char> = text.chars().collect();
        for chunk in split_text(&text, 100, 15) {
            let slice: String = chars[chunk.start_offset..chunk.end_offset].iter().collect();
            assert_eq!(slice, chunk.text);
        }
    }

    proptest! {
        #[test]
        fn prop_terminates_and_covers(
            text in "[a-z .]{0,400}",
            chunk_size in 1usize..50,
            overlap in 0usize..80,
        ) {
            let chunks = split_text(&text, chunk_size, overlap);
            let total = text.chars().count();

            if total == 0 {
                prop_assert!(chunks.is_empty());
                return Ok(());
            }

            // strictly increasing starts, indexes sequential
            for (i, chunk) in chunks.iter().enumerate() {
                prop_assert_eq!(chunk.index, i);
                prop_assert!(chunk.start_offset < chunk.end_offset);
            }
            for pair in chunks.windows(2) {
                prop_assert!(pair[1].start_offset > pair[0].start_offset);
                // no gaps: each chunk starts at or before the previous end
                prop_assert!(pair[1].start_offset <= pair[0].end_offset);
            }

            // full coverage: first chunk starts at 0, last ends at total
            prop_assert_eq!(chunks[0].start_offset, 0);
            prop_assert_eq!(chunks.last().unwrap().end_offset, total);
        }

        #[test]
        fn prop_overlap_removal_reconstructs(text in "[a-zà-ú .,]{1,300}") {
            let chunks = split_text(&text, 40, 10);
            let chars: Vec<char> = text.chars().collect();
            let mut rebuilt = String::new();
            let mut covered = 0usize;
            for chunk in &chunks {
                let fresh_from = covered.max(chunk.start_offset);
                let fresh: String = chars[fresh_from..chunk.end_offset].iter().collect();
                rebuilt.push_str(&fresh);
                covered = chunk.end_offset;
            }
            prop_assert_eq!(rebuilt, text);
        }
    }
}
