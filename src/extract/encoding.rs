//! Byte-to-Text Decoding
//!
//! Bidding documents arrive in a mix of UTF-8 and legacy Windows/Latin
//! encodings. Decoding tries a fixed, ordered list of strategies and keeps
//! the first one that yields non-empty text. The list is data-driven so a
//! new fallback is one more entry, not new control flow.
//!
//! Latin-1 and CP1252 accept any byte sequence, so the earlier candidates
//! are always preferred; a same-bytes input resolves to the same encoding
//! on every call.

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// One decoding strategy. Returns `None` when the bytes are not valid for
/// this encoding or decode to empty text.
struct EncodingStrategy {
    name: &'static str,
    decode: fn(&[u8]) -> Option<String>,
}

const STRATEGIES: &[EncodingStrategy] = &[
    EncodingStrategy {
        name: "utf-8-sig",
        decode: decode_utf8_sig,
    },
    EncodingStrategy {
        name: "utf-8",
        decode: decode_utf8,
    },
    EncodingStrategy {
        name: "latin1",
        decode: decode_latin1,
    },
    EncodingStrategy {
        name: "cp1252",
        decode: decode_cp1252,
    },
    EncodingStrategy {
        name: "iso-8859-1",
        decode: decode_latin1,
    },
];

/// Successful decode with the strategy that produced it.
#[derive(Debug)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static str,
}

/// Decode raw bytes, trying each candidate encoding in order.
///
/// Returns `None` only when every candidate fails or yields empty output
/// (in practice: empty or whitespace-only input, since Latin-1 never
/// rejects bytes).
pub fn decode_bytes(bytes: &[u8]) -> Option<DecodedText> {
    for strategy in STRATEGIES {
        if let Some(text) = (strategy.decode)(bytes)
            && !text.trim().is_empty()
        {
            return Some(DecodedText {
                text,
                encoding: strategy.name,
            });
        }
    }
    None
}

fn decode_utf8_sig(bytes: &[u8]) -> Option<String> {
    let body = bytes.strip_prefix(UTF8_BOM)?;
    std::str::from_utf8(body).ok().map(str::to_string)
}

fn decode_utf8(bytes: &[u8]) -> Option<String> {
    std::str::from_utf8(bytes).ok().map(str::to_string)
}

fn decode_latin1(bytes: &[u8]) -> Option<String> {
    // ISO-8859-1 maps every byte directly to the same code point.
    Some(bytes.iter().map(|&b| b as char).collect())
}

fn decode_cp1252(bytes: &[u8]) -> Option<String> {
    let (text, _, had_errors) = encoding_rs::WINDOWS_1252.decode(bytes);
    if had_errors {
        return None;
    }
    Some(text.into_owned())
}

// =============================================================================
// Tests
// =============================================================================
