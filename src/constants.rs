//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Document extraction constants
pub mod extraction {
    /// Maximum number of PDF pages processed per file
    pub const MAX_PDF_PAGES: usize = 20;

    /// Pages whose cleaned text is at or below this length are treated as
    /// noise (scanned images, headers) and dropped
    pub const MIN_PAGE_CHARS: usize = 50;

    /// Maximum nesting depth for ZIP-inside-ZIP extraction
    pub const ZIP_MAX_DEPTH: usize = 3;

    /// Character budget for the text extracted from one archive
    pub const ZIP_CHAR_BUDGET: usize = 50_000;
}

/// Bundle ingestion constants
pub mod ingest {
    /// Ceiling on the normalized aggregate text of one bundle
    pub const MAX_CONTENT_CHARS: usize = 200_000;
}

/// Text chunking constants
pub mod chunk {
    /// Window size in characters for one model call
    pub const CHUNK_SIZE: usize = 15_000;

    /// Overlap carried between consecutive windows
    pub const CHUNK_OVERLAP: usize = 1_000;
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

    /// Default maximum tokens per completion
    pub const DEFAULT_MAX_TOKENS: usize = 1024;
}
