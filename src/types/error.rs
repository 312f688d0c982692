//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Design Principles
//!
//! - Single unified error type (BidError) for the entire application
//! - Domain outcomes (`DocumentTooLarge`, `InsufficientContent`) are values
//!   carried through `Result`, never panics
//! - Per-file extraction errors are recoverable at the ingestion layer;
//!   pipeline-stage errors are terminal

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BidError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Extraction Errors
    // -------------------------------------------------------------------------
    /// Bundle directory or referenced file is missing
    #[error("Diretório não encontrado: {0}")]
    NotFound(PathBuf),

    /// ZIP archive is missing or corrupted; the member is abandoned but
    /// sibling members are still processed
    #[error("Arquivo não é um ZIP válido: {path}: {reason}")]
    BadArchive { path: PathBuf, reason: String },

    /// No member of the archive yielded usable text
    #[error("Nenhum texto extraído do ZIP: {0}")]
    EmptyArchive(PathBuf),

    /// One file's format-specific extraction failed or yielded no text
    #[error("Falha ao extrair texto de {path}: {reason}")]
    Extraction { path: PathBuf, reason: String },

    // -------------------------------------------------------------------------
    // Ingestion Outcomes (terminal for the bundle, not infrastructure faults)
    // -------------------------------------------------------------------------
    /// Bundle has no content files, or every content file failed
    #[error("{reason}")]
    InsufficientContent {
        reason: String,
        failed_files: Vec<String>,
    },

    /// Aggregate text exceeds the configured ceiling. Deliberately not
    /// retried with truncation: truncation could hide the very passage
    /// that decides relevance.
    #[error("Documento muito grande: {actual_chars} caracteres (limite: {max_chars})")]
    DocumentTooLarge {
        max_chars: usize,
        actual_chars: usize,
    },

    // -------------------------------------------------------------------------
    // Model / Config Errors
    // -------------------------------------------------------------------------
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// Model response failed schema validation (missing field, wrong type,
    /// negative quantity, non-string unit)
    #[error("Resposta do modelo inválida: {0}")]
    MalformedResponse(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BidError>;

impl BidError {
    /// Create an extraction error with path context
    pub fn extraction(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Extraction {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is an expected business outcome of ingestion
    /// rather than an infrastructure failure. Domain outcomes carry their
    /// own user-facing justification.
    pub fn is_domain_outcome(&self) -> bool {
        matches!(
            self,
            Self::InsufficientContent { .. } | Self::DocumentTooLarge { .. }
        )
    }

    /// Human-readable justification for domain outcomes, shown in the final
    /// report when the bundle is marked not relevant.
    pub fn justification(&self) -> Option<String> {
        match self {
            Self::DocumentTooLarge {
                max_chars,
                actual_chars,
            } => Some(format!(
                "Não foi possível processar a análise por completo pois o documento é muito \
                 grande (tamanho atual: {actual_chars} caracteres, limite: {max_chars} \
                 caracteres). Por segurança, o edital foi marcado como não relevante."
            )),
            Self::InsufficientContent { reason, .. } => Some(reason.clone()),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_outcomes_classified() {
        let too_large = BidError::DocumentTooLarge {
            max_chars: 10,
            actual_chars: 11,
        };
        assert!(too_large.is_domain_outcome());
        assert!(too_large.justification().is_some());

        let insufficient = BidError::InsufficientContent {
            reason: "Apenas metadata.json encontrado.".to_string(),
            failed_files: vec![],
        };
        assert!(insufficient.is_domain_outcome());

        let io = BidError::Io(std::io::Error::other("boom"));
        assert!(!io.is_domain_outcome());
        assert!(io.justification().is_none());
    }

    #[test]
    fn test_too_large_message_carries_sizes() {
        let err = BidError::DocumentTooLarge {
            max_chars: 200_000,
            actual_chars: 200_001,
        };
        let msg = err.justification().unwrap();
        assert!(msg.contains("200000"));
        assert!(msg.contains("200001"));
    }

    #[test]
    fn test_insufficient_content_justification_is_reason() {
        let err = BidError::InsufficientContent {
            reason: "Não foi possível extrair conteúdo de nenhum arquivo de conteúdo.".to_string(),
            failed_files: vec!["a.pdf".to_string()],
        };
        assert_eq!(err.justification().unwrap(), err.to_string());
    }
}
