//! Quantity Estimation and Reconciliation
//!
//! Per-chunk quantity estimates are validated here and folded into a
//! single verdict. Quantities repeat across edital sections (object,
//! annexes, price tables), so reconciliation takes the MAXIMUM estimate,
//! never the sum.

use serde_json::Value;

use crate::types::{BidError, Result, ThresholdMatch};

/// Validated per-chunk estimate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityEstimate {
    pub total_quantity: u64,
    pub unit: String,
    pub explanation: String,
}

/// Parse and validate one model response into an estimate.
///
/// Required fields: `total_quantity` (non-negative integer), `unit`
/// (non-empty string). `explanation` is optional and defaults to empty.
pub fn parse_estimate(value: &Value) -> Result<QuantityEstimate> {
    let obj = value.as_object().ok_or_else(|| {
        BidError::MalformedResponse("estimativa de quantidade: resposta inválida".to_string())
    })?;

    let mut missing = Vec::new();
    if !obj.contains_key("total_quantity") {
        missing.push("total_quantity");
    }
    if !obj.contains_key("unit") {
        missing.push("unit");
    }
    if !missing.is_empty() {
        return Err(BidError::MalformedResponse(format!(
            "estimativa de quantidade: campos ausentes ({})",
            missing.join(", ")
        )));
    }

    let total_quantity = obj
        .get("total_quantity")
        .and_then(Value::as_u64)
        .ok_or_else(|| {
            BidError::MalformedResponse(
                "estimativa de quantidade: valor inválido em total_quantity".to_string(),
            )
        })?;

    let unit = obj
        .get("unit")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            BidError::MalformedResponse(
                "estimativa de quantidade: unidade inválida".to_string(),
            )
        })?
        .to_string();

    let explanation = obj
        .get("explanation")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(QuantityEstimate {
        total_quantity,
        unit,
        explanation,
    })
}

/// Reconciled verdict over all chunk estimates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledQuantity {
    pub total_quantity: u64,
    pub unit: String,
    pub explanation: String,
    pub threshold_match: ThresholdMatch,
}

/// Fold per-chunk estimates into the final threshold verdict.
///
/// Rules, in order:
/// 1. `threshold == 0` means no minimum was required: match is true.
/// 2. Without a target match the quantity question is moot: match is false.
/// 3. No quantity found but a positive threshold required: inconclusive.
/// 4. Otherwise compare the maximum estimate against the threshold.
pub fn reconcile(
    estimates: &[QuantityEstimate],
    threshold: u64,
    target_match: bool,
) -> ReconciledQuantity {
    let best = estimates.iter().max_by_key(|e| e.total_quantity);

    let (total_quantity, unit, explanation) = match best {
        Some(e) => (e.total_quantity, e.unit.clone(), e.explanation.clone()),
        None => (0, String::new(), String::new()),
    };

    let threshold_match = if threshold == 0 {
        ThresholdMatch::True
    } else if !target_match {
        ThresholdMatch::False
    } else if total_quantity == 0 {
        ThresholdMatch::Inconclusive
    } else if total_quantity >= threshold {
        ThresholdMatch::True
    } else {
        ThresholdMatch::False
    };

    ReconciledQuantity {
        total_quantity,
        unit,
        explanation,
        threshold_match,
    }
}

impl ReconciledQuantity {
    /// Audit string stored back into the bundle metadata.
    pub fn audit_string(&self) -> String {
        format!(
            "{} {} - {}",
            self.total_quantity, self.unit, self.explanation
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
