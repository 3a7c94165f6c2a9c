// 🏷️ Eligibility Rules - which rows earn a claim, which columns contribute
// Bounds are fixed constants of the reward campaign

use crate::ledger::TransferRow;
use serde::{Deserialize, Serialize};

/// Upper bound (inclusive) of a qualifying token transfer quantity
pub const MAX_CLAIM_QUANTITY: f64 = 69.0;

/// ErrCode label of a failed native transfer
pub const REVERTED_ERR_CODE: &str = "Reverted";

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EligibilityRule {
    /// `0 < amount <= max`
    QuantityRange { max: f64 },

    /// `amount > 0` and the transaction did not revert
    Successful,
}

impl EligibilityRule {
    /// Rule for token-ledger drops
    pub fn token_drop() -> Self {
        EligibilityRule::QuantityRange {
            max: MAX_CLAIM_QUANTITY,
        }
    }

    /// Check whether a row qualifies. Rows without an amount never do.
    pub fn matches(&self, row: &TransferRow) -> bool {
        let Some(amount) = row.amount else {
            return false;
        };
        match self {
            EligibilityRule::QuantityRange { max } => amount > 0.0 && amount <= *max,
            EligibilityRule::Successful => amount > 0.0 && row.err_code != REVERTED_ERR_CODE,
        }
    }
}

// ============================================================================
// ADDRESS COLUMNS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressColumns {
    /// Sender and recipient both earn a claim
    FromAndTo,

    /// Only the sender; the recipient is the drop contract itself
    FromOnly,
}

impl AddressColumns {
    /// Contributing addresses of a row; blank cells contribute nothing
    pub fn extract<'a>(&self, row: &'a TransferRow) -> Vec<&'a str> {
        let candidates = match self {
            AddressColumns::FromAndTo => vec![row.from.as_str(), row.to.as_str()],
            AddressColumns::FromOnly => vec![row.from.as_str()],
        };
        candidates.into_iter().filter(|a| !a.trim().is_empty()).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
