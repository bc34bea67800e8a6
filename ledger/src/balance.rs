//! Balance views returned by ledger operations.

use ledgerd_common::Amount;
use serde::{Deserialize, Serialize};

/// Balance of an account right after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Total funds credited and not yet refunded.
    pub balance: Amount,
    /// Funds reserved by unprocessed refund requests.
    pub pending_refund: Amount,
}

impl AccountBalance {
    /// Funds that a new refund request may still reserve.
    pub fn available(&self) -> Amount {
        self.balance
            .checked_sub(self.pending_refund)
            .unwrap_or(Amount::ZERO)
    }

    /// Check if a refund of `amount` can be requested.
    pub fn can_reserve(&self, amount: Amount) -> bool {
        self.available() >= amount
    }
}

/// Result of processing a batch of refunds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundSettlement {
    /// Sum of the amounts paid out by the batch.
    pub total_amount: Amount,
    /// Account balance after the batch.
    pub balance: Amount,
    /// Pending refund total after the batch.
    pub pending_refund: Amount,
}

impl RefundSettlement {
    /// Balance view after the batch.
    pub fn account_balance(&self) -> AccountBalance {
        AccountBalance {
            balance: self.balance,
            pending_refund: self.pending_refund,
        }
    }
}
