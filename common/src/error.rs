//! Error types for ledger operations.

use std::time::Duration;

use crate::{AccountKey, Amount, DeliverableId, Timestamp};
use thiserror::Error;

/// Main error type for ledger operations.
///
/// Every variant is reported at the point of detection, before any state
/// has been mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// No account exists for the key.
    #[error("Account does not exist: {0}")]
    AccountNotExists(AccountKey),

    /// An account already exists for the key.
    #[error("Account already exists: {0}")]
    AccountExists(AccountKey),

    /// Refund request exceeds balance minus pending refunds.
    #[error("Insufficient balance for {key}: requested {requested}, available {available}")]
    InsufficientBalance {
        key: AccountKey,
        requested: Amount,
        available: Amount,
    },

    /// Refund index is out of range.
    #[error("Invalid refund index {index} for {key} ({count} refunds)")]
    RefundInvalid {
        key: AccountKey,
        index: u64,
        count: u64,
    },

    /// Refund was already processed.
    #[error("Refund {index} for {key} already processed")]
    RefundProcessed { key: AccountKey, index: u64 },

    /// Refund lock period has not elapsed.
    #[error("Refund {index} for {key} locked until {unlock_at}")]
    RefundLocked {
        key: AccountKey,
        index: u64,
        unlock_at: Timestamp,
    },

    /// Deliverable ID already present on the account.
    #[error("Deliverable {id} already registered for {key}")]
    DuplicateDeliverable { key: AccountKey, id: DeliverableId },

    /// Overflow or underflow that would break the balance invariants.
    #[error("Arithmetic violation in {operation} for {key}")]
    ArithmeticViolation {
        key: AccountKey,
        operation: &'static str,
    },

    /// Refund batch exceeds the configured maximum.
    #[error("Refund batch of {size} exceeds maximum of {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// Requested refund lock exceeds the configured maximum.
    #[error("Refund lock of {requested:?} exceeds maximum of {max:?}")]
    LockTooLong { requested: Duration, max: Duration },
}

impl LedgerError {
    /// Check if this error may succeed when retried later.
    ///
    /// Only a locked refund becomes valid with the passage of time.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::RefundLocked { .. })
    }

    /// Earliest time a retry can succeed.
    pub fn retry_at(&self) -> Option<Timestamp> {
        match self {
            LedgerError::RefundLocked { unlock_at, .. } => Some(*unlock_at),
            _ => None,
        }
    }

    /// Check if this error indicates a broken internal invariant rather than
    /// a rejected request.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, LedgerError::ArithmeticViolation { .. })
    }

    /// Get the account key this error refers to, if any.
    pub fn account_key(&self) -> Option<&AccountKey> {
        match self {
            LedgerError::AccountNotExists(key) | LedgerError::AccountExists(key) => Some(key),
            LedgerError::InsufficientBalance { key, .. }
            | LedgerError::RefundInvalid { key, .. }
            | LedgerError::RefundProcessed { key, .. }
            | LedgerError::RefundLocked { key, .. }
            | LedgerError::DuplicateDeliverable { key, .. }
            | LedgerError::ArithmeticViolation { key, .. } => Some(key),
            LedgerError::BatchTooLarge { .. } | LedgerError::LockTooLong { .. } => None,
        }
    }

    /// Get error code for protocol messages.
    pub fn error_code(&self) -> &'static str {
        match self {
            LedgerError::AccountNotExists(_) => "ACCOUNT_NOT_EXISTS",
            LedgerError::AccountExists(_) => "ACCOUNT_EXISTS",
            LedgerError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            LedgerError::RefundInvalid { .. } => "REFUND_INVALID",
            LedgerError::RefundProcessed { .. } => "REFUND_PROCESSED",
            LedgerError::RefundLocked { .. } => "REFUND_LOCKED",
            LedgerError::DuplicateDeliverable { .. } => "DUPLICATE_DELIVERABLE",
            LedgerError::ArithmeticViolation { .. } => "ARITHMETIC_VIOLATION",
            LedgerError::BatchTooLarge { .. } => "BATCH_TOO_LARGE",
            LedgerError::LockTooLong { .. } => "LOCK_TOO_LONG",
        }
    }
}

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
