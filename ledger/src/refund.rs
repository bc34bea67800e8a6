//! Refund records.

use std::time::Duration;

use ledgerd_common::{unlock_time, Amount, Timestamp};
use serde::{Deserialize, Serialize};

/// A request to withdraw funds from an account after a lock period.
///
/// Only `processed` ever changes after creation, and only from false to true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    /// Position in the owning account's refund sequence.
    pub index: u64,
    /// Amount requested.
    pub amount: Amount,
    /// When the refund was requested.
    pub created_at: Timestamp,
    /// Whether the refund has been paid out.
    pub processed: bool,
}

impl Refund {
    /// Create a new unprocessed refund.
    pub fn new(index: u64, amount: Amount, created_at: Timestamp) -> Self {
        Self {
            index,
            amount,
            created_at,
            processed: false,
        }
    }

    /// Time at which the refund unlocks under `lock`.
    pub fn unlock_at(&self, lock: Duration) -> Option<Timestamp> {
        unlock_time(self.created_at, lock)
    }

    /// Check if the lock period has elapsed at `now`.
    ///
    /// An unrepresentable unlock time never elapses.
    pub fn is_unlocked(&self, now: Timestamp, lock: Duration) -> bool {
        self.unlock_at(lock).map_or(false, |unlock_at| now >= unlock_at)
    }

    /// Check if the refund still reserves funds.
    pub fn is_pending(&self) -> bool {
        !self.processed
    }
}
