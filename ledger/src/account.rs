//! Account definitions for the ledger.

use std::collections::HashSet;

use ledgerd_common::{
    checked_sum, AccountKey, Amount, DeliverableId, ProviderId, SignerKey, Timestamp, UserId,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::balance::AccountBalance;
use crate::deliverable::Deliverable;
use crate::refund::Refund;

/// A broken account invariant found by [`Account::check_invariants`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("{key}: balance {balance} below pending refund {pending_refund}")]
    BalanceBelowPending {
        key: AccountKey,
        balance: Amount,
        pending_refund: Amount,
    },

    #[error("{key}: pending refund {recorded} does not match unprocessed total {expected:?}")]
    PendingMismatch {
        key: AccountKey,
        recorded: Amount,
        expected: Option<Amount>,
    },

    #[error("{key}: refund at position {position} has index {index}")]
    RefundIndexGap {
        key: AccountKey,
        position: usize,
        index: u64,
    },

    #[error("{key}: deliverable {id} registered more than once")]
    DuplicateDeliverable { key: AccountKey, id: DeliverableId },
}

/// A ledger account for one (user, provider) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Owning user.
    pub user: UserId,
    /// Provider the account is held with.
    pub provider: ProviderId,
    /// Reserved counter; no operation reads or advances it.
    pub nonce: u64,
    /// Total funds credited and not yet refunded.
    pub balance: Amount,
    /// Funds reserved by unprocessed refunds.
    pub pending_refund: Amount,
    /// Provider signing credential.
    pub signer: SignerKey,
    /// Refund requests, indexed by position.
    pub refunds: Vec<Refund>,
    /// Free-form info set at creation.
    pub additional_info: String,
    /// Latest acknowledgment payload from the provider.
    pub acknowledge: String,
    /// Delivered artifacts, unique by id.
    pub deliverables: Vec<Deliverable>,
    /// When the account was created.
    pub created_at: Timestamp,
}

impl Account {
    /// Create a new account with no refunds or deliverables.
    pub fn new(
        key: AccountKey,
        signer: SignerKey,
        initial_amount: Amount,
        additional_info: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            user: key.user,
            provider: key.provider,
            nonce: 0,
            balance: initial_amount,
            pending_refund: Amount::ZERO,
            signer,
            refunds: Vec::new(),
            additional_info: additional_info.into(),
            acknowledge: String::new(),
            deliverables: Vec::new(),
            created_at,
        }
    }

    /// Get the composite key of this account.
    pub fn key(&self) -> AccountKey {
        AccountKey {
            user: self.user.clone(),
            provider: self.provider.clone(),
        }
    }

    /// Current balance view.
    pub fn account_balance(&self) -> AccountBalance {
        AccountBalance {
            balance: self.balance,
            pending_refund: self.pending_refund,
        }
    }

    /// Funds not reserved by pending refunds.
    pub fn available(&self) -> Amount {
        self.account_balance().available()
    }

    /// Get a refund by index.
    pub fn refund(&self, index: u64) -> Option<&Refund> {
        usize::try_from(index)
            .ok()
            .and_then(|position| self.refunds.get(position))
    }

    /// Index the next refund request will receive.
    pub fn next_refund_index(&self) -> u64 {
        self.refunds.len() as u64
    }

    /// Iterate unprocessed refunds in index order.
    pub fn pending_refunds(&self) -> impl Iterator<Item = &Refund> + '_ {
        self.refunds.iter().filter(|r| r.is_pending())
    }

    /// Get a deliverable by id.
    pub fn deliverable(&self, id: &DeliverableId) -> Option<&Deliverable> {
        self.deliverables.iter().find(|d| &d.id == id)
    }

    /// Check if a deliverable with this id is registered.
    pub fn has_deliverable(&self, id: &DeliverableId) -> bool {
        self.deliverable(id).is_some()
    }

    /// Verify the balance, refund and deliverable invariants of this account.
    pub fn check_invariants(&self) -> Result<(), IntegrityError> {
        if self.balance < self.pending_refund {
            return Err(IntegrityError::BalanceBelowPending {
                key: self.key(),
                balance: self.balance,
                pending_refund: self.pending_refund,
            });
        }

        let expected = checked_sum(self.pending_refunds().map(|r| &r.amount));
        if expected != Some(self.pending_refund) {
            return Err(IntegrityError::PendingMismatch {
                key: self.key(),
                recorded: self.pending_refund,
                expected,
            });
        }

        for (position, refund) in self.refunds.iter().enumerate() {
            if refund.index != position as u64 {
                return Err(IntegrityError::RefundIndexGap {
                    key: self.key(),
                    position,
                    index: refund.index,
                });
            }
        }

        let mut seen = HashSet::with_capacity(self.deliverables.len());
        for deliverable in &self.deliverables {
            if !seen.insert(deliverable.id) {
                return Err(IntegrityError::DuplicateDeliverable {
                    key: self.key(),
                    id: deliverable.id,
                });
            }
        }

        Ok(())
    }
}
