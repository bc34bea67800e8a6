//! Thread-safe handle to a ledger.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use ledgerd_common::{AccountKey, Amount, Result, SignerKey};

use crate::account::{Account, IntegrityError};
use crate::balance::{AccountBalance, RefundSettlement};
use crate::deliverable::Deliverable;
use crate::engine::Ledger;
use crate::journal::LedgerEvent;

/// Shared ledger handle.
///
/// Writers hold the lock exclusively for the whole operation, so a refund
/// batch is never observed half applied. Readers share the lock.
#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl SharedLedger {
    /// Wrap a ledger.
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    /// Run `f` under the shared read lock.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run `f` under the exclusive write lock.
    pub fn write<R>(&self, f: impl FnOnce(&mut Ledger) -> R) -> R {
        f(&mut self.inner.write())
    }

    pub fn create(
        &self,
        key: &AccountKey,
        signer: SignerKey,
        initial_amount: Amount,
        additional_info: impl Into<String>,
    ) -> Result<AccountBalance> {
        self.write(|l| l.create(key, signer, initial_amount, additional_info))
    }

    /// Copy of one account.
    pub fn get(&self, key: &AccountKey) -> Result<Account> {
        self.read(|l| l.get(key).cloned())
    }

    pub fn exists(&self, key: &AccountKey) -> bool {
        self.read(|l| l.exists(key))
    }

    /// Point-in-time copy of every account in creation order.
    pub fn list_all(&self) -> Vec<Account> {
        self.read(|l| l.list_all().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.read(|l| l.len())
    }

    pub fn is_empty(&self) -> bool {
        self.read(|l| l.is_empty())
    }

    pub fn delete(&self, key: &AccountKey) -> Result<Account> {
        self.write(|l| l.delete(key))
    }

    pub fn deposit(&self, key: &AccountKey, amount: Amount) -> Result<AccountBalance> {
        self.write(|l| l.deposit(key, amount))
    }

    pub fn request_refund(&self, key: &AccountKey, amount: Amount) -> Result<u64> {
        self.write(|l| l.request_refund(key, amount))
    }

    pub fn process_refunds(
        &self,
        key: &AccountKey,
        indices: &[u64],
        lock_duration: Duration,
    ) -> Result<RefundSettlement> {
        self.write(|l| l.process_refunds(key, indices, lock_duration))
    }

    pub fn process_refunds_default(
        &self,
        key: &AccountKey,
        indices: &[u64],
    ) -> Result<RefundSettlement> {
        self.write(|l| l.process_refunds_default(key, indices))
    }

    pub fn update_acknowledge(&self, key: &AccountKey, acknowledge: impl Into<String>) -> Result<()> {
        self.write(|l| l.update_acknowledge(key, acknowledge))
    }

    pub fn add_deliverable(&self, key: &AccountKey, deliverable: Deliverable) -> Result<()> {
        self.write(|l| l.add_deliverable(key, deliverable))
    }

    /// Copy of the retained journal events after `sequence`.
    pub fn events_since(&self, sequence: u64) -> Vec<LedgerEvent> {
        self.read(|l| l.events_since(sequence).cloned().collect())
    }

    pub fn verify_integrity(&self) -> std::result::Result<(), IntegrityError> {
        self.read(|l| l.verify_integrity())
    }
}

impl From<Ledger> for SharedLedger {
    fn from(ledger: Ledger) -> Self {
        Self::new(ledger)
    }
}
