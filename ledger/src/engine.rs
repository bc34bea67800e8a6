//! Core ledger engine implementation.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use ledgerd_common::{
    AccountKey, Amount, Clock, ProviderId, Result, LedgerError, SignerKey, SystemClock, UserId,
};

use crate::account::{Account, IntegrityError};
use crate::balance::{AccountBalance, RefundSettlement};
use crate::config::LedgerConfig;
use crate::deliverable::Deliverable;
use crate::journal::{EventKind, Journal, LedgerEvent};
use crate::refund::Refund;
use crate::store::AccountStore;

/// Log a rejected operation and hand the error back.
fn reject(err: LedgerError) -> LedgerError {
    if err.is_invariant_violation() {
        error!(code = err.error_code(), error = %err, "Ledger invariant violation");
    } else {
        warn!(code = err.error_code(), error = %err, "Ledger operation rejected");
    }
    err
}

fn arithmetic(key: &AccountKey, operation: &'static str) -> LedgerError {
    reject(LedgerError::ArithmeticViolation {
        key: key.clone(),
        operation,
    })
}

/// The ledger owns every account and applies all transitions on them.
///
/// Each operation validates completely before it mutates, so a failed call
/// leaves the ledger exactly as it found it.
pub struct Ledger {
    store: AccountStore,
    journal: Journal,
    clock: Arc<dyn Clock>,
    config: LedgerConfig,
}

impl Ledger {
    /// Create a new ledger reading time from `clock`.
    pub fn new(config: LedgerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: AccountStore::new(),
            journal: Journal::new(config.journal_capacity),
            clock,
            config,
        }
    }

    /// Create a new ledger on the system clock.
    pub fn with_config(config: LedgerConfig) -> Self {
        Self::new(config, Arc::new(SystemClock))
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn account_mut(&mut self, key: &AccountKey) -> Result<&mut Account> {
        self.store
            .get_mut(key)
            .ok_or_else(|| reject(LedgerError::AccountNotExists(key.clone())))
    }

    /// Open an account for `key`.
    #[instrument(skip(self, signer, additional_info), fields(key = %key))]
    pub fn create(
        &mut self,
        key: &AccountKey,
        signer: SignerKey,
        initial_amount: Amount,
        additional_info: impl Into<String>,
    ) -> Result<AccountBalance> {
        if self.store.contains(key) {
            return Err(reject(LedgerError::AccountExists(key.clone())));
        }

        let now = self.clock.now();
        let account = Account::new(key.clone(), signer, initial_amount, additional_info, now);
        let balance = account.account_balance();
        if self.store.insert(account).is_err() {
            return Err(reject(LedgerError::AccountExists(key.clone())));
        }

        self.journal
            .record(key.clone(), EventKind::AccountCreated { initial_amount }, now);

        info!(
            user = %key.user,
            provider = %key.provider,
            initial_amount = %initial_amount,
            "Account created"
        );

        Ok(balance)
    }

    /// Get an account.
    pub fn get(&self, key: &AccountKey) -> Result<&Account> {
        debug!(key = %key, "Account lookup");
        self.store
            .get(key)
            .ok_or_else(|| LedgerError::AccountNotExists(key.clone()))
    }

    /// Check if an account exists.
    pub fn exists(&self, key: &AccountKey) -> bool {
        self.store.contains(key)
    }

    /// Iterate all accounts in creation order.
    ///
    /// Each call starts a fresh pass over the current set of accounts.
    pub fn list_all(&self) -> impl ExactSizeIterator<Item = &Account> + '_ {
        self.store.iter()
    }

    /// Iterate the accounts of one user in creation order.
    pub fn accounts_by_user<'a>(
        &'a self,
        user: &'a UserId,
    ) -> impl Iterator<Item = &'a Account> + 'a {
        self.store.iter().filter(move |a| &a.user == user)
    }

    /// Iterate the accounts held with one provider in creation order.
    pub fn accounts_by_provider<'a>(
        &'a self,
        provider: &'a ProviderId,
    ) -> impl Iterator<Item = &'a Account> + 'a {
        self.store.iter().filter(move |a| &a.provider == provider)
    }

    /// Number of accounts.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Remove an account. Returns the removed record.
    #[instrument(skip(self), fields(key = %key))]
    pub fn delete(&mut self, key: &AccountKey) -> Result<Account> {
        let account = self
            .store
            .remove(key)
            .ok_or_else(|| reject(LedgerError::AccountNotExists(key.clone())))?;

        let now = self.clock.now();
        self.journal.record(key.clone(), EventKind::AccountDeleted, now);

        info!(
            user = %key.user,
            provider = %key.provider,
            balance = %account.balance,
            "Account deleted"
        );

        Ok(account)
    }

    /// Credit an account.
    #[instrument(skip(self), fields(key = %key))]
    pub fn deposit(&mut self, key: &AccountKey, amount: Amount) -> Result<AccountBalance> {
        let now = self.clock.now();
        let account = self.account_mut(key)?;

        let balance = account
            .balance
            .checked_add(amount)
            .ok_or_else(|| arithmetic(key, "deposit"))?;
        account.balance = balance;
        let result = account.account_balance();

        self.journal
            .record(key.clone(), EventKind::Deposited { amount, balance }, now);

        info!(
            user = %key.user,
            provider = %key.provider,
            amount = %amount,
            balance = %balance,
            "Deposit applied"
        );

        Ok(result)
    }

    /// Reserve `amount` for withdrawal. Returns the new refund's index.
    #[instrument(skip(self), fields(key = %key))]
    pub fn request_refund(&mut self, key: &AccountKey, amount: Amount) -> Result<u64> {
        let now = self.clock.now();
        let account = self.account_mut(key)?;

        let view = account.account_balance();
        if !view.can_reserve(amount) {
            return Err(reject(LedgerError::InsufficientBalance {
                key: key.clone(),
                requested: amount,
                available: view.available(),
            }));
        }

        let pending_refund = account
            .pending_refund
            .checked_add(amount)
            .ok_or_else(|| arithmetic(key, "request_refund"))?;

        let index = account.next_refund_index();
        account.refunds.push(Refund::new(index, amount, now));
        account.pending_refund = pending_refund;

        self.journal
            .record(key.clone(), EventKind::RefundRequested { index, amount }, now);

        info!(
            user = %key.user,
            provider = %key.provider,
            index,
            amount = %amount,
            pending_refund = %pending_refund,
            "Refund requested"
        );

        Ok(index)
    }

    /// Pay out a batch of refunds whose lock has elapsed.
    ///
    /// The whole batch is checked before anything is applied: either every
    /// listed refund is processed or none is. An index listed twice is
    /// rejected as already processed.
    #[instrument(skip(self, indices), fields(key = %key, batch = indices.len()))]
    pub fn process_refunds(
        &mut self,
        key: &AccountKey,
        indices: &[u64],
        lock_duration: Duration,
    ) -> Result<RefundSettlement> {
        let max = self.config.max_batch_size;
        if indices.len() > max {
            return Err(reject(LedgerError::BatchTooLarge {
                size: indices.len(),
                max,
            }));
        }

        let max_lock = self.config.max_lock_duration;
        if lock_duration > max_lock {
            return Err(reject(LedgerError::LockTooLong {
                requested: lock_duration,
                max: max_lock,
            }));
        }

        let now = self.clock.now();
        let account = self.account_mut(key)?;

        let count = account.next_refund_index();
        let mut seen = HashSet::with_capacity(indices.len());
        let mut total_amount = Amount::ZERO;

        for &index in indices {
            let refund = account.refund(index).ok_or_else(|| {
                reject(LedgerError::RefundInvalid {
                    key: key.clone(),
                    index,
                    count,
                })
            })?;

            if refund.processed || !seen.insert(index) {
                return Err(reject(LedgerError::RefundProcessed {
                    key: key.clone(),
                    index,
                }));
            }

            if !refund.is_unlocked(now, lock_duration) {
                let unlock_at = refund
                    .unlock_at(lock_duration)
                    .ok_or_else(|| arithmetic(key, "process_refunds"))?;
                return Err(reject(LedgerError::RefundLocked {
                    key: key.clone(),
                    index,
                    unlock_at,
                }));
            }

            total_amount = total_amount
                .checked_add(refund.amount)
                .ok_or_else(|| arithmetic(key, "process_refunds"))?;
        }

        let balance = account
            .balance
            .checked_sub(total_amount)
            .ok_or_else(|| arithmetic(key, "process_refunds"))?;
        let pending_refund = account
            .pending_refund
            .checked_sub(total_amount)
            .ok_or_else(|| arithmetic(key, "process_refunds"))?;

        for refund in account.refunds.iter_mut() {
            if seen.contains(&refund.index) {
                refund.processed = true;
            }
        }
        account.balance = balance;
        account.pending_refund = pending_refund;

        self.journal.record(
            key.clone(),
            EventKind::RefundsProcessed {
                indices: indices.to_vec(),
                total_amount,
            },
            now,
        );

        info!(
            user = %key.user,
            provider = %key.provider,
            refunds = indices.len(),
            total_amount = %total_amount,
            balance = %balance,
            pending_refund = %pending_refund,
            "Refunds processed"
        );

        Ok(RefundSettlement {
            total_amount,
            balance,
            pending_refund,
        })
    }

    /// [`Ledger::process_refunds`] with the configured default lock.
    pub fn process_refunds_default(
        &mut self,
        key: &AccountKey,
        indices: &[u64],
    ) -> Result<RefundSettlement> {
        let lock = self.config.default_lock_duration;
        self.process_refunds(key, indices, lock)
    }

    /// Get a refund record.
    pub fn get_refund(&self, key: &AccountKey, index: u64) -> Result<&Refund> {
        let account = self.get(key)?;
        account.refund(index).ok_or_else(|| LedgerError::RefundInvalid {
            key: key.clone(),
            index,
            count: account.next_refund_index(),
        })
    }

    /// Replace the provider acknowledgment.
    #[instrument(skip(self, acknowledge), fields(key = %key))]
    pub fn update_acknowledge(
        &mut self,
        key: &AccountKey,
        acknowledge: impl Into<String>,
    ) -> Result<()> {
        let now = self.clock.now();
        let account = self.account_mut(key)?;
        account.acknowledge = acknowledge.into();

        self.journal
            .record(key.clone(), EventKind::AcknowledgeUpdated, now);

        info!(user = %key.user, provider = %key.provider, "Acknowledge updated");
        Ok(())
    }

    /// Attach a deliverable to an account.
    #[instrument(skip(self, deliverable), fields(key = %key, id = %deliverable.id))]
    pub fn add_deliverable(&mut self, key: &AccountKey, deliverable: Deliverable) -> Result<()> {
        let now = self.clock.now();
        let account = self.account_mut(key)?;

        if account.has_deliverable(&deliverable.id) {
            return Err(reject(LedgerError::DuplicateDeliverable {
                key: key.clone(),
                id: deliverable.id,
            }));
        }

        let id = deliverable.id;
        account.deliverables.push(deliverable);

        self.journal
            .record(key.clone(), EventKind::DeliverableAdded { id }, now);

        info!(
            user = %key.user,
            provider = %key.provider,
            deliverable = %id,
            "Deliverable added"
        );
        Ok(())
    }

    /// Retained journal events, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &LedgerEvent> + '_ {
        self.journal.events()
    }

    /// Retained journal events after `sequence`.
    pub fn events_since(&self, sequence: u64) -> impl Iterator<Item = &LedgerEvent> + '_ {
        self.journal.since(sequence)
    }

    /// Sequence number of the latest mutation.
    pub fn last_sequence(&self) -> u64 {
        self.journal.last_sequence()
    }

    /// Verify the invariants of every account.
    pub fn verify_integrity(&self) -> std::result::Result<(), IntegrityError> {
        for account in self.store.iter() {
            account.check_invariants()?;
        }

        debug!(accounts = self.store.len(), "Ledger integrity verified");
        Ok(())
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::with_config(LedgerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ledgerd_common::{DeliverableId, ManualClock};

    const LOCK: Duration = Duration::from_secs(3600);

    fn setup() -> (Ledger, Arc<ManualClock>) {
        let start = chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let ledger = Ledger::new(LedgerConfig::default(), clock.clone());
        (ledger, clock)
    }

    fn signer() -> SignerKey {
        SignerKey::new([7u8; 32], [9u8; 32])
    }

    fn open(ledger: &mut Ledger, user: &str, provider: &str, amount: u128) -> AccountKey {
        let key = AccountKey::new(user, provider);
        ledger
            .create(&key, signer(), Amount::new(amount), "info")
            .unwrap();
        key
    }

    #[test]
    fn test_create_and_get() {
        let (mut ledger, _) = setup();
        let key = AccountKey::new("alice", "p1");

        let balance = ledger.create(&key, signer(), Amount::new(100), "info").unwrap();
        assert_eq!(balance.balance, Amount::new(100));
        assert_eq!(balance.pending_refund, Amount::ZERO);

        let account = ledger.get(&key).unwrap();
        assert_eq!(account.signer, signer());
        assert_eq!(account.additional_info, "info");
        assert!(ledger.exists(&key));
    }

    #[test]
    fn test_create_duplicate() {
        let (mut ledger, _) = setup();
        let key = open(&mut ledger, "alice", "p1", 100);

        let err = ledger.create(&key, signer(), Amount::new(5), "other").unwrap_err();
        assert_eq!(err, LedgerError::AccountExists(key.clone()));
        assert_eq!(ledger.get(&key).unwrap().balance, Amount::new(100));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_missing_account_errors() {
        let (mut ledger, _) = setup();
        let key = AccountKey::new("ghost", "p1");
        let missing = LedgerError::AccountNotExists(key.clone());

        assert_eq!(ledger.get(&key).unwrap_err(), missing);
        assert_eq!(ledger.delete(&key).unwrap_err(), missing);
        assert_eq!(ledger.deposit(&key, Amount::new(1)).unwrap_err(), missing);
        assert_eq!(ledger.request_refund(&key, Amount::new(1)).unwrap_err(), missing);
        assert_eq!(ledger.process_refunds(&key, &[], LOCK).unwrap_err(), missing);
        assert_eq!(ledger.update_acknowledge(&key, "ack").unwrap_err(), missing);
        assert_eq!(
            ledger
                .add_deliverable(&key, Deliverable::new(DeliverableId::from_label("d"), vec![1]))
                .unwrap_err(),
            missing
        );
    }

    #[test]
    fn test_refund_lifecycle() {
        let (mut ledger, clock) = setup();
        let key = open(&mut ledger, "alice", "p1", 100);

        assert_eq!(ledger.request_refund(&key, Amount::new(40)).unwrap(), 0);
        assert_eq!(ledger.get(&key).unwrap().pending_refund, Amount::new(40));

        let err = ledger.request_refund(&key, Amount::new(70)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                key: key.clone(),
                requested: Amount::new(70),
                available: Amount::new(60),
            }
        );

        clock.advance(LOCK);
        let settlement = ledger.process_refunds(&key, &[0], LOCK).unwrap();
        assert_eq!(settlement.total_amount, Amount::new(40));
        assert_eq!(settlement.balance, Amount::new(60));
        assert_eq!(settlement.pending_refund, Amount::ZERO);
        assert!(ledger.get_refund(&key, 0).unwrap().processed);
        assert!(ledger.verify_integrity().is_ok());
    }

    #[test]
    fn test_refund_locked_until_elapsed() {
        let (mut ledger, clock) = setup();
        let key = open(&mut ledger, "alice", "p1", 100);
        ledger.request_refund(&key, Amount::new(10)).unwrap();

        clock.advance(LOCK - Duration::from_secs(1));
        let err = ledger.process_refunds(&key, &[0], LOCK).unwrap_err();
        assert!(matches!(err, LedgerError::RefundLocked { index: 0, .. }));
        assert!(err.is_retryable());

        clock.advance(Duration::from_secs(1));
        assert!(ledger.process_refunds(&key, &[0], LOCK).is_ok());
    }

    #[test]
    fn test_refund_processed_twice() {
        let (mut ledger, _) = setup();
        let key = open(&mut ledger, "alice", "p1", 100);
        ledger.request_refund(&key, Amount::new(10)).unwrap();

        ledger.process_refunds(&key, &[0], Duration::ZERO).unwrap();
        let err = ledger.process_refunds(&key, &[0], Duration::ZERO).unwrap_err();
        assert_eq!(
            err,
            LedgerError::RefundProcessed {
                key: key.clone(),
                index: 0
            }
        );
    }

    #[test]
    fn test_duplicate_index_in_batch() {
        let (mut ledger, _) = setup();
        let key = open(&mut ledger, "alice", "p1", 100);
        ledger.request_refund(&key, Amount::new(10)).unwrap();

        let err = ledger.process_refunds(&key, &[0, 0], Duration::ZERO).unwrap_err();
        assert!(matches!(err, LedgerError::RefundProcessed { index: 0, .. }));
        assert!(!ledger.get_refund(&key, 0).unwrap().processed);
        assert_eq!(ledger.get(&key).unwrap().balance, Amount::new(100));
    }

    #[test]
    fn test_batch_is_atomic() {
        let (mut ledger, _) = setup();
        let key = open(&mut ledger, "alice", "p1", 100);
        for _ in 0..3 {
            ledger.request_refund(&key, Amount::new(10)).unwrap();
        }
        let before = ledger.get(&key).unwrap().clone();

        let err = ledger
            .process_refunds(&key, &[0, 1, 7, 2], Duration::ZERO)
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::RefundInvalid {
                key: key.clone(),
                index: 7,
                count: 3
            }
        );
        assert_eq!(ledger.get(&key).unwrap(), &before);
    }

    #[test]
    fn test_batch_rejected_when_one_refund_locked() {
        let (mut ledger, clock) = setup();
        let key = open(&mut ledger, "alice", "p1", 100);
        ledger.request_refund(&key, Amount::new(10)).unwrap();
        clock.advance(LOCK);
        ledger.request_refund(&key, Amount::new(20)).unwrap();
        let before = ledger.get(&key).unwrap().clone();

        let err = ledger.process_refunds(&key, &[0, 1], LOCK).unwrap_err();
        assert!(matches!(err, LedgerError::RefundLocked { index: 1, .. }));
        assert_eq!(ledger.get(&key).unwrap(), &before);

        let settlement = ledger.process_refunds(&key, &[0], LOCK).unwrap();
        assert_eq!(settlement.total_amount, Amount::new(10));
        assert_eq!(settlement.pending_refund, Amount::new(20));
    }

    #[test]
    fn test_empty_batch() {
        let (mut ledger, _) = setup();
        let key = open(&mut ledger, "alice", "p1", 100);

        let settlement = ledger.process_refunds(&key, &[], LOCK).unwrap();
        assert_eq!(settlement.total_amount, Amount::ZERO);
        assert_eq!(settlement.balance, Amount::new(100));
    }

    #[test]
    fn test_batch_too_large() {
        let start = chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let config = LedgerConfig {
            max_batch_size: 2,
            ..LedgerConfig::default()
        };
        let mut ledger = Ledger::new(config, Arc::new(ManualClock::new(start)));
        let key = open(&mut ledger, "alice", "p1", 100);

        let err = ledger.process_refunds(&key, &[0, 1, 2], LOCK).unwrap_err();
        assert_eq!(err, LedgerError::BatchTooLarge { size: 3, max: 2 });
    }

    #[test]
    fn test_lock_above_max_rejected() {
        let (mut ledger, _) = setup();
        let key = open(&mut ledger, "alice", "p1", 100);
        ledger.request_refund(&key, Amount::new(10)).unwrap();
        let max = ledger.config().max_lock_duration;

        let err = ledger
            .process_refunds(&key, &[0], Duration::from_secs(u64::MAX))
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::LockTooLong {
                requested: Duration::from_secs(u64::MAX),
                max,
            }
        );
        assert!(!err.is_invariant_violation());
        assert!(!err.is_retryable());
        assert_eq!(ledger.get(&key).unwrap().pending_refund, Amount::new(10));

        let err = ledger
            .process_refunds(&key, &[0], max + Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, LedgerError::LockTooLong { .. }));
        assert!(matches!(
            ledger.process_refunds(&key, &[0], max).unwrap_err(),
            LedgerError::RefundLocked { .. }
        ));
    }

    #[test]
    fn test_verify_integrity_detects_corruption() {
        let (mut ledger, _) = setup();
        let key = open(&mut ledger, "alice", "p1", 100);
        ledger.request_refund(&key, Amount::new(30)).unwrap();
        assert!(ledger.verify_integrity().is_ok());

        ledger.store.get_mut(&key).unwrap().pending_refund = Amount::new(20);
        assert!(matches!(
            ledger.verify_integrity(),
            Err(IntegrityError::PendingMismatch { .. })
        ));

        ledger.store.get_mut(&key).unwrap().pending_refund = Amount::new(300);
        assert!(matches!(
            ledger.verify_integrity(),
            Err(IntegrityError::BalanceBelowPending { .. })
        ));
    }

    #[test]
    fn test_refund_indices_never_reused() {
        let (mut ledger, _) = setup();
        let key = open(&mut ledger, "alice", "p1", 100);

        assert_eq!(ledger.request_refund(&key, Amount::new(1)).unwrap(), 0);
        assert_eq!(ledger.request_refund(&key, Amount::new(1)).unwrap(), 1);
        ledger.process_refunds(&key, &[0, 1], Duration::ZERO).unwrap();
        assert_eq!(ledger.request_refund(&key, Amount::new(1)).unwrap(), 2);
    }

    #[test]
    fn test_deposit_overflow() {
        let (mut ledger, _) = setup();
        let key = open(&mut ledger, "alice", "p1", u128::MAX);

        let err = ledger.deposit(&key, Amount::new(1)).unwrap_err();
        assert!(err.is_invariant_violation());
        assert_eq!(ledger.get(&key).unwrap().balance, Amount::MAX);
    }

    #[test]
    fn test_deposit_keeps_pending() {
        let (mut ledger, _) = setup();
        let key = open(&mut ledger, "alice", "p1", 100);
        ledger.request_refund(&key, Amount::new(30)).unwrap();

        let balance = ledger.deposit(&key, Amount::new(50)).unwrap();
        assert_eq!(balance.balance, Amount::new(150));
        assert_eq!(balance.pending_refund, Amount::new(30));
    }

    #[test]
    fn test_list_all_after_delete() {
        let (mut ledger, _) = setup();
        let a = open(&mut ledger, "a", "p", 1);
        let b = open(&mut ledger, "b", "p", 1);

        let keys: Vec<_> = ledger.list_all().map(|acc| acc.key()).collect();
        assert_eq!(keys, vec![a.clone(), b.clone()]);

        ledger.delete(&a).unwrap();
        let keys: Vec<_> = ledger.list_all().map(|acc| acc.key()).collect();
        assert_eq!(keys, vec![b]);
        assert_eq!(
            ledger.get(&a).unwrap_err(),
            LedgerError::AccountNotExists(a)
        );
    }

    #[test]
    fn test_filtered_views() {
        let (mut ledger, _) = setup();
        open(&mut ledger, "alice", "p1", 1);
        open(&mut ledger, "bob", "p1", 1);
        open(&mut ledger, "alice", "p2", 1);

        let alice = UserId::new("alice");
        let providers: Vec<_> = ledger
            .accounts_by_user(&alice)
            .map(|a| a.provider.as_str().to_string())
            .collect();
        assert_eq!(providers, vec!["p1", "p2"]);

        let p1 = ProviderId::new("p1");
        assert_eq!(ledger.accounts_by_provider(&p1).count(), 2);
    }

    #[test]
    fn test_acknowledge_last_write_wins() {
        let (mut ledger, _) = setup();
        let key = open(&mut ledger, "alice", "p1", 1);

        ledger.update_acknowledge(&key, "first").unwrap();
        ledger.update_acknowledge(&key, "second").unwrap();
        assert_eq!(ledger.get(&key).unwrap().acknowledge, "second");
    }

    #[test]
    fn test_duplicate_deliverable() {
        let (mut ledger, _) = setup();
        let key = open(&mut ledger, "alice", "p1", 1);
        let id = DeliverableId::from_label("model-1");

        ledger
            .add_deliverable(&key, Deliverable::new(id, vec![1, 2, 3]))
            .unwrap();
        let err = ledger
            .add_deliverable(&key, Deliverable::new(id, vec![4, 5, 6]))
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::DuplicateDeliverable {
                key: key.clone(),
                id
            }
        );
        let account = ledger.get(&key).unwrap();
        assert_eq!(account.deliverables.len(), 1);
        assert_eq!(account.deliverable(&id).unwrap().model_root_hash, vec![1, 2, 3]);
    }

    #[test]
    fn test_journal_records_mutations_only() {
        let (mut ledger, _) = setup();
        let key = open(&mut ledger, "alice", "p1", 100);
        ledger.deposit(&key, Amount::new(5)).unwrap();
        let _ = ledger.request_refund(&key, Amount::new(1_000));
        ledger.delete(&key).unwrap();

        let kinds: Vec<_> = ledger.events().map(|e| e.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::AccountCreated {
                    initial_amount: Amount::new(100)
                },
                EventKind::Deposited {
                    amount: Amount::new(5),
                    balance: Amount::new(105)
                },
                EventKind::AccountDeleted,
            ]
        );
        assert_eq!(ledger.events_since(2).count(), 1);
        assert_eq!(ledger.last_sequence(), 3);
    }
}
