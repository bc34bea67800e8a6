//! Enumerable keyed account store.
//!
//! Lookup by [`AccountKey`] is O(1) and iteration follows insertion order.
//! Removal shifts later entries down so the order of the survivors is kept.

use indexmap::map::Entry;
use indexmap::IndexMap;

use ledgerd_common::AccountKey;

use crate::account::Account;

/// Accounts indexed by key, enumerable in insertion order.
#[derive(Debug, Clone, Default)]
pub struct AccountStore {
    accounts: IndexMap<AccountKey, Account>,
}

impl AccountStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an account under its own key.
    ///
    /// Returns the account back if the key is already taken; the existing
    /// entry is left untouched.
    pub fn insert(&mut self, account: Account) -> Result<(), Account> {
        match self.accounts.entry(account.key()) {
            Entry::Occupied(_) => Err(account),
            Entry::Vacant(slot) => {
                slot.insert(account);
                Ok(())
            }
        }
    }

    pub fn contains(&self, key: &AccountKey) -> bool {
        self.accounts.contains_key(key)
    }

    pub fn get(&self, key: &AccountKey) -> Option<&Account> {
        self.accounts.get(key)
    }

    pub fn get_mut(&mut self, key: &AccountKey) -> Option<&mut Account> {
        self.accounts.get_mut(key)
    }

    /// Remove an account from both the index and the enumeration order.
    pub fn remove(&mut self, key: &AccountKey) -> Option<Account> {
        self.accounts.shift_remove(key)
    }

    /// Iterate accounts in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Account> + DoubleEndedIterator + '_ {
        self.accounts.values()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
