//! Ledgerd Ledger Engine
//!
//! Per-(user, provider) accounts with balances, time-locked refunds and
//! delivery records, kept in an enumerable store.

pub mod engine;
pub mod account;
pub mod balance;
pub mod refund;
pub mod deliverable;
pub mod store;
pub mod journal;
pub mod config;
pub mod shared;

#[cfg(test)]
mod properties;

pub use engine::Ledger;
pub use account::{Account, IntegrityError};
pub use balance::{AccountBalance, RefundSettlement};
pub use refund::Refund;
pub use deliverable::Deliverable;
pub use store::AccountStore;
pub use journal::{EventKind, Journal, LedgerEvent};
pub use config::LedgerConfig;
pub use shared::SharedLedger;
