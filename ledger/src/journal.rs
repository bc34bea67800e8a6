//! Audit journal of ledger mutations.

use std::collections::VecDeque;

use ledgerd_common::{AccountKey, Amount, DeliverableId, Timestamp};
use serde::{Deserialize, Serialize};

/// What a recorded mutation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    AccountCreated { initial_amount: Amount },
    AccountDeleted,
    Deposited { amount: Amount, balance: Amount },
    RefundRequested { index: u64, amount: Amount },
    RefundsProcessed { indices: Vec<u64>, total_amount: Amount },
    AcknowledgeUpdated,
    DeliverableAdded { id: DeliverableId },
}

/// A single successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Sequence number, starting at 1 and never reused.
    pub sequence: u64,
    /// Account affected.
    pub key: AccountKey,
    /// The mutation.
    pub kind: EventKind,
    /// Clock time when the mutation was applied.
    pub recorded_at: Timestamp,
}

/// Bounded in-memory event log. The oldest events are dropped first.
#[derive(Debug, Clone)]
pub struct Journal {
    events: VecDeque<LedgerEvent>,
    capacity: usize,
    last_sequence: u64,
}

impl Journal {
    /// Create a journal keeping at most `capacity` events. Zero disables
    /// retention, but sequence numbers still advance.
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            last_sequence: 0,
        }
    }

    /// Append an event and return its sequence number.
    pub fn record(&mut self, key: AccountKey, kind: EventKind, recorded_at: Timestamp) -> u64 {
        self.last_sequence += 1;
        if self.capacity == 0 {
            return self.last_sequence;
        }

        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(LedgerEvent {
            sequence: self.last_sequence,
            key,
            kind,
            recorded_at,
        });
        self.last_sequence
    }

    /// Iterate retained events, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &LedgerEvent> + '_ {
        self.events.iter()
    }

    /// Iterate retained events with a sequence number greater than `sequence`.
    pub fn since(&self, sequence: u64) -> impl Iterator<Item = &LedgerEvent> + '_ {
        self.events.iter().filter(move |e| e.sequence > sequence)
    }

    /// Sequence number of the most recent event, 0 if none.
    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
