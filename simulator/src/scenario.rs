//! Simulation scenarios.

use std::path::Path;

use serde::{Deserialize, Serialize};

use ledgerd_common::{AccountKey, Amount, SignerKey};
use ledgerd_protocol::{ErrorCode, LedgerRequest};

/// A simulation scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Steps in the scenario.
    pub steps: Vec<ScenarioStep>,
}

/// A step in a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScenarioStep {
    /// Advance the simulated clock.
    Wait { seconds: u64 },
    /// Send a request and require the given outcome.
    Send {
        request: LedgerRequest,
        expect: Expectation,
    },
    /// Assert a condition on ledger state.
    Assert { condition: AssertCondition },
}

/// Expected outcome of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expectation {
    /// Any outcome is accepted.
    Any,
    /// The request succeeds.
    Success,
    /// The request fails with this code.
    Failure(ErrorCode),
}

/// Conditions that can be asserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AssertCondition {
    /// Account balance and pending refund equal.
    BalanceEquals {
        key: AccountKey,
        balance: Amount,
        pending_refund: Amount,
    },
    /// Enumeration yields exactly these keys in this order.
    AccountOrder { keys: Vec<AccountKey> },
    /// Refund processed flag equals.
    RefundProcessed {
        key: AccountKey,
        index: u64,
        processed: bool,
    },
}

fn signer() -> SignerKey {
    SignerKey::new([0x11; 32], [0x22; 32])
}

fn create(key: &AccountKey, amount: u128) -> ScenarioStep {
    ScenarioStep::Send {
        request: LedgerRequest::Create {
            key: key.clone(),
            signer: signer(),
            initial_amount: Amount::new(amount),
            additional_info: format!("{} via simulator", key.provider),
        },
        expect: Expectation::Success,
    }
}

fn request_refund(key: &AccountKey, amount: u128, expect: Expectation) -> ScenarioStep {
    ScenarioStep::Send {
        request: LedgerRequest::RequestRefund {
            key: key.clone(),
            amount: Amount::new(amount),
        },
        expect,
    }
}

fn process(key: &AccountKey, indices: Vec<u64>, expect: Expectation) -> ScenarioStep {
    ScenarioStep::Send {
        request: LedgerRequest::ProcessRefunds {
            key: key.clone(),
            indices,
            lock_duration_secs: None,
        },
        expect,
    }
}

fn balance(key: &AccountKey, balance: u128, pending_refund: u128) -> ScenarioStep {
    ScenarioStep::Assert {
        condition: AssertCondition::BalanceEquals {
            key: key.clone(),
            balance: Amount::new(balance),
            pending_refund: Amount::new(pending_refund),
        },
    }
}

impl Scenario {
    /// Names of the built-in scenarios.
    pub const BUILT_IN: [&'static str; 3] = ["refund-lifecycle", "enumeration", "batch-atomicity"];

    /// Load a built-in scenario by name.
    pub fn load(name: &str, lock_secs: u64) -> anyhow::Result<Self> {
        match name {
            "refund-lifecycle" => Ok(Self::refund_lifecycle(lock_secs)),
            "enumeration" => Ok(Self::enumeration()),
            "batch-atomicity" => Ok(Self::batch_atomicity(lock_secs)),
            _ => Err(anyhow::anyhow!("Unknown scenario: {}", name)),
        }
    }

    /// Load a scenario from a JSON file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Deposit, reserve, wait out the lock and pay out.
    fn refund_lifecycle(lock_secs: u64) -> Self {
        let key = AccountKey::new("alice", "provider-1");
        Self {
            name: "refund-lifecycle".to_string(),
            description: "Single refund from request to payout".to_string(),
            steps: vec![
                create(&key, 100),
                request_refund(&key, 40, Expectation::Success),
                balance(&key, 100, 40),
                request_refund(
                    &key,
                    70,
                    Expectation::Failure(ErrorCode::InsufficientBalance),
                ),
                process(&key, vec![0], Expectation::Failure(ErrorCode::RefundLocked)),
                ScenarioStep::Wait { seconds: lock_secs },
                process(&key, vec![0], Expectation::Success),
                balance(&key, 60, 0),
                process(&key, vec![0], Expectation::Failure(ErrorCode::RefundProcessed)),
            ],
        }
    }

    /// Creation order survives deletion.
    fn enumeration() -> Self {
        let a = AccountKey::new("alice", "provider-1");
        let b = AccountKey::new("bob", "provider-1");
        let c = AccountKey::new("carol", "provider-2");
        Self {
            name: "enumeration".to_string(),
            description: "Insertion-ordered listing across deletes".to_string(),
            steps: vec![
                create(&a, 10),
                create(&b, 20),
                create(&c, 30),
                ScenarioStep::Assert {
                    condition: AssertCondition::AccountOrder {
                        keys: vec![a.clone(), b.clone(), c.clone()],
                    },
                },
                ScenarioStep::Send {
                    request: LedgerRequest::Delete { key: a.clone() },
                    expect: Expectation::Success,
                },
                ScenarioStep::Send {
                    request: LedgerRequest::Get { key: a.clone() },
                    expect: Expectation::Failure(ErrorCode::AccountNotExists),
                },
                ScenarioStep::Assert {
                    condition: AssertCondition::AccountOrder {
                        keys: vec![b.clone(), c.clone()],
                    },
                },
                create(&a, 10),
                ScenarioStep::Assert {
                    condition: AssertCondition::AccountOrder { keys: vec![b, c, a] },
                },
            ],
        }
    }

    /// One bad index leaves the whole batch unapplied.
    fn batch_atomicity(lock_secs: u64) -> Self {
        let key = AccountKey::new("alice", "provider-1");
        Self {
            name: "batch-atomicity".to_string(),
            description: "All-or-nothing refund batches".to_string(),
            steps: vec![
                create(&key, 100),
                request_refund(&key, 10, Expectation::Success),
                request_refund(&key, 20, Expectation::Success),
                request_refund(&key, 30, Expectation::Success),
                ScenarioStep::Wait { seconds: lock_secs },
                process(&key, vec![0, 1, 9], Expectation::Failure(ErrorCode::RefundInvalid)),
                balance(&key, 100, 60),
                ScenarioStep::Assert {
                    condition: AssertCondition::RefundProcessed {
                        key: key.clone(),
                        index: 0,
                        processed: false,
                    },
                },
                process(&key, vec![2, 0], Expectation::Success),
                balance(&key, 60, 20),
                process(&key, vec![1, 1], Expectation::Failure(ErrorCode::RefundProcessed)),
                balance(&key, 60, 20),
            ],
        }
    }
}
