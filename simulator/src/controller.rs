//! Simulation controller.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail};
use chrono::TimeZone;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use ledgerd_common::{AccountKey, Amount, DeliverableId, ManualClock, SignerKey};
use ledgerd_ledger::{Deliverable, Ledger, LedgerConfig, SharedLedger};
use ledgerd_protocol::{dispatch, LedgerRequest, LedgerResponse, ResponsePayload};

use crate::metrics::SimulationMetrics;
use crate::scenario::{AssertCondition, Expectation, Scenario, ScenarioStep};

/// Drives requests against a ledger on a simulated clock.
pub struct SimulationController {
    /// Ledger under test.
    ledger: SharedLedger,
    /// Simulated time source shared with the ledger.
    clock: Arc<ManualClock>,
    /// Random number generator.
    rng: StdRng,
    /// Simulated users.
    users: usize,
    /// Simulated providers.
    providers: usize,
    /// Lock applied to refunds.
    lock: Duration,
    /// Simulation metrics.
    metrics: SimulationMetrics,
}

impl SimulationController {
    /// Create a new simulation controller.
    pub fn new(config: LedgerConfig, users: usize, providers: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let start = chrono::Utc
            .timestamp_opt(1_700_000_000, 0)
            .single()
            .unwrap_or_else(chrono::Utc::now);
        let clock = Arc::new(ManualClock::new(start));
        let lock = config.default_lock_duration;

        Self {
            ledger: SharedLedger::new(Ledger::new(config, clock.clone())),
            clock,
            rng,
            users: users.max(1),
            providers: providers.max(1),
            lock,
            metrics: SimulationMetrics::new(),
        }
    }

    /// Dispatch one request and record its outcome.
    fn send(&mut self, request: LedgerRequest) -> LedgerResponse {
        let response = dispatch(&self.ledger, request);
        match &response {
            LedgerResponse::Ok(payload) => {
                self.metrics.record_success();
                if let ResponsePayload::Settlement(settlement) = payload {
                    self.metrics.record_refund(settlement.total_amount);
                }
            }
            LedgerResponse::Error(body) => self.metrics.record_failure(body.code),
        }
        response
    }

    /// Run a scenario, failing on the first unmet expectation.
    pub fn run_scenario(&mut self, scenario: &Scenario) -> anyhow::Result<()> {
        info!(name = %scenario.name, description = %scenario.description, "Running scenario");

        for (position, step) in scenario.steps.iter().enumerate() {
            self.execute_step(step)
                .map_err(|e| anyhow!("step {} of {}: {}", position, scenario.name, e))?;
        }

        self.verify()?;
        info!(name = %scenario.name, steps = scenario.steps.len(), "Scenario passed");
        Ok(())
    }

    /// Execute a single scenario step.
    fn execute_step(&mut self, step: &ScenarioStep) -> anyhow::Result<()> {
        match step {
            ScenarioStep::Wait { seconds } => {
                debug!(seconds, "Advancing clock");
                self.clock.advance(Duration::from_secs(*seconds));
            }
            ScenarioStep::Send { request, expect } => {
                let operation = request.operation();
                let response = self.send(request.clone());
                let met = match expect {
                    Expectation::Any => true,
                    Expectation::Success => response.is_ok(),
                    Expectation::Failure(code) => response.error_code() == Some(*code),
                };
                if !met {
                    bail!("{} expected {:?}, got {:?}", operation, expect, response);
                }
            }
            ScenarioStep::Assert { condition } => self.check(condition)?,
        }

        Ok(())
    }

    fn check(&self, condition: &AssertCondition) -> anyhow::Result<()> {
        match condition {
            AssertCondition::BalanceEquals {
                key,
                balance,
                pending_refund,
            } => {
                let account = self.ledger.get(key)?;
                if account.balance != *balance || account.pending_refund != *pending_refund {
                    bail!(
                        "{}: expected balance {}/{} pending, got {}/{}",
                        key,
                        balance,
                        pending_refund,
                        account.balance,
                        account.pending_refund
                    );
                }
            }
            AssertCondition::AccountOrder { keys } => {
                let actual: Vec<AccountKey> =
                    self.ledger.list_all().iter().map(|a| a.key()).collect();
                if &actual != keys {
                    bail!("expected account order {:?}, got {:?}", keys, actual);
                }
            }
            AssertCondition::RefundProcessed {
                key,
                index,
                processed,
            } => {
                let refund = self.ledger.read(|l| l.get_refund(key, *index).cloned())?;
                if refund.processed != *processed {
                    bail!(
                        "{} refund {}: expected processed={}, got {}",
                        key,
                        index,
                        processed,
                        refund.processed
                    );
                }
            }
        }
        Ok(())
    }

    fn random_key(&mut self) -> AccountKey {
        let user = self.rng.gen_range(0..self.users);
        let provider = self.rng.gen_range(0..self.providers);
        AccountKey::new(format!("user-{}", user), format!("provider-{}", provider))
    }

    fn random_request(&mut self) -> LedgerRequest {
        let key = self.random_key();
        match self.rng.gen_range(0..10) {
            0 | 1 => LedgerRequest::Create {
                key,
                signer: SignerKey::new(self.rng.gen(), self.rng.gen()),
                initial_amount: Amount::new(self.rng.gen_range(0..10_000)),
                additional_info: String::new(),
            },
            2 => LedgerRequest::Deposit {
                key,
                amount: Amount::new(self.rng.gen_range(1..5_000)),
            },
            3 | 4 => LedgerRequest::RequestRefund {
                key,
                amount: Amount::new(self.rng.gen_range(1..3_000)),
            },
            5 | 6 => {
                let count = self.rng.gen_range(1..4);
                let indices = (0..count).map(|_| self.rng.gen_range(0..6)).collect();
                LedgerRequest::ProcessRefunds {
                    key,
                    indices,
                    lock_duration_secs: None,
                }
            }
            7 => LedgerRequest::UpdateAcknowledge {
                key,
                acknowledge: format!("ack-{}", self.rng.gen::<u32>()),
            },
            8 => {
                let label = format!("artifact-{}", self.rng.gen_range(0..8));
                let content: [u8; 16] = self.rng.gen();
                LedgerRequest::AddDeliverable {
                    key,
                    deliverable: Deliverable::from_content(
                        DeliverableId::from_label(&label),
                        &content,
                    ),
                }
            }
            _ => LedgerRequest::Delete { key },
        }
    }

    /// Run `operations` random requests, advancing the clock between them.
    pub fn run_random(&mut self, operations: usize) -> anyhow::Result<()> {
        info!(operations, users = self.users, providers = self.providers, "Running random workload");

        let max_step = (self.lock.as_secs() / 4).max(1);
        for _ in 0..operations {
            let request = self.random_request();
            self.send(request);

            let step = self.rng.gen_range(0..=max_step);
            self.clock.advance(Duration::from_secs(step));
        }

        self.verify()
    }

    /// Check ledger integrity.
    pub fn verify(&self) -> anyhow::Result<()> {
        self.ledger
            .verify_integrity()
            .map_err(|e| anyhow!("integrity check failed: {}", e))?;
        debug!(accounts = self.ledger.len(), "Integrity verified");
        Ok(())
    }

    /// Get simulation metrics.
    pub fn get_metrics(&self) -> &SimulationMetrics {
        &self.metrics
    }

    /// Number of live accounts.
    pub fn account_count(&self) -> usize {
        self.ledger.len()
    }
}
