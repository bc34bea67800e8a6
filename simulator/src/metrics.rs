//! Simulation metrics.

use std::collections::HashMap;

use ledgerd_common::Amount;
use ledgerd_protocol::ErrorCode;
use tracing::warn;

/// Simulation metrics.
#[derive(Debug, Clone, Default)]
pub struct SimulationMetrics {
    /// Total requests dispatched.
    pub total_operations: u64,
    /// Requests that succeeded.
    pub successful_operations: u64,
    /// Requests that were rejected.
    pub failed_operations: u64,
    /// Rejections by error code.
    pub failures_by_code: HashMap<ErrorCode, u64>,
    /// Sum of amounts paid out by processed refunds.
    pub refunded: Amount,
}

impl SimulationMetrics {
    /// Create new metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful request.
    pub fn record_success(&mut self) {
        self.total_operations += 1;
        self.successful_operations += 1;
    }

    /// Record a rejected request.
    pub fn record_failure(&mut self, code: ErrorCode) {
        self.total_operations += 1;
        self.failed_operations += 1;
        *self.failures_by_code.entry(code).or_insert(0) += 1;
    }

    /// Add a refund payout. The total saturates at [`Amount::MAX`].
    pub fn record_refund(&mut self, amount: Amount) {
        self.refunded = match self.refunded.checked_add(amount) {
            Some(total) => total,
            None => {
                warn!(refunded = %self.refunded, amount = %amount, "Refund total saturated");
                Amount::MAX
            }
        };
    }

    /// Get success rate.
    pub fn success_rate(&self) -> f64 {
        if self.total_operations == 0 {
            return 0.0;
        }

        self.successful_operations as f64 / self.total_operations as f64
    }

    /// Failure counts sorted by descending frequency.
    pub fn top_failures(&self) -> Vec<(ErrorCode, u64)> {
        let mut failures: Vec<_> = self
            .failures_by_code
            .iter()
            .map(|(code, count)| (*code, *count))
            .collect();
        failures.sort_by(|a, b| b.1.cmp(&a.1));
        failures
    }
}
