//! Ledger configuration.

use std::time::Duration;

use ledgerd_common::constants;

/// Main ledger configuration.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Lock applied by `process_refunds_default`.
    pub default_lock_duration: Duration,
    /// Upper bound for the default lock.
    pub max_lock_duration: Duration,
    /// Maximum number of refund indices per processing batch.
    pub max_batch_size: usize,
    /// Number of journal events retained (0 disables retention).
    pub journal_capacity: usize,
    /// Log level.
    pub log_level: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_lock_duration: constants::default_lock_duration(),
            max_lock_duration: constants::max_lock_duration(),
            max_batch_size: 256,
            journal_capacity: 10_000,
            log_level: "info".to_string(),
        }
    }
}

impl LedgerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(secs) = std::env::var("LEDGER_LOCK_DURATION_SECS") {
            if let Ok(secs) = secs.parse() {
                config.default_lock_duration = Duration::from_secs(secs);
            }
        }

        if let Ok(secs) = std::env::var("LEDGER_MAX_LOCK_DURATION_SECS") {
            if let Ok(secs) = secs.parse() {
                config.max_lock_duration = Duration::from_secs(secs);
            }
        }

        if let Ok(size) = std::env::var("LEDGER_MAX_BATCH_SIZE") {
            if let Ok(size) = size.parse() {
                config.max_batch_size = size;
            }
        }

        if let Ok(capacity) = std::env::var("LEDGER_JOURNAL_CAPACITY") {
            if let Ok(capacity) = capacity.parse() {
                config.journal_capacity = capacity;
            }
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_lock_duration > self.max_lock_duration {
            return Err("Default lock duration cannot exceed max duration".to_string());
        }

        if self.max_batch_size == 0 {
            return Err("Max batch size cannot be 0".to_string());
        }

        if self.log_level.is_empty() {
            return Err("Log level cannot be empty".to_string());
        }

        Ok(())
    }
}
