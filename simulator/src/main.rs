//! Ledgerd Simulator
//!
//! Runs scripted scenarios and randomized workloads against an in-process
//! ledger on a simulated clock.

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ledgerd_ledger::LedgerConfig;

mod controller;
mod metrics;
mod scenario;

use controller::SimulationController;
use scenario::Scenario;

/// Ledgerd Simulator CLI
#[derive(Parser, Debug)]
#[command(name = "simulator")]
#[command(about = "Scripted and randomized workloads against the ledgerd engine")]
struct Args {
    /// Number of simulated users
    #[arg(short, long, default_value = "3")]
    users: usize,

    /// Number of simulated providers
    #[arg(short, long, default_value = "2")]
    providers: usize,

    /// Built-in scenario to run (refund-lifecycle, enumeration, batch-atomicity)
    #[arg(short, long)]
    scenario: Option<String>,

    /// Scenario to load from a JSON file
    #[arg(long, conflicts_with = "scenario")]
    scenario_file: Option<PathBuf>,

    /// Random operations to run when no scenario is given
    #[arg(long, default_value = "1000")]
    operations: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_logging(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string()),
    );
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = LedgerConfig::from_env();
    init_logging(&config.log_level, args.json_logs);

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    info!("Starting ledgerd simulator");
    info!(
        users = args.users,
        providers = args.providers,
        lock_secs = config.default_lock_duration.as_secs(),
        "Simulation parameters"
    );

    let lock_secs = config.default_lock_duration.as_secs();
    let mut controller = SimulationController::new(config, args.users, args.providers, args.seed);

    if let Some(path) = &args.scenario_file {
        let scenario = Scenario::from_file(path)?;
        controller.run_scenario(&scenario)?;
    } else if let Some(name) = &args.scenario {
        let scenario = Scenario::load(name, lock_secs)?;
        controller.run_scenario(&scenario)?;
    } else {
        controller.run_random(args.operations)?;
    }

    let metrics = controller.get_metrics();
    info!("Simulation complete");
    info!("Accounts: {}", controller.account_count());
    info!("Total operations: {}", metrics.total_operations);
    info!("Successful: {}", metrics.successful_operations);
    info!("Failed: {}", metrics.failed_operations);
    info!("Success rate: {:.1}%", metrics.success_rate() * 100.0);
    info!("Refunded: {}", metrics.refunded);
    for (code, count) in metrics.top_failures() {
        info!(code = ?code, count, "Rejections");
    }

    Ok(())
}
