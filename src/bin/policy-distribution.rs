// Copyright (c) 2025 - Cowboy AI, Inc.
//! Policy Distribution Service
//!
//! Loads a distribution configuration, starts every reception handler it
//! declares and runs until interrupted.
//!
//! Run with: cargo run --bin policy-distribution -- -c config/DistributionConfig.json
//!
//! Log verbosity follows `RUST_LOG` (default: info).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use policy_distribution::{load_parameters, DistributionActivator, ParameterGroup, PluginRegistry};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "policy-distribution")]
#[command(about = "Receive, decode and forward policies")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Distribution configuration file (JSON)
    #[arg(short, long)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(config = %cli.config.display(), "Starting policy distribution service");

    let registry = PluginRegistry::with_builtin_plugins();
    let parameters = load_parameters(&cli.config, &registry)
        .with_context(|| format!("start of policy distribution service failed: {}", cli.config.display()))?;
    info!(service = %parameters.name(), "Configuration loaded");

    let mut activator = DistributionActivator::new(parameters, registry);
    activator
        .initialize()
        .await
        .context("start of policy distribution service failed")?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown signal received");

    if let Err(err) = activator.terminate().await {
        error!("Policy distribution service stopped with errors: {}", err);
        return Err(err).context("termination of policy distribution service failed");
    }

    let report = activator.statistics_report();
    info!(
        total_distributions = report.total_distribution_count,
        successful_distributions = report.distribution_success_count,
        failed_distributions = report.distribution_failure_count,
        "Policy distribution service stopped"
    );
    Ok(())
}
