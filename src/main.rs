// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Veiled Labs <dev@veiled.sh>

use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use veiled_rebalancer::app::config::EngineSettings;
use veiled_rebalancer::app::logging::setup_logging;
use veiled_rebalancer::common::clock::ManualClock;
use veiled_rebalancer::common::metrics::spawn_metrics_server;
use veiled_rebalancer::confidential::SoftwareCoprocessor;
use veiled_rebalancer::core::{EngineConfig, RebalanceEngine};
use veiled_rebalancer::domain::error::EngineError;
use veiled_rebalancer::store::StrategyStore;

#[derive(Parser, Debug)]
#[command(author, version, about = "veiled rebalancer")]
struct Cli {
    /// Path to config file (default: config.{toml,yaml,...})
    #[arg(long)]
    config: Option<String>,

    /// Metrics port (overrides config/env)
    #[arg(long)]
    metrics_port: Option<u16>,

    /// Emit JSON logs
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<(), EngineError> {
    let cli = Cli::parse();

    let settings = EngineSettings::load_with_path(cli.config.as_deref())?;
    setup_logging(
        if settings.debug { "debug" } else { "info" },
        cli.json_logs || settings.json_logs,
    );

    let ops = match settings.coprocessor_backend.as_str() {
        "software" => Arc::new(SoftwareCoprocessor::new()),
        other => {
            return Err(EngineError::Config(format!(
                "Coprocessor backend '{}' is not bundled with this binary",
                other
            )));
        }
    };

    let store = Arc::new(StrategyStore::new());
    let clock = Arc::new(ManualClock::new(1));
    let engine = Arc::new(RebalanceEngine::new(
        store.clone(),
        ops,
        clock.clone(),
        EngineConfig {
            governance: settings.governance_address,
            cooldown_blocks: settings.execution_cooldown_blocks,
        },
    ));
    for executor in &settings.authorized_executors {
        engine.add_authorized_executor(*executor, settings.governance_address)?;
    }

    let metrics_port = cli.metrics_port.unwrap_or(settings.metrics_port);
    let _metrics_addr = spawn_metrics_server(metrics_port, engine.stats(), store.clone()).await;

    tracing::info!(
        governance = %settings.governance_address,
        executors = settings.authorized_executors.len(),
        cooldown_blocks = settings.execution_cooldown_blocks,
        "Rebalance engine ready"
    );

    // Local block clock: the embedding pipeline normally supplies block
    // height; standalone, we tick one block per configured interval.
    let shutdown = CancellationToken::new();
    let ticker = {
        let clock = clock.clone();
        let token = shutdown.clone();
        let block_time = settings.block_time();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(block_time) => {
                        clock.advance(1);
                    }
                }
            }
        })
    };

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| EngineError::Config(format!("Signal handler failed: {}", e)))?;
    tracing::info!("Shutting down");
    shutdown.cancel();
    let _ = ticker.await;

    Ok(())
}
