//! Entry point: parse CLI args, load the engine config, bootstrap the
//! adapters and engine, then run the control loop until a shutdown signal.

use anyhow::Context;
use clap::Parser;
use pod_node::config::{load_engine_config, Cli};
use tokio::sync::{mpsc, watch};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut telemetry_config = telemetry::TelemetryConfig::from_env();
    if let Some(level) = &cli.log_level {
        telemetry_config.log_level = level.clone();
    }
    let _telemetry_guard = telemetry::init_telemetry(telemetry_config)
        .await
        .context("failed to initialize telemetry")?;

    let engine_config = load_engine_config(&cli.config)
        .with_context(|| format!("loading engine config from {}", cli.config.display()))?;

    tracing::info!(
        miner = %engine_config.miner,
        chain_id = cli.chain_id,
        "bootstrapping pod-node"
    );

    let engine = pod_node::bootstrap(cli.chain_id, engine_config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (_messages_tx, messages_rx) = mpsc::channel(128);

    let run_handle = tokio::spawn(engine.clone().run(messages_rx, shutdown_rx));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    tracing::info!("shutdown signal received");
    let _ = shutdown_tx.send(true);

    run_handle.await.context("engine control loop panicked")?;
    Ok(())
}
