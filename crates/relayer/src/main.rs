use std::sync::Arc;
use tracing::info;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod config;
mod error;
mod ledger_service;
mod persistence;
mod points_service;
mod server;

use config::RelayerConfig;
use server::RelayerState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relayer=info,rewards_ledger=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Rewards Relayer");

    dotenvy::dotenv().ok();
    let config = RelayerConfig::from_env()?;

    info!("Chain id: {}", config.chain_id);
    info!("Operator: {}", config.operator());
    info!("Listening on: {}:{}", config.host, config.port);

    let state = Arc::new(RelayerState::new(config)?);
    let info = state.ledger.info().await;
    info!(
        "Relay minter {}, engine {}, backend signer {}, rate {}",
        info.relay_minter, info.engine, info.backend_signer, info.redemption_rate
    );

    let reconcile_state = state.clone();
    let interval_secs = state.config.reconcile_interval_secs.max(1);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(interval_secs));
        // First tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            match reconcile_state.ledger.reconcile_pending().await {
                Ok(run) => {
                    for batch in &run.batches {
                        info!(
                            "✓ Reconciled {} users in block {}: {}",
                            batch.summary.users_reconciled,
                            batch.receipt.block_number,
                            batch.receipt.tx_hash
                        );
                    }
                }
                Err(e) => warn!("✗ Scheduled reconciliation failed: {}", e),
            }
        }
    });

    server::run(state).await?;
    Ok(())
}
