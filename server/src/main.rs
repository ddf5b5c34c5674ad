//! CeluStock server binary: load (or seed) the inventory snapshot, build
//! the engine store, and serve the HTTP API until interrupted.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use celustock_core::analytics::StatsConfig;
use celustock_core::engine::{EngineEnvironment, EngineReducer};
use celustock_core::reducer::environment::{SnapshotStore, SystemClock};
use celustock_core::snapshot::CsvSnapshots;
use celustock_core::{seed, EngineState};
use celustock_runtime::Store;
use celustock_server::{router, AppState, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("celustock=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        addr = %config.addr,
        data = %config.data_path.display(),
        "starting celustock-server"
    );

    let snapshots = Arc::new(CsvSnapshots::new(&config.data_path));
    let records = match snapshots.load().context("reading inventory snapshot")? {
        Some(records) => {
            tracing::info!(count = records.len(), "inventory snapshot loaded");
            records
        }
        None => {
            tracing::warn!("no snapshot found; generating seed inventory");
            let mut rng = rand::thread_rng();
            let records = seed::generate(config.seed_count, &mut rng);
            snapshots
                .save(&records)
                .context("writing seed inventory")?;
            records
        }
    };

    let environment = EngineEnvironment::new(Arc::new(SystemClock), snapshots);
    let store = Arc::new(Store::new(
        EngineState::with_records(records),
        EngineReducer::new(),
        environment,
    ));

    let app = router(AppState::new(
        Arc::clone(&store),
        StatsConfig::default(),
        Arc::new(SystemClock),
    ));

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    tracing::info!(addr = %config.addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    // Let in-flight snapshot writes land before exiting.
    store
        .shutdown(Duration::from_secs(5))
        .await
        .context("draining store effects")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
