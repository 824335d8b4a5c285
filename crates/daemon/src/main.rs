//! RiskWatch daemon
//!
//! Runs the incident sync engine against a JSON snapshot feed and the SQLite
//! risk store until Ctrl-C, then shuts down cooperatively and logs the final
//! metrics.
//!
//! Logging honours `RUST_LOG`; set `RISKWATCH_LOG_FORMAT=json` for JSON lines.

use std::sync::Arc;

use anyhow::{Context, Result};
use riskwatch_core::IncidentSyncService;
use riskwatch_infra::{
    config, DbManager, IncidentSyncEngine, JsonFileIncidentSource, SqliteRiskRepository,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before the filter reads RUST_LOG
    let dotenv = dotenvy::dotenv();
    setup_tracing();
    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(e) => tracing::debug!(error = %e, "No .env file loaded"),
    }

    let config = config::load().context("failed to load configuration")?;
    let snapshot_path = config
        .source
        .snapshot_path
        .clone()
        .context("no incident snapshot configured; set RISKWATCH_SNAPSHOT_PATH")?;

    let db = DbManager::from_config(&config.database).context("failed to open risk database")?;
    db.run_migrations().context("failed to migrate risk database")?;
    let store = Arc::new(SqliteRiskRepository::new(Arc::new(db)));
    let source = Arc::new(JsonFileIncidentSource::new(snapshot_path));

    let service = IncidentSyncService::from_config(source, store, &config.engine);
    let engine = IncidentSyncEngine::new(service, config.engine.clone());

    let shutdown = CancellationToken::new();
    let stopped = engine.start(&shutdown)?;
    info!("RiskWatch running; press Ctrl-C to stop");

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for Ctrl-C")?;
            info!("Shutdown requested");
        }
        () = stopped.clone().wait() => {
            warn!("Incident sync engine stopped on its own");
        }
    }

    shutdown.cancel();
    let grace = config.engine.shutdown_timeout;
    if tokio::time::timeout(grace, stopped.wait()).await.is_err() {
        warn!(grace = ?grace, "Engine did not stop in time; exiting anyway");
    }

    let metrics = engine.get_metrics();
    info!(
        total_syncs = metrics.total_syncs,
        successful_syncs = metrics.successful_syncs,
        failed_syncs = metrics.failed_syncs,
        risks_ingested = metrics.risks_ingested,
        sink_failures = metrics.sink_failures,
        last_error = %metrics.last_error,
        "Final sync metrics"
    );

    Ok(())
}

fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("riskwatch_infra=info,riskwatch_core=info,info"));

    let json = std::env::var("RISKWATCH_LOG_FORMAT")
        .is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
