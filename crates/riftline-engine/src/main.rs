//! Maintenance daemon for the Riftline cache.
//!
//! This binary owns the boot sequence every deployment runs before any
//! domain traffic is served, then stays up as the eviction daemon. The
//! read-through services themselves are library API (`riftline-cache`)
//! consumed by the HTTP layer, which lives outside this repository.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `riftline-config.yaml`
//! 3. Connect to `PostgreSQL`, retrying until it is up
//! 4. Run pending schema migrations (failure aborts boot)
//! 5. Ensure every collection's table and indexes
//! 6. Arm the daily scheduler and subscribe the eviction sweep
//! 7. Run until ctrl-c

mod config;
mod error;
mod migrations;

use std::path::Path;

use riftline_cache::{CacheTtls, ensure_collections, sweep};
use riftline_scheduler::{DailyScheduler, SystemClock};
use riftline_store::{MigrationRunner, PostgresConfig, PostgresPool};
use tokio::sync::broadcast::error::RecvError;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ServiceConfig;
use crate::error::EngineError;

/// Default location of the service configuration file.
const CONFIG_PATH: &str = "riftline-config.yaml";

/// Application entry point for the maintenance daemon.
///
/// # Errors
///
/// Returns an error if configuration loading, a migration, or the
/// collection setup fails. An unreachable database is not an error; the
/// boot sequence waits for it.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("riftline-engine starting");

    // 2. Load configuration.
    let config = ServiceConfig::load(Path::new(CONFIG_PATH))?;
    info!(
        connect_retry_secs = config.infrastructure.connect_retry_secs,
        "Configuration loaded"
    );
    let ttls = config.cache.ttls();

    // 3. Connect to PostgreSQL; wait, don't fail.
    let pg_config = PostgresConfig::new(&config.infrastructure.postgres_url)
        .with_retry_delay(config.infrastructure.retry_delay());
    let pool = PostgresPool::connect_with_retry(&pg_config).await?;

    // 4. Run pending migrations. Any failure aborts boot: the service
    //    must not run against a partially migrated schema.
    let catalogue = migrations::catalogue();
    let applied = MigrationRunner::new(pool.pool())
        .run_pending(&catalogue)
        .await
        .map_err(EngineError::from)?;
    info!(applied, total = catalogue.len(), "Migrations complete");

    // 5. Ensure collections.
    ensure_collections(&pool).await.map_err(EngineError::from)?;

    // 6. Arm the daily scheduler and subscribe the eviction sweep.
    let scheduler = DailyScheduler::new(SystemClock);
    let ticks = scheduler.subscribe();
    let scheduler_handle = scheduler.spawn();
    let sweep_handle = tokio::spawn(run_eviction(pool.clone(), ticks, ttls));
    info!("Daily eviction scheduler armed");

    // 7. Run until ctrl-c.
    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    scheduler_handle.abort();
    sweep_handle.abort();
    pool.close().await;

    Ok(())
}

/// Consume scheduler ticks and run the eviction sweep for each.
///
/// A lagged subscription (the process was wedged across tick
/// boundaries) skips the missed ticks rather than replaying them.
async fn run_eviction(
    pool: PostgresPool,
    mut ticks: tokio::sync::broadcast::Receiver<riftline_scheduler::Tick>,
    ttls: CacheTtls,
) {
    loop {
        match ticks.recv().await {
            Ok(tick) => {
                let evicted = sweep(&pool, tick.at, &ttls).await;
                info!(at = %tick.at.to_rfc3339(), evicted, "Scheduled eviction finished");
            }
            Err(RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "Eviction subscriber lagged; skipping missed ticks");
            }
            Err(RecvError::Closed) => {
                info!("Scheduler channel closed; eviction loop exiting");
                return;
            }
        }
    }
}
