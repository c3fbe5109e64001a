//! sqlpulse - Main Entry Point
//! Headless SQL probe engine: load definitions, schedule probes, log status

mod report;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use sqlpulse_core::application::{Monitor, ProbeExecutor, Scheduler, StateStore};
use sqlpulse_core::domain::DbSettings;
use sqlpulse_core::port::id_provider::UuidProvider;
use sqlpulse_core::port::time_provider::SystemTimeProvider;
use sqlpulse_infra_files::JsonDefinitionStore;
use sqlpulse_infra_postgres::PgProbeDriver;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_DATA_DIR: &str = "~/.sqlpulse";
const DEFAULT_STATUS_INTERVAL_SECS: u64 = 60;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    let log_format = std::env::var("SQLPULSE_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("sqlpulse=info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("sqlpulse v{} starting...", VERSION);

    // 2. Load configuration
    let data_dir = std::env::var("SQLPULSE_DATA_DIR")
        .unwrap_or_else(|_| shellexpand::tilde(DEFAULT_DATA_DIR).into_owned());

    let probe_timeout_secs: Option<u64> = std::env::var("SQLPULSE_PROBE_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok());

    let status_interval_secs: u64 = std::env::var("SQLPULSE_STATUS_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_STATUS_INTERVAL_SECS);

    let autostart = std::env::var("SQLPULSE_AUTOSTART")
        .map(|v| v != "0")
        .unwrap_or(true);

    info!(data_dir = %data_dir, "Using data directory");

    // 3. Setup dependencies (DI wiring)
    let store = Arc::new(JsonDefinitionStore::in_dir(&data_dir));
    let driver = Arc::new(PgProbeDriver::new());
    let time_provider = Arc::new(SystemTimeProvider);
    let id_provider = Arc::new(UuidProvider);

    let mut executor = ProbeExecutor::new(driver, time_provider);
    if let Some(secs) = probe_timeout_secs {
        info!(timeout_secs = secs, "Probe timeout enabled");
        executor = executor.with_timeout(Duration::from_secs(secs));
    }

    let scheduler = Arc::new(Scheduler::new(
        Arc::new(executor),
        Arc::new(StateStore::new()),
        DbSettings::default(),
    ));
    let monitor = Arc::new(Monitor::new(scheduler, store, id_provider));

    // 4. Load persisted settings and job definitions
    let loaded = monitor
        .load()
        .await
        .map_err(|e| anyhow::anyhow!("Loading definitions failed: {}", e))?;

    // 5. Start the loaded jobs
    if autostart {
        for job in monitor.list_jobs().await {
            monitor
                .set_enabled(&job.definition.id, true)
                .await
                .map_err(|e| anyhow::anyhow!("Enabling job {} failed: {}", job.definition.id, e))?;
        }
        info!(jobs = loaded, "Loaded jobs enabled");
    } else {
        info!(jobs = loaded, "Autostart off, jobs loaded but idle");
    }

    // 6. Start the status reporter
    let reporter = report::StatusReporter::new(Arc::clone(&monitor), status_interval_secs);
    tokio::spawn(async move {
        reporter.run().await;
    });

    info!("Engine ready. Press Ctrl+C to shutdown");

    // 7. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 8. Graceful shutdown (in-flight probes finish on their own)
    monitor.shutdown().await;

    info!("Shutdown complete.");

    Ok(())
}
