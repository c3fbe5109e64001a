//! Periodic status report for operators watching the log

use std::sync::Arc;
use std::time::Duration;

use sqlpulse_core::application::Monitor;
use tokio::time::interval;
use tracing::info;

/// Logs every job's snapshot on a fixed cadence.
///
/// Runs in the background; should be spawned in tokio::spawn.
pub struct StatusReporter {
    monitor: Arc<Monitor>,
    interval_secs: u64,
}

impl StatusReporter {
    pub fn new(monitor: Arc<Monitor>, interval_secs: u64) -> Self {
        Self {
            monitor,
            interval_secs,
        }
    }

    pub async fn run(self) {
        let mut tick = interval(Duration::from_secs(self.interval_secs));
        // the immediate first tick would report before any probe has run
        tick.tick().await;

        loop {
            tick.tick().await;

            for job in self.monitor.list_jobs().await {
                info!(
                    job_id = %job.definition.id,
                    name = %job.definition.name,
                    enabled = job.state.enabled,
                    status = %job.state.last_status,
                    last_run = ?job.state.last_run_at.map(|t| t.to_rfc3339()),
                    "Job status"
                );
            }
        }
    }
}
