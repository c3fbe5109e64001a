// Probe Executor - runs one job's probe and classifies the outcome

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::{classify, DbSettings, JobDefinition, ProbeError, ProbeStatus};
use crate::port::{ProbeDriver, TimeProvider};

/// Result of one completed probe execution
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub status: ProbeStatus,
    pub finished_at: DateTime<Utc>,
}

/// Job Execution Unit.
///
/// Runs a job's query through the driver, classifies the outcome, and stamps
/// the completion time. Every driver failure is captured into
/// `ProbeStatus::Error`; nothing propagates to the caller, so one job's
/// database outage cannot disturb the scheduler or sibling jobs.
pub struct ProbeExecutor {
    driver: Arc<dyn ProbeDriver>,
    time: Arc<dyn TimeProvider>,
    timeout: Option<Duration>,
}

impl ProbeExecutor {
    pub fn new(driver: Arc<dyn ProbeDriver>, time: Arc<dyn TimeProvider>) -> Self {
        Self {
            driver,
            time,
            timeout: None,
        }
    }

    /// Bound each driver call by a hard timeout. Unbounded by default; a
    /// probe outliving its own interval is already handled by cycle skipping.
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    pub async fn execute(&self, job: &JobDefinition, settings: &DbSettings) -> ProbeReport {
        let outcome = match self.timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, self.driver.run(settings, &job.query)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(ProbeError::Timeout(limit)),
                }
            }
            None => self.driver.run(settings, &job.query).await,
        };

        if let Err(e) = &outcome {
            warn!(job_id = %job.id, job_name = %job.name, error = %e, "Probe failed");
        }

        let status = classify(outcome);
        debug!(job_id = %job.id, status = %status, "Probe classified");

        ProbeReport {
            status,
            finished_at: self.time.now(),
        }
    }
}
