// Scheduler - one independent periodic trigger per enabled job

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::application::executor::ProbeExecutor;
use crate::application::state::{JobStateSnapshot, StateStore};
use crate::domain::{DbSettings, DomainError, JobDefinition, JobId, ProbeStatus};
use crate::error::Result;

/// One job as seen by an observer: definition plus runtime state snapshot
#[derive(Debug, Clone)]
pub struct JobOverview {
    pub definition: Arc<JobDefinition>,
    pub state: JobStateSnapshot,
}

struct JobEntry {
    definition: Arc<JobDefinition>,
    /// Overlap guard: claimed by the timer, cleared by the execution task
    running: Arc<AtomicBool>,
    /// Present iff the job is enabled
    timer: Option<JoinHandle<()>>,
}

struct JobTable {
    /// Insertion order, preserved for display
    order: Vec<JobId>,
    entries: HashMap<JobId, JobEntry>,
}

/// Owns the full job set and one timer task per enabled job.
///
/// The table lock serializes add/remove/enable/disable/replace against each
/// other; timer tasks never touch the table. Each enabled job gets an
/// independent `tokio::time::interval` task, so one slow or failing probe
/// cannot delay or starve any other job.
pub struct Scheduler {
    executor: Arc<ProbeExecutor>,
    state: Arc<StateStore>,
    /// Shared connection settings; executions clone the inner Arc at start,
    /// so an in-flight run keeps its snapshot across `update_settings`
    settings: Arc<RwLock<Arc<DbSettings>>>,
    jobs: Mutex<JobTable>,
}

impl Scheduler {
    pub fn new(
        executor: Arc<ProbeExecutor>,
        state: Arc<StateStore>,
        settings: DbSettings,
    ) -> Self {
        Self {
            executor,
            state,
            settings: Arc::new(RwLock::new(Arc::new(settings))),
            jobs: Mutex::new(JobTable {
                order: Vec::new(),
                entries: HashMap::new(),
            }),
        }
    }

    /// Register a job. Created disabled with status Unknown; no timer starts.
    ///
    /// # Errors
    /// - `DomainError::DuplicateJob` if the id is already registered
    pub async fn add_job(&self, definition: JobDefinition) -> Result<()> {
        let mut table = self.jobs.lock().await;
        if table.entries.contains_key(&definition.id) {
            return Err(DomainError::DuplicateJob(definition.id).into());
        }

        let id = definition.id.clone();
        self.state.insert(&id);
        table.order.push(id.clone());
        table.entries.insert(
            id.clone(),
            JobEntry {
                definition: Arc::new(definition),
                running: Arc::new(AtomicBool::new(false)),
                timer: None,
            },
        );
        debug!(job_id = %id, "Job registered");
        Ok(())
    }

    /// Cancel the job's timer and discard its runtime state. An in-flight
    /// execution finishes but its result is dropped by the state store.
    pub async fn remove_job(&self, id: &str) -> Result<()> {
        let mut table = self.jobs.lock().await;
        let entry = table
            .entries
            .remove(id)
            .ok_or_else(|| DomainError::JobNotFound(id.to_string()))?;
        if let Some(timer) = entry.timer {
            timer.abort();
        }
        table.order.retain(|existing| existing.as_str() != id);
        self.state.remove(id);
        info!(job_id = %id, "Job removed");
        Ok(())
    }

    /// Start the periodic trigger. Idempotent: enabling an enabled job is a
    /// no-op. The first fire happens one full interval after this call.
    pub async fn enable(&self, id: &str) -> Result<()> {
        let mut table = self.jobs.lock().await;
        let entry = table
            .entries
            .get_mut(id)
            .ok_or_else(|| DomainError::JobNotFound(id.to_string()))?;
        if entry.timer.is_some() {
            return Ok(());
        }

        entry.timer = Some(spawn_timer(
            Arc::clone(&entry.definition),
            Arc::clone(&entry.running),
            Arc::clone(&self.executor),
            Arc::clone(&self.state),
            Arc::clone(&self.settings),
        ));
        info!(
            job_id = %id,
            interval_secs = entry.definition.frequency_secs,
            "Job enabled"
        );
        Ok(())
    }

    /// Cancel future triggers. Idempotent: disabling a disabled job is a
    /// no-op. An in-flight execution is not interrupted and still updates
    /// state when it completes.
    pub async fn disable(&self, id: &str) -> Result<()> {
        let mut table = self.jobs.lock().await;
        let entry = table
            .entries
            .get_mut(id)
            .ok_or_else(|| DomainError::JobNotFound(id.to_string()))?;
        if let Some(timer) = entry.timer.take() {
            timer.abort();
            info!(job_id = %id, "Job disabled");
        }
        Ok(())
    }

    /// Wholesale definition swap (edit). A running timer is restarted against
    /// the new definition; cadence counts fresh from the edit.
    pub async fn replace_job(&self, definition: JobDefinition) -> Result<()> {
        let mut table = self.jobs.lock().await;
        let entry = table
            .entries
            .get_mut(&definition.id)
            .ok_or_else(|| DomainError::JobNotFound(definition.id.clone()))?;

        let was_enabled = match entry.timer.take() {
            Some(timer) => {
                timer.abort();
                true
            }
            None => false,
        };
        entry.definition = Arc::new(definition);
        if was_enabled {
            entry.timer = Some(spawn_timer(
                Arc::clone(&entry.definition),
                Arc::clone(&entry.running),
                Arc::clone(&self.executor),
                Arc::clone(&self.state),
                Arc::clone(&self.settings),
            ));
        }
        info!(job_id = %entry.definition.id, "Job definition replaced");
        Ok(())
    }

    /// Full replace of the shared settings snapshot. Subsequent executions
    /// see the new settings; in-flight executions keep the one they started
    /// with.
    pub async fn update_settings(&self, settings: DbSettings) {
        *self.settings.write().await = Arc::new(settings);
        info!("Database settings replaced");
    }

    pub async fn current_settings(&self) -> DbSettings {
        self.settings.read().await.as_ref().clone()
    }

    /// Snapshot of every job in display order
    pub async fn jobs(&self) -> Vec<JobOverview> {
        let table = self.jobs.lock().await;
        table
            .order
            .iter()
            .filter_map(|id| table.entries.get(id))
            .map(|entry| {
                let (last_status, last_run_at) = self
                    .state
                    .status_of(&entry.definition.id)
                    .unwrap_or((ProbeStatus::Unknown, None));
                JobOverview {
                    definition: Arc::clone(&entry.definition),
                    state: JobStateSnapshot {
                        enabled: entry.timer.is_some(),
                        last_status,
                        last_run_at,
                        running: entry.running.load(Ordering::SeqCst),
                    },
                }
            })
            .collect()
    }

    /// Ordered definition sequence, for persistence
    pub async fn definitions(&self) -> Vec<JobDefinition> {
        let table = self.jobs.lock().await;
        table
            .order
            .iter()
            .filter_map(|id| table.entries.get(id))
            .map(|entry| entry.definition.as_ref().clone())
            .collect()
    }

    /// Cancel every timer. In-flight executions still run to completion.
    pub async fn shutdown(&self) {
        let mut table = self.jobs.lock().await;
        for entry in table.entries.values_mut() {
            if let Some(timer) = entry.timer.take() {
                timer.abort();
            }
        }
        info!("Scheduler stopped");
    }
}

/// Timer task for one enabled job.
///
/// Claims the overlap guard on each tick; a claimed guard means the previous
/// run is still in flight and the cycle is skipped outright (no queueing).
/// The execution itself runs detached, so aborting this task (disable) never
/// cuts a probe off mid-query, and the guard is always cleared by the
/// execution that claimed it.
fn spawn_timer(
    definition: Arc<JobDefinition>,
    running: Arc<AtomicBool>,
    executor: Arc<ProbeExecutor>,
    state: Arc<StateStore>,
    settings: Arc<RwLock<Arc<DbSettings>>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = definition.interval();
        // First fire after one full interval, not immediately
        let mut ticker = time::interval_at(time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if running
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                debug!(job_id = %definition.id, "Previous run still in flight, skipping cycle");
                continue;
            }

            let definition = Arc::clone(&definition);
            let running = Arc::clone(&running);
            let executor = Arc::clone(&executor);
            let state = Arc::clone(&state);
            let settings = Arc::clone(&settings);
            tokio::spawn(async move {
                let snapshot = settings.read().await.clone();
                let report = executor.execute(&definition, &snapshot).await;
                state.record(&definition.id, report.status, report.finished_at);
                running.store(false, Ordering::SeqCst);
            });
        }
    })
}
