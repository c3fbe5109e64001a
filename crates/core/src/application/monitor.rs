// Monitor - boundary facade over the scheduler and the definition store
// This is the surface a presentation layer talks to

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::scheduler::{JobOverview, Scheduler};
use crate::domain::{DbSettings, JobDefinition, JobDraft, JobId};
use crate::error::Result;
use crate::port::{DefinitionStore, IdProvider};

/// Engine facade.
///
/// Validates and applies job/settings changes, then persists the result.
/// Persistence failures surface to the caller after the in-memory change has
/// applied: a store outage must not disturb already-running jobs, and the
/// caller decides whether to retry the save.
pub struct Monitor {
    scheduler: Arc<Scheduler>,
    store: Arc<dyn DefinitionStore>,
    ids: Arc<dyn IdProvider>,
}

impl Monitor {
    pub fn new(
        scheduler: Arc<Scheduler>,
        store: Arc<dyn DefinitionStore>,
        ids: Arc<dyn IdProvider>,
    ) -> Self {
        Self {
            scheduler,
            store,
            ids,
        }
    }

    /// Load persisted settings and job definitions at startup. Every loaded
    /// job starts disabled. Absence of prior data yields an empty monitor.
    pub async fn load(&self) -> Result<usize> {
        let settings = self.store.load_settings().await?;
        self.scheduler.update_settings(settings).await;

        let definitions = self.store.load_jobs().await?;
        let count = definitions.len();
        for definition in definitions {
            self.scheduler.add_job(definition).await?;
        }
        info!(jobs = count, "Definitions loaded");
        Ok(count)
    }

    /// Validate a draft, assign an id, register the job (disabled), persist.
    ///
    /// # Errors
    /// - `DomainError::Validation` on an invalid draft (nothing is stored)
    /// - `AppError::Store` if persisting fails (the job stays registered)
    pub async fn add_job(&self, draft: JobDraft) -> Result<JobId> {
        let definition = JobDefinition::new(self.ids.generate_id(), draft)?;
        let id = definition.id.clone();
        self.scheduler.add_job(definition).await?;
        info!(job_id = %id, "Job added");
        self.save_jobs().await?;
        Ok(id)
    }

    /// Replace a job's definition wholesale (edit), then persist
    pub async fn update_job(&self, id: &str, draft: JobDraft) -> Result<()> {
        let definition = JobDefinition::new(id, draft)?;
        self.scheduler.replace_job(definition).await?;
        self.save_jobs().await
    }

    pub async fn remove_job(&self, id: &str) -> Result<()> {
        self.scheduler.remove_job(id).await?;
        self.save_jobs().await
    }

    pub async fn set_enabled(&self, id: &str, enabled: bool) -> Result<()> {
        if enabled {
            self.scheduler.enable(id).await
        } else {
            self.scheduler.disable(id).await
        }
    }

    /// Ordered snapshot of every job and its runtime state
    pub async fn list_jobs(&self) -> Vec<JobOverview> {
        self.scheduler.jobs().await
    }

    /// Replace the shared DB settings and persist them. In-flight executions
    /// keep the snapshot they started with.
    pub async fn update_db_settings(&self, settings: DbSettings) -> Result<()> {
        self.scheduler.update_settings(settings.clone()).await;
        self.store.save_settings(&settings).await
    }

    pub async fn db_settings(&self) -> DbSettings {
        self.scheduler.current_settings().await
    }

    /// Cancel every timer; in-flight executions still finish
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
    }

    async fn save_jobs(&self) -> Result<()> {
        let definitions = self.scheduler.definitions().await;
        if let Err(e) = self.store.save_jobs(&definitions).await {
            warn!(error = %e, "Saving job definitions failed");
            return Err(e);
        }
        Ok(())
    }
}
