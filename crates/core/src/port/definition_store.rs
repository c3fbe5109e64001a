// Definition Store Port (Interface)
// Durable storage for job definitions and database settings

use crate::domain::{DbSettings, JobDefinition};
use crate::error::Result;
use async_trait::async_trait;

/// Store interface for job definitions and DB settings.
///
/// The two collections are independent: an ordered sequence of job
/// definitions (order preserved for display) and a single settings record.
/// Loading when no prior data exists returns an empty sequence / default
/// settings, never an error.
#[async_trait]
pub trait DefinitionStore: Send + Sync {
    /// Load the ordered job definition sequence
    async fn load_jobs(&self) -> Result<Vec<JobDefinition>>;

    /// Save the full ordered job definition sequence
    async fn save_jobs(&self, jobs: &[JobDefinition]) -> Result<()>;

    /// Load the database settings record
    async fn load_settings(&self) -> Result<DbSettings>;

    /// Save the database settings record
    async fn save_settings(&self, settings: &DbSettings) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory definition store.
    ///
    /// `fail_saves` makes every save return `AppError::Store`, for tests of
    /// the "save failures are reported, not swallowed" rule.
    pub struct MemoryDefinitionStore {
        jobs: Mutex<Vec<JobDefinition>>,
        settings: Mutex<DbSettings>,
        fail_saves: AtomicBool,
        save_count: AtomicUsize,
    }

    impl MemoryDefinitionStore {
        pub fn new() -> Self {
            Self {
                jobs: Mutex::new(Vec::new()),
                settings: Mutex::new(DbSettings::default()),
                fail_saves: AtomicBool::new(false),
                save_count: AtomicUsize::new(0),
            }
        }

        pub fn with_jobs(jobs: Vec<JobDefinition>) -> Self {
            let store = Self::new();
            *store.jobs.lock().unwrap() = jobs;
            store
        }

        pub fn set_fail_saves(&self, fail: bool) {
            self.fail_saves.store(fail, Ordering::SeqCst);
        }

        pub fn save_count(&self) -> usize {
            self.save_count.load(Ordering::SeqCst)
        }

        pub fn stored_jobs(&self) -> Vec<JobDefinition> {
            self.jobs.lock().unwrap().clone()
        }

        pub fn stored_settings(&self) -> DbSettings {
            self.settings.lock().unwrap().clone()
        }

        fn check_save(&self) -> Result<()> {
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(AppError::Store("simulated save failure".into()));
            }
            self.save_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl Default for MemoryDefinitionStore {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl DefinitionStore for MemoryDefinitionStore {
        async fn load_jobs(&self) -> Result<Vec<JobDefinition>> {
            Ok(self.jobs.lock().unwrap().clone())
        }

        async fn save_jobs(&self, jobs: &[JobDefinition]) -> Result<()> {
            self.check_save()?;
            *self.jobs.lock().unwrap() = jobs.to_vec();
            Ok(())
        }

        async fn load_settings(&self) -> Result<DbSettings> {
            Ok(self.settings.lock().unwrap().clone())
        }

        async fn save_settings(&self, settings: &DbSettings) -> Result<()> {
            self.check_save()?;
            *self.settings.lock().unwrap() = settings.clone();
            Ok(())
        }
    }
}
