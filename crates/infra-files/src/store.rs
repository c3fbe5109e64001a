// JSON Definition Store

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use sqlpulse_core::domain::{DbSettings, JobDefinition};
use sqlpulse_core::error::{AppError, Result};
use sqlpulse_core::port::DefinitionStore;

const JOBS_FILE: &str = "jobs.json";
const SETTINGS_FILE: &str = "settings.json";

/// Definition store over two JSON documents: an ordered job array in
/// `jobs.json` and a single settings object in `settings.json`.
///
/// A missing file loads as an empty sequence / default settings; any other
/// read or parse failure is surfaced as an error.
pub struct JsonDefinitionStore {
    jobs_path: PathBuf,
    settings_path: PathBuf,
}

impl JsonDefinitionStore {
    pub fn new(jobs_path: impl Into<PathBuf>, settings_path: impl Into<PathBuf>) -> Self {
        Self {
            jobs_path: jobs_path.into(),
            settings_path: settings_path.into(),
        }
    }

    /// Store using the conventional file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(JOBS_FILE), dir.join(SETTINGS_FILE))
    }

    async fn read_or_missing(path: &Path) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No prior data, starting empty");
                Ok(None)
            }
            Err(e) => Err(AppError::Store(format!(
                "reading {} failed: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn write(path: &Path, bytes: Vec<u8>) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Store(format!("creating {} failed: {}", parent.display(), e)))?;
        }
        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| AppError::Store(format!("writing {} failed: {}", path.display(), e)))
    }
}

#[async_trait]
impl DefinitionStore for JsonDefinitionStore {
    async fn load_jobs(&self) -> Result<Vec<JobDefinition>> {
        match Self::read_or_missing(&self.jobs_path).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    async fn save_jobs(&self, jobs: &[JobDefinition]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(jobs)?;
        Self::write(&self.jobs_path, bytes).await
    }

    async fn load_settings(&self) -> Result<DbSettings> {
        match Self::read_or_missing(&self.settings_path).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(DbSettings::default()),
        }
    }

    async fn save_settings(&self, settings: &DbSettings) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(settings)?;
        Self::write(&self.settings_path, bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlpulse_core::domain::JobDraft;

    fn temp_store() -> (JsonDefinitionStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("sqlpulse-test-{}", uuid::Uuid::new_v4()));
        (JsonDefinitionStore::in_dir(&dir), dir)
    }

    fn definition(id: &str, name: &str, frequency_secs: u32) -> JobDefinition {
        JobDefinition::new(
            id,
            JobDraft {
                name: name.into(),
                description: format!("{} probe", name),
                query: "SELECT true".into(),
                frequency_secs,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn missing_files_load_as_empty_and_default() {
        let (store, dir) = temp_store();

        assert!(store.load_jobs().await.unwrap().is_empty());
        assert_eq!(store.load_settings().await.unwrap(), DbSettings::default());

        let _ = tokio::fs::remove_dir_all(dir).await;
    }

    #[tokio::test]
    async fn jobs_round_trip_preserves_order_and_fields() {
        let (store, dir) = temp_store();

        let jobs = vec![
            definition("b", "replica lag", 60),
            definition("a", "ping", 1),
            definition("c", "queue depth", 15),
        ];
        store.save_jobs(&jobs).await.unwrap();

        let loaded = store.load_jobs().await.unwrap();
        assert_eq!(loaded, jobs);

        let _ = tokio::fs::remove_dir_all(dir).await;
    }

    #[tokio::test]
    async fn settings_round_trip() {
        let (store, dir) = temp_store();

        let settings = DbSettings {
            host: "db.internal".into(),
            port: 5433,
            dbname: "ops".into(),
            user: "monitor".into(),
            password: "secret".into(),
        };
        store.save_settings(&settings).await.unwrap();
        assert_eq!(store.load_settings().await.unwrap(), settings);

        let _ = tokio::fs::remove_dir_all(dir).await;
    }

    #[tokio::test]
    async fn corrupt_jobs_file_surfaces_an_error() {
        let (store, dir) = temp_store();

        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join(JOBS_FILE), b"{not json")
            .await
            .unwrap();

        assert!(store.load_jobs().await.is_err());

        let _ = tokio::fs::remove_dir_all(dir).await;
    }
}
