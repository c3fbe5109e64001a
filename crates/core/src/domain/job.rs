// Job Domain Model

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, Result};

/// Job ID (UUID v4, never reused after deletion)
pub type JobId = String;

/// User-entered fields of a job, before an id is assigned.
///
/// Used both for adding a new job and for wholesale replacement on edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDraft {
    pub name: String,
    pub description: String,
    pub query: String,
    /// Polling interval in seconds, must be >= 1
    pub frequency_secs: u32,
}

impl JobDraft {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation("job name must not be empty".into()));
        }
        if self.frequency_secs == 0 {
            return Err(DomainError::Validation(
                "job frequency must be at least 1 second".into(),
            ));
        }
        Ok(())
    }
}

/// Job definition - immutable once created, replaced wholesale on edit.
///
/// Serialized field names match the on-disk `jobs.json` format
/// (`frequency` in seconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDefinition {
    pub id: JobId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub query: String,
    #[serde(rename = "frequency")]
    pub frequency_secs: u32,
}

impl JobDefinition {
    /// Build a definition from a validated draft.
    ///
    /// # Errors
    /// - `DomainError::Validation` on empty name or zero frequency
    pub fn new(id: impl Into<JobId>, draft: JobDraft) -> Result<Self> {
        draft.validate()?;
        Ok(Self {
            id: id.into(),
            name: draft.name,
            description: draft.description,
            query: draft.query,
            frequency_secs: draft.frequency_secs,
        })
    }

    /// Polling interval as a `Duration`
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.frequency_secs))
    }
}
