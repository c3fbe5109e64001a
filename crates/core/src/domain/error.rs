// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Duplicate job id: {0}")]
    DuplicateJob(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
