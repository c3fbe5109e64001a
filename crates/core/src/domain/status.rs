// Probe Result Model & Classifier

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// First column of the probe row, as decoded by the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeValue {
    Bool(bool),
    /// Row present but first column is SQL NULL (or the row has no columns)
    Null,
    /// Non-boolean value; payload is the column type name, kept for diagnostics
    Other(String),
}

/// Failure modes of a single probe run
#[derive(Error, Debug, Clone)]
pub enum ProbeError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
}

/// Classification of a job's latest probe result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProbeStatus {
    /// Never executed since the job was added
    Unknown,
    Healthy,
    Unhealthy,
    Indeterminate,
    Error(String),
}

impl std::fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeStatus::Unknown => write!(f, "Unknown"),
            ProbeStatus::Healthy => write!(f, "Healthy"),
            ProbeStatus::Unhealthy => write!(f, "Unhealthy"),
            ProbeStatus::Indeterminate => write!(f, "Indeterminate"),
            ProbeStatus::Error(msg) => write!(f, "Error: {}", msg),
        }
    }
}

/// Map a raw probe outcome to a status. Pure and deterministic.
///
/// A boolean first column decides Healthy/Unhealthy; a missing row, a NULL
/// first column, and any non-boolean value all collapse to Indeterminate.
pub fn classify(outcome: Result<Option<ProbeValue>, ProbeError>) -> ProbeStatus {
    match outcome {
        Err(e) => ProbeStatus::Error(e.to_string()),
        Ok(None) => ProbeStatus::Indeterminate,
        Ok(Some(ProbeValue::Bool(true))) => ProbeStatus::Healthy,
        Ok(Some(ProbeValue::Bool(false))) => ProbeStatus::Unhealthy,
        Ok(Some(ProbeValue::Null)) => ProbeStatus::Indeterminate,
        Ok(Some(ProbeValue::Other(_))) => ProbeStatus::Indeterminate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_true_is_healthy() {
        assert_eq!(
            classify(Ok(Some(ProbeValue::Bool(true)))),
            ProbeStatus::Healthy
        );
    }

    #[test]
    fn boolean_false_is_unhealthy() {
        assert_eq!(
            classify(Ok(Some(ProbeValue::Bool(false)))),
            ProbeStatus::Unhealthy
        );
    }

    #[test]
    fn missing_row_is_indeterminate() {
        assert_eq!(classify(Ok(None)), ProbeStatus::Indeterminate);
    }

    #[test]
    fn null_column_is_indeterminate() {
        assert_eq!(
            classify(Ok(Some(ProbeValue::Null))),
            ProbeStatus::Indeterminate
        );
    }

    #[test]
    fn non_boolean_is_indeterminate() {
        assert_eq!(
            classify(Ok(Some(ProbeValue::Other("int4".into())))),
            ProbeStatus::Indeterminate
        );
    }

    #[test]
    fn driver_errors_carry_a_message() {
        for err in [
            ProbeError::Connection("refused".into()),
            ProbeError::Query("syntax error".into()),
            ProbeError::Timeout(Duration::from_secs(5)),
        ] {
            match classify(Err(err)) {
                ProbeStatus::Error(msg) => assert!(!msg.is_empty()),
                other => panic!("expected Error status, got {:?}", other),
            }
        }
    }

    #[test]
    fn display_matches_observer_text() {
        assert_eq!(ProbeStatus::Healthy.to_string(), "Healthy");
        assert_eq!(
            ProbeStatus::Error("boom".into()).to_string(),
            "Error: boom"
        );
    }
}
