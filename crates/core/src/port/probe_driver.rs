// Probe Driver Port
// Abstraction over "open a connection, run one query, fetch one row"

use crate::domain::{DbSettings, ProbeError, ProbeValue};
use async_trait::async_trait;

/// Probe driver trait
///
/// Implementations:
/// - PgProbeDriver: sqlx/PostgreSQL (infra-postgres crate)
/// - mocks::MockProbeDriver: scripted outcomes for tests
#[async_trait]
pub trait ProbeDriver: Send + Sync {
    /// Run `query` against the database described by `settings` and return
    /// the first row's first column, if any.
    ///
    /// One connection per call; the connection must be released regardless
    /// of outcome.
    ///
    /// # Errors
    /// - `ProbeError::Connection` if the database cannot be reached or
    ///   authentication fails
    /// - `ProbeError::Query` if the statement fails to execute
    async fn run(
        &self,
        settings: &DbSettings,
        query: &str,
    ) -> Result<Option<ProbeValue>, ProbeError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scripted outcome of a mock probe run
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Return the value immediately
        Value(Option<ProbeValue>),
        /// Fail with the given error
        Fail(ProbeError),
        /// Sleep, then return the value (for overlap/cancellation tests)
        Delay(Duration, Option<ProbeValue>),
    }

    /// One observed driver invocation
    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub query: String,
        pub settings: DbSettings,
    }

    /// Mock probe driver with per-query scripted behaviors.
    ///
    /// Tracks every call (query + settings snapshot) and the maximum number
    /// of concurrently running invocations, so tests can assert both the
    /// settings-snapshot rule and the no-overlap guarantee.
    pub struct MockProbeDriver {
        default: Mutex<MockBehavior>,
        by_query: Mutex<HashMap<String, MockBehavior>>,
        calls: Mutex<Vec<RecordedCall>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl MockProbeDriver {
        pub fn new(default: MockBehavior) -> Self {
            Self {
                default: Mutex::new(default),
                by_query: Mutex::new(HashMap::new()),
                calls: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        /// Driver that answers every query with boolean true
        pub fn healthy() -> Self {
            Self::new(MockBehavior::Value(Some(ProbeValue::Bool(true))))
        }

        /// Script a behavior for one exact query text
        pub fn script(&self, query: impl Into<String>, behavior: MockBehavior) {
            self.by_query.lock().unwrap().insert(query.into(), behavior);
        }

        /// Replace the default behavior for unscripted queries
        pub fn set_default(&self, behavior: MockBehavior) {
            *self.default.lock().unwrap() = behavior;
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn calls_for(&self, query: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.query == query)
                .count()
        }

        /// Highest number of invocations ever observed running at once
        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }

        fn behavior_for(&self, query: &str) -> MockBehavior {
            self.by_query
                .lock()
                .unwrap()
                .get(query)
                .cloned()
                .unwrap_or_else(|| self.default.lock().unwrap().clone())
        }
    }

    #[async_trait]
    impl ProbeDriver for MockProbeDriver {
        async fn run(
            &self,
            settings: &DbSettings,
            query: &str,
        ) -> Result<Option<ProbeValue>, ProbeError> {
            self.calls.lock().unwrap().push(RecordedCall {
                query: query.to_string(),
                settings: settings.clone(),
            });

            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);

            let result = match self.behavior_for(query) {
                MockBehavior::Value(v) => Ok(v),
                MockBehavior::Fail(e) => Err(e),
                MockBehavior::Delay(duration, v) => {
                    tokio::time::sleep(duration).await;
                    Ok(v)
                }
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }
}
