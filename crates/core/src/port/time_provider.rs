// Time Provider Port (for testability)

use chrono::{DateTime, Utc};

/// Time provider interface (allows mocking in tests)
pub trait TimeProvider: Send + Sync {
    /// Get the current wall-clock time
    fn now(&self) -> DateTime<Utc>;
}

/// System time provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Fixed-time provider for deterministic tests
    pub struct FixedTimeProvider {
        now: Mutex<DateTime<Utc>>,
    }

    impl FixedTimeProvider {
        pub fn new(now: DateTime<Utc>) -> Self {
            Self { now: Mutex::new(now) }
        }

        pub fn set(&self, now: DateTime<Utc>) {
            *self.now.lock().unwrap() = now;
        }
    }

    impl TimeProvider for FixedTimeProvider {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }
}
