// PostgreSQL Probe Driver

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::{Column, Connection, Row, TypeInfo, ValueRef};
use tracing::debug;

use sqlpulse_core::domain::{DbSettings, ProbeError, ProbeValue};
use sqlpulse_core::port::ProbeDriver;

/// Probe driver backed by one short-lived PostgreSQL connection per run.
///
/// No pooling: a probe is a liveness check, and a cached connection would
/// mask exactly the connectivity failures it exists to detect.
pub struct PgProbeDriver;

impl PgProbeDriver {
    pub fn new() -> Self {
        Self
    }

    fn connect_options(settings: &DbSettings) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .database(&settings.dbname)
            .username(&settings.user)
            .password(&settings.password)
            .application_name("sqlpulse")
    }
}

impl Default for PgProbeDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProbeDriver for PgProbeDriver {
    async fn run(
        &self,
        settings: &DbSettings,
        query: &str,
    ) -> Result<Option<ProbeValue>, ProbeError> {
        let options = Self::connect_options(settings);
        let mut conn = PgConnection::connect_with(&options)
            .await
            .map_err(|e| ProbeError::Connection(e.to_string()))?;

        let fetched = sqlx::query(query)
            .fetch_optional(&mut conn)
            .await
            .map_err(|e| ProbeError::Query(e.to_string()));

        // Release the session regardless of the query outcome
        if let Err(e) = conn.close().await {
            debug!(error = %e, "Closing probe connection failed");
        }

        Ok(fetched?.map(|row| first_column(&row)))
    }
}

/// Decode the first column of the probe row.
///
/// Booleans decide Healthy/Unhealthy downstream; NULL and every other type
/// map to `Null`/`Other` and classify as Indeterminate. The `Other` payload
/// is the PostgreSQL type name, useful when diagnosing a misshapen probe.
fn first_column(row: &PgRow) -> ProbeValue {
    if row.is_empty() {
        return ProbeValue::Null;
    }
    if matches!(row.try_get_raw(0), Ok(value) if value.is_null()) {
        return ProbeValue::Null;
    }
    match row.try_get::<bool, _>(0) {
        Ok(b) => ProbeValue::Bool(b),
        Err(_) => ProbeValue::Other(row.column(0).type_info().name().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // No PostgreSQL instance is assumed in CI; what can be verified offline
    // is that connection failures surface as ProbeError::Connection with a
    // usable message, not as a panic or a hang.
    #[tokio::test]
    async fn unreachable_host_reports_connection_error() {
        let settings = DbSettings {
            host: "127.0.0.1".into(),
            port: 1,
            dbname: "postgres".into(),
            user: "postgres".into(),
            password: String::new(),
        };

        match PgProbeDriver::new().run(&settings, "SELECT true").await {
            Err(ProbeError::Connection(msg)) => assert!(!msg.is_empty()),
            other => panic!("expected connection error, got {:?}", other),
        }
    }
}
