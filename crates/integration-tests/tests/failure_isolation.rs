// Failure Isolation & Settings Snapshot Tests

use std::sync::Arc;
use std::time::Duration;

use sqlpulse_core::application::{ProbeExecutor, Scheduler, StateStore};
use sqlpulse_core::domain::{DbSettings, JobDefinition, JobDraft, ProbeError, ProbeStatus, ProbeValue};
use sqlpulse_core::port::probe_driver::mocks::{MockBehavior, MockProbeDriver};
use sqlpulse_core::port::time_provider::SystemTimeProvider;

fn engine(driver: Arc<MockProbeDriver>) -> Scheduler {
    let executor = Arc::new(ProbeExecutor::new(driver, Arc::new(SystemTimeProvider)));
    Scheduler::new(executor, Arc::new(StateStore::new()), DbSettings::default())
}

fn definition(id: &str, query: &str, frequency_secs: u32) -> JobDefinition {
    JobDefinition::new(
        id,
        JobDraft {
            name: format!("probe {}", id),
            description: String::new(),
            query: query.into(),
            frequency_secs,
        },
    )
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn failing_job_never_touches_its_siblings() {
    let driver = Arc::new(MockProbeDriver::healthy());
    driver.script(
        "SELECT 1 FROM dead_db",
        MockBehavior::Fail(ProbeError::Connection("connection refused".into())),
    );
    let scheduler = engine(driver.clone());

    scheduler.add_job(definition("ok", "SELECT true", 1)).await.unwrap();
    scheduler.add_job(definition("down", "SELECT 1 FROM dead_db", 1)).await.unwrap();
    scheduler.enable("ok").await.unwrap();
    scheduler.enable("down").await.unwrap();

    tokio::time::sleep(Duration::from_millis(3100)).await;

    let jobs = scheduler.jobs().await;
    let ok = jobs.iter().find(|j| j.definition.id == "ok").unwrap();
    let down = jobs.iter().find(|j| j.definition.id == "down").unwrap();

    assert_eq!(ok.state.last_status, ProbeStatus::Healthy);
    assert!(ok.state.last_run_at.is_some());
    assert!(matches!(down.state.last_status, ProbeStatus::Error(_)));

    // Both cadences kept running, independently
    assert_eq!(driver.calls_for("SELECT true"), 3);
    assert_eq!(driver.calls_for("SELECT 1 FROM dead_db"), 3);
}

#[tokio::test(start_paused = true)]
async fn hung_probe_does_not_starve_other_jobs() {
    let driver = Arc::new(MockProbeDriver::healthy());
    driver.script(
        "SELECT hang()",
        MockBehavior::Delay(Duration::from_secs(3600), Some(ProbeValue::Bool(true))),
    );
    let scheduler = engine(driver.clone());

    scheduler.add_job(definition("hung", "SELECT hang()", 1)).await.unwrap();
    scheduler.add_job(definition("ok", "SELECT true", 1)).await.unwrap();
    scheduler.enable("hung").await.unwrap();
    scheduler.enable("ok").await.unwrap();

    tokio::time::sleep(Duration::from_millis(5100)).await;

    // The hung probe claimed its first cycle and is still in flight
    assert_eq!(driver.calls_for("SELECT hang()"), 1);
    // The healthy sibling fired on every interval regardless
    assert_eq!(driver.calls_for("SELECT true"), 5);
    assert_eq!(
        scheduler.jobs().await.iter().find(|j| j.definition.id == "ok").unwrap().state.last_status,
        ProbeStatus::Healthy
    );
}

#[tokio::test(start_paused = true)]
async fn in_flight_run_keeps_its_settings_snapshot() {
    let driver = Arc::new(MockProbeDriver::new(MockBehavior::Delay(
        Duration::from_millis(1200),
        Some(ProbeValue::Bool(true)),
    )));
    let scheduler = engine(driver.clone());

    scheduler
        .update_settings(DbSettings {
            host: "old-primary".into(),
            ..DbSettings::default()
        })
        .await;

    scheduler.add_job(definition("a", "SELECT true", 1)).await.unwrap();
    scheduler.enable("a").await.unwrap();

    // First run starts at t=1000 against old-primary; replace settings while
    // it is still in flight
    tokio::time::sleep(Duration::from_millis(1500)).await;
    scheduler
        .update_settings(DbSettings {
            host: "new-primary".into(),
            ..DbSettings::default()
        })
        .await;

    // t=2000 tick skipped (in flight until 2200); next run starts t=3000
    tokio::time::sleep(Duration::from_millis(1700)).await;

    let calls = driver.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].settings.host, "old-primary");
    assert_eq!(calls[1].settings.host, "new-primary");
}
