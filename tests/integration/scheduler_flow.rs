//! Integration tests for the daily triggers driving the real tasks.

mod helpers;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{NaiveTime, TimeZone, Utc};

use jobfeed_core::config::{SchedulerConfig, TriggerConfig};
use jobfeed_ingest::ExpiryReaper;
use jobfeed_worker::{
    DailyIngestionTask, EXPIRY_TRIGGER, ExpiryCleanupTask, INGESTION_TRIGGER, Scheduler,
};

use helpers::{TestEnv, batch_time};

fn config() -> SchedulerConfig {
    SchedulerConfig {
        timezone: chrono_tz::Tz::UTC,
        ingestion: TriggerConfig {
            enabled: true,
            fire_at: NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
        },
        expiry: TriggerConfig {
            enabled: true,
            fire_at: NaiveTime::from_hms_opt(1, 0, 0).unwrap(),
        },
    }
}

/// Give the trigger loops real time to run; parsing happens on the
/// blocking pool, so yielding alone is not enough.
async fn wait_for(scheduler: &Scheduler, trigger: &str, completed: u64) {
    for _ in 0..200 {
        if scheduler
            .stats(trigger)
            .is_some_and(|s| s.completed + s.failed >= completed)
        {
            return;
        }
        tokio::time::sleep(StdDuration::from_millis(10)).await;
    }
    panic!("trigger '{trigger}' did not complete {completed} runs");
}

#[tokio::test]
async fn test_daily_ingestion_then_expiry_purge() {
    let start = Utc.with_ymd_and_hms(2026, 6, 1, 20, 0, 0).unwrap();
    let env = TestEnv::new(r#"{"C5": "Berlin"}"#, start);
    env.write_file(
        "2026-06-01.csv",
        "title,company_name,location,job_apply_url\nEngineer,Acme,C5,https://acme.com/jobs/eng\n",
    );

    let ingestion = Arc::new(DailyIngestionTask::new(
        env.pipeline.clone(),
        &env.config,
        chrono_tz::Tz::UTC,
    ));
    let expiry = Arc::new(ExpiryCleanupTask::new(
        ExpiryReaper::new(env.store.clone()),
        env.clock.clone(),
    ));
    let scheduler = Scheduler::new(env.clock.clone(), &config(), ingestion, expiry);
    scheduler.start().await.unwrap();
    tokio::time::sleep(StdDuration::from_millis(50)).await;

    assert_eq!(scheduler.next_fire(INGESTION_TRIGGER), Some(batch_time()));

    env.clock.set(batch_time());
    wait_for(&scheduler, INGESTION_TRIGGER, 1).await;

    let stats = scheduler.stats(INGESTION_TRIGGER).unwrap();
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.failed, 0);
    let jobs = env.store.all_jobs().await;
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].location, "Berlin");
    assert_eq!(jobs[0].created_at, batch_time());
    assert!(env.archived("2026-06-01_20260601_210000.csv").exists());
    assert!(env.dir.path().join("2026-06-01.csv").exists());
    assert_eq!(scheduler.stats(EXPIRY_TRIGGER).unwrap().fired, 0);

    // Sixty days and change later the expiry trigger purges the posting.
    env.clock
        .set(Utc.with_ymd_and_hms(2026, 8, 1, 3, 0, 0).unwrap());
    wait_for(&scheduler, EXPIRY_TRIGGER, 1).await;

    assert_eq!(scheduler.stats(EXPIRY_TRIGGER).unwrap().completed, 1);
    assert!(env.store.all_jobs().await.is_empty());
    assert_eq!(
        scheduler.next_fire(EXPIRY_TRIGGER),
        Some(Utc.with_ymd_and_hms(2026, 8, 2, 1, 0, 0).unwrap())
    );

    scheduler.stop().await;
}

#[tokio::test]
async fn test_missing_drop_file_completes_quietly() {
    let start = Utc.with_ymd_and_hms(2026, 6, 1, 20, 59, 0).unwrap();
    let env = TestEnv::new("{}", start);

    let ingestion = Arc::new(DailyIngestionTask::new(
        env.pipeline.clone(),
        &env.config,
        chrono_tz::Tz::UTC,
    ));
    let expiry = Arc::new(ExpiryCleanupTask::new(
        ExpiryReaper::new(env.store.clone()),
        env.clock.clone(),
    ));
    let scheduler = Scheduler::new(env.clock.clone(), &config(), ingestion, expiry);
    scheduler.start().await.unwrap();
    tokio::time::sleep(StdDuration::from_millis(50)).await;

    env.clock.set(batch_time());
    wait_for(&scheduler, INGESTION_TRIGGER, 1).await;

    let stats = scheduler.stats(INGESTION_TRIGGER).unwrap();
    assert_eq!(stats.fired, 1);
    assert_eq!(stats.completed, 1);
    assert!(env.store.all_jobs().await.is_empty());

    scheduler.stop().await;
}
