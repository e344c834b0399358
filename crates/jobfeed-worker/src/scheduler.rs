//! Daily wall-clock triggers.
//!
//! Each trigger runs in its own tokio task, sleeping on the injected
//! [`Clock`] until its next fire time. A fire spawns the task run and goes
//! straight back to sleep, so a slow run never delays the other trigger.
//! A fire that lands while the previous run of the same trigger is still
//! going is skipped, not queued.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use jobfeed_core::config::{SchedulerConfig, TriggerConfig};
use jobfeed_core::error::AppError;
use jobfeed_core::result::AppResult;
use jobfeed_core::traits::Clock;

/// Name of the daily ingestion trigger.
pub const INGESTION_TRIGGER: &str = "ingestion";

/// Name of the daily expiry cleanup trigger.
pub const EXPIRY_TRIGGER: &str = "expiry";

/// How long `stop` waits for a running task before giving up on it.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Work run by a trigger.
#[async_trait]
pub trait ScheduledTask: Send + Sync + fmt::Debug + 'static {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Run once for the fire scheduled at `fired_at`.
    async fn run(&self, fired_at: DateTime<Utc>) -> AppResult<Value>;
}

/// Counters for one trigger since the scheduler was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerStats {
    /// Fire events, including skipped and disabled ones.
    pub fired: u64,
    /// Fires dropped because the previous run was still going.
    pub skipped: u64,
    /// Runs that returned successfully.
    pub completed: u64,
    /// Runs that returned an error or panicked.
    pub failed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    fired: AtomicU64,
    skipped: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> TriggerStats {
        TriggerStats {
            fired: self.fired.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug)]
struct Trigger {
    name: &'static str,
    fire_at: NaiveTime,
    enabled: bool,
    task: Arc<dyn ScheduledTask>,
    counters: Counters,
}

/// Owns the ingestion and expiry triggers.
#[derive(Debug)]
pub struct Scheduler {
    clock: Arc<dyn Clock>,
    timezone: Tz,
    triggers: Vec<Arc<Trigger>>,
    cancel: watch::Sender<bool>,
    loops: Mutex<Vec<JoinHandle<()>>>,
}

impl Scheduler {
    /// Build the two triggers from configuration.
    ///
    /// The expiry trigger is always enabled, whatever the configuration
    /// says.
    pub fn new(
        clock: Arc<dyn Clock>,
        config: &SchedulerConfig,
        ingestion: Arc<dyn ScheduledTask>,
        expiry: Arc<dyn ScheduledTask>,
    ) -> Self {
        let trigger = |name, cfg: &TriggerConfig, enabled, task| {
            Arc::new(Trigger {
                name,
                fire_at: cfg.fire_at,
                enabled,
                task,
                counters: Counters::default(),
            })
        };
        let (cancel, _) = watch::channel(false);

        Self {
            clock,
            timezone: config.timezone,
            triggers: vec![
                trigger(
                    INGESTION_TRIGGER,
                    &config.ingestion,
                    config.ingestion.enabled,
                    ingestion,
                ),
                trigger(EXPIRY_TRIGGER, &config.expiry, true, expiry),
            ],
            cancel,
            loops: Mutex::new(Vec::new()),
        }
    }

    /// Spawn one loop per trigger. Fails if the scheduler is already
    /// running.
    pub async fn start(&self) -> AppResult<()> {
        let mut loops = self.loops.lock().await;
        if !loops.is_empty() {
            return Err(AppError::internal("Scheduler is already running"));
        }
        self.cancel.send_replace(false);

        for trigger in &self.triggers {
            tracing::info!(
                "Trigger '{}' scheduled daily at {} {} (task '{}', enabled={})",
                trigger.name,
                trigger.fire_at,
                self.timezone,
                trigger.task.name(),
                trigger.enabled
            );
            loops.push(tokio::spawn(trigger_loop(
                Arc::clone(trigger),
                Arc::clone(&self.clock),
                self.timezone,
                self.cancel.subscribe(),
            )));
        }

        tracing::info!("Scheduler started with {} triggers", loops.len());
        Ok(())
    }

    /// Stop firing and wait for in-flight runs to finish.
    pub async fn stop(&self) {
        self.cancel.send_replace(true);
        let loops: Vec<_> = self.loops.lock().await.drain(..).collect();
        for handle in loops {
            if let Err(e) = handle.await {
                tracing::error!("Trigger loop ended abnormally: {}", e);
            }
        }
        tracing::info!("Scheduler stopped");
    }

    /// Counters for the trigger called `name`.
    pub fn stats(&self, name: &str) -> Option<TriggerStats> {
        self.triggers
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.counters.snapshot())
    }

    /// Next fire instant of the trigger called `name`, as seen from the
    /// clock's current time.
    pub fn next_fire(&self, name: &str) -> Option<DateTime<Utc>> {
        self.triggers
            .iter()
            .find(|t| t.name == name)
            .map(|t| next_fire_after(self.clock.now(), t.fire_at, self.timezone))
    }
}

async fn trigger_loop(
    trigger: Arc<Trigger>,
    clock: Arc<dyn Clock>,
    timezone: Tz,
    mut cancel: watch::Receiver<bool>,
) {
    let mut current: Option<JoinHandle<()>> = None;

    loop {
        if *cancel.borrow() {
            break;
        }
        let next = next_fire_after(clock.now(), trigger.fire_at, timezone);
        tracing::debug!("Trigger '{}' next fires at {}", trigger.name, next);

        tokio::select! {
            changed = cancel.changed() => {
                if changed.is_err() || *cancel.borrow() {
                    break;
                }
                continue;
            }
            _ = clock.sleep_until(next) => {}
        }

        trigger.counters.fired.fetch_add(1, Ordering::Relaxed);

        if !trigger.enabled {
            tracing::info!("Trigger '{}' is disabled; fire at {} ignored", trigger.name, next);
            continue;
        }

        if current.as_ref().is_some_and(|run| !run.is_finished()) {
            trigger.counters.skipped.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                "Trigger '{}' fired at {} while the previous run is still going; skipped",
                trigger.name,
                next
            );
            continue;
        }

        current = Some(tokio::spawn(execute(Arc::clone(&trigger), next)));
    }

    if let Some(run) = current.filter(|run| !run.is_finished()) {
        tracing::info!("Waiting for in-flight '{}' run to finish...", trigger.name);
        if tokio::time::timeout(DRAIN_TIMEOUT, run).await.is_err() {
            tracing::warn!("'{}' run did not finish within {:?}", trigger.name, DRAIN_TIMEOUT);
        }
    }
}

/// Run the trigger's task once and record the outcome. The task runs in its
/// own tokio task so a panic is contained and counted as a failure.
async fn execute(trigger: Arc<Trigger>, fired_at: DateTime<Utc>) {
    let task = Arc::clone(&trigger.task);
    tracing::info!(
        "Trigger '{}' fired at {}; running task '{}'",
        trigger.name,
        fired_at,
        task.name()
    );
    let started = Instant::now();

    match tokio::spawn(async move { task.run(fired_at).await }).await {
        Ok(Ok(result)) => {
            trigger.counters.completed.fetch_add(1, Ordering::Relaxed);
            tracing::info!(
                "Trigger '{}' completed in {:?}: {}",
                trigger.name,
                started.elapsed(),
                result
            );
        }
        Ok(Err(e)) => {
            trigger.counters.failed.fetch_add(1, Ordering::Relaxed);
            tracing::error!("Trigger '{}' failed: {}", trigger.name, e);
        }
        Err(e) => {
            trigger.counters.failed.fetch_add(1, Ordering::Relaxed);
            tracing::error!("Trigger '{}' task aborted: {}", trigger.name, e);
        }
    }
}

/// First instant strictly after `now` whose wall-clock time in `timezone`
/// is `fire_at`.
///
/// A fire time inside a DST gap moves forward by the gap; an ambiguous one
/// uses the earlier instant.
pub fn next_fire_after(now: DateTime<Utc>, fire_at: NaiveTime, timezone: Tz) -> DateTime<Utc> {
    let mut date = now.with_timezone(&timezone).date_naive();

    for _ in 0..4 {
        let local = date.and_time(fire_at);
        let candidate = timezone
            .from_local_datetime(&local)
            .earliest()
            .or_else(|| {
                timezone
                    .from_local_datetime(&(local + chrono::Duration::hours(1)))
                    .earliest()
            })
            .map(|t| t.with_timezone(&Utc));

        if let Some(fire) = candidate.filter(|fire| *fire > now) {
            return fire;
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    now + chrono::Duration::days(1)
}
