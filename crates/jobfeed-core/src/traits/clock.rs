//! Time source abstraction.
//!
//! Everything that stamps or waits on wall-clock time goes through a
//! [`Clock`], so ingestion batches and scheduled fires can be driven
//! deterministically in tests.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::watch;

/// Longest single sleep taken by [`SystemClock`] before re-reading the
/// wall clock. Keeps long waits honest across suspend and clock steps.
const MAX_SLEEP_SLICE: Duration = Duration::from_secs(60);

/// A source of wall-clock time.
#[async_trait]
pub trait Clock: Send + Sync + fmt::Debug + 'static {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Resolve once `now() >= deadline`.
    async fn sleep_until(&self, deadline: DateTime<Utc>);
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep_until(&self, deadline: DateTime<Utc>) {
        loop {
            let remaining = match (deadline - Utc::now()).to_std() {
                Ok(d) if !d.is_zero() => d,
                _ => return,
            };
            tokio::time::sleep(remaining.min(MAX_SLEEP_SLICE)).await;
        }
    }
}

/// A clock that only moves when told to.
///
/// Sleepers are woken whenever the time is advanced past their deadline.
pub struct ManualClock {
    now: watch::Sender<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        let (now, _) = watch::channel(start);
        Self { now }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: chrono::Duration) {
        self.now.send_modify(|now| *now += by);
    }

    /// Jump to an absolute instant.
    pub fn set(&self, to: DateTime<Utc>) {
        self.now.send_replace(to);
    }
}

impl fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualClock")
            .field("now", &*self.now.borrow())
            .finish()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.borrow()
    }

    async fn sleep_until(&self, deadline: DateTime<Utc>) {
        let mut rx = self.now.subscribe();
        loop {
            if *rx.borrow_and_update() >= deadline {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new(start());
        clock.advance(chrono::Duration::hours(2));
        assert_eq!(clock.now(), start() + chrono::Duration::hours(2));
    }

    #[tokio::test]
    async fn test_manual_sleep_wakes_on_advance() {
        let clock = Arc::new(ManualClock::new(start()));
        let deadline = start() + chrono::Duration::minutes(30);

        let sleeper = {
            let clock = Arc::clone(&clock);
            tokio::spawn(async move { clock.sleep_until(deadline).await })
        };

        tokio::task::yield_now().await;
        assert!(!sleeper.is_finished());

        clock.advance(chrono::Duration::minutes(10));
        tokio::task::yield_now().await;
        assert!(!sleeper.is_finished());

        clock.advance(chrono::Duration::minutes(20));
        sleeper.await.unwrap();
    }

    #[tokio::test]
    async fn test_manual_sleep_past_deadline_returns_immediately() {
        let clock = ManualClock::new(start());
        clock.sleep_until(start() - chrono::Duration::seconds(1)).await;
    }
}
