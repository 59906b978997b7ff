use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};

use crate::args::Rate;
use crate::error::ValidationError;

/// Horizon used when `start + duration` overflows (about 30 years).
const FAR_FUTURE: Duration = Duration::from_secs(946_080_000);

/// How many permits a rate yields over a duration, and when each is due.
///
/// Permit `n` is due at `start + n * per / freq`. There is no partial final
/// tick: `total = floor(freq * duration / per)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePlan {
    rate: Rate,
    duration: Duration,
    total: u64,
}

impl RatePlan {
    /// Validates the rate and duration and counts the permits.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero rate, a zero duration, or a combination
    /// that schedules no permit at all.
    pub fn new(rate: Rate, duration: Duration) -> Result<Self, ValidationError> {
        if rate.is_zero() {
            return Err(ValidationError::RateZero);
        }
        if duration.is_zero() {
            return Err(ValidationError::DurationZero);
        }
        let total = rate.permits_over(duration);
        if total == 0 {
            return Err(ValidationError::NoRequestsScheduled {
                rate: rate.to_string(),
                duration_ms: duration.as_millis(),
            });
        }
        Ok(Self {
            rate,
            duration,
            total,
        })
    }

    #[must_use]
    pub const fn rate(&self) -> Rate {
        self.rate
    }

    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    #[must_use]
    pub const fn total_permits(&self) -> u64 {
        self.total
    }
}

/// Authorises exactly one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePermit {
    pub seq: u64,
    pub due: Instant,
}

/// Stops a running `RateScheduler` from any task.
#[derive(Debug, Clone)]
pub struct SchedulerCancel {
    tx: Arc<watch::Sender<bool>>,
}

impl SchedulerCancel {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_modify(|cancelled| *cancelled = true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once `cancel` has been called.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        wait_cancelled(&mut rx).await;
    }
}

async fn wait_cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Lazy, finite sequence of permits paced against absolute deadlines.
///
/// The schedule ends after `total_permits`, on cancellation, or once
/// `start + duration` has passed, whichever comes first. Permits released
/// late never accumulate drift because every deadline derives from `start`.
#[derive(Debug)]
pub struct RateScheduler {
    plan: RatePlan,
    start: Instant,
    end: Instant,
    next_seq: u64,
    cancel: SchedulerCancel,
    cancel_rx: watch::Receiver<bool>,
}

impl RateScheduler {
    /// Starts the schedule now; permit 0 is due immediately.
    #[must_use]
    pub fn start(plan: RatePlan) -> Self {
        let start = Instant::now();
        let end = start
            .checked_add(plan.duration())
            .unwrap_or_else(far_future);
        let cancel = SchedulerCancel::new();
        let cancel_rx = cancel.tx.subscribe();
        Self {
            plan,
            start,
            end,
            next_seq: 0,
            cancel,
            cancel_rx,
        }
    }

    #[must_use]
    pub const fn plan(&self) -> &RatePlan {
        &self.plan
    }

    #[must_use]
    pub const fn started_at(&self) -> Instant {
        self.start
    }

    /// Number of permits handed out so far.
    #[must_use]
    pub const fn issued(&self) -> u64 {
        self.next_seq
    }

    #[must_use]
    pub fn canceller(&self) -> SchedulerCancel {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the next permit. `None` once the schedule is over.
    pub async fn next_permit(&mut self) -> Option<RatePermit> {
        if self.cancel.is_cancelled() || self.next_seq >= self.plan.total_permits() {
            return None;
        }
        if Instant::now() >= self.end {
            return None;
        }

        let due = self
            .start
            .checked_add(self.plan.rate().offset_for(self.next_seq))
            .unwrap_or(self.end);
        tokio::select! {
            biased;
            () = wait_cancelled(&mut self.cancel_rx) => return None,
            () = sleep_until(due) => {}
        }
        if Instant::now() >= self.end {
            return None;
        }

        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        Some(RatePermit { seq, due })
    }
}

fn far_future() -> Instant {
    Instant::now()
        .checked_add(FAR_FUTURE)
        .unwrap_or_else(Instant::now)
}
