//! Fixed-rate attack engine: permits in, one result out per dispatched request.
mod dispatcher;
mod worker;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tracing::info;

use crate::args::{Rate, SaturationPolicy};
use crate::error::{AppError, AppResult, TargetError, ValidationError};
use crate::metrics::AttackResult;
use crate::shutdown::ShutdownSender;
use crate::target::Targeter;

use super::rate::{RatePlan, RateScheduler, SchedulerCancel};
use super::transport::Transport;
use dispatcher::Dispatcher;

/// Results buffered between workers and the consumer.
const RESULT_BUFFER: usize = 4_096;

/// Largest worker pool an attack accepts; the drain acquires it as one `u32` batch.
pub const MAX_CONCURRENCY: usize = 1_000_000;

#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    pub rate: Rate,
    pub duration: Duration,
    /// Maximum number of requests in flight.
    pub concurrency: usize,
    /// Per-request deadline; a request still running after it is a timeout.
    pub timeout: Duration,
    pub saturation: SaturationPolicy,
}

/// Dispatch counters, available once the attack has drained.
///
/// `dispatched` counts every request that produced a result, so it includes
/// the `dropped` ones. `permits - dispatched` were issued but never turned
/// into a request (target exhausted or shutdown while queued).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub permits: u64,
    pub dispatched: u64,
    pub queued: u64,
    pub dropped: u64,
}

/// A running attack.
///
/// Drain it with `next_result` until `None`, then call `finish`.
#[derive(Debug)]
pub struct Attack {
    plan: RatePlan,
    results_rx: mpsc::Receiver<AttackResult>,
    dispatcher: JoinHandle<Result<EngineStats, TargetError>>,
    cancel: SchedulerCancel,
}

impl Attack {
    /// Next result in completion order. `None` once the schedule is over and
    /// every in-flight request has reported.
    pub async fn next_result(&mut self) -> Option<AttackResult> {
        self.results_rx.recv().await
    }

    #[must_use]
    pub const fn plan(&self) -> &RatePlan {
        &self.plan
    }

    /// Stops issuing permits. Requests already in flight still report.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn canceller(&self) -> SchedulerCancel {
        self.cancel.clone()
    }

    /// Waits for the dispatcher and returns its counters.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Target` when the targeter failed fatally, or a join
    /// error if the dispatcher task panicked.
    pub async fn finish(self) -> AppResult<EngineStats> {
        drop(self.results_rx);
        let stats = self.dispatcher.await??;
        Ok(stats)
    }
}

/// Validates the settings and starts the attack.
///
/// Nothing is spawned when validation fails. Must be called within a tokio
/// runtime.
///
/// # Errors
///
/// Returns a validation error for a zero rate, duration, timeout or
/// concurrency, or a rate/duration pair that schedules no request.
pub fn attack<T>(
    targeter: T,
    transport: Arc<dyn Transport>,
    settings: EngineSettings,
    shutdown_tx: &ShutdownSender,
) -> AppResult<Attack>
where
    T: Targeter + 'static,
{
    let plan = RatePlan::new(settings.rate, settings.duration).map_err(AppError::validation)?;
    if settings.concurrency == 0 {
        return Err(AppError::validation(ValidationError::ConcurrencyZero));
    }
    if settings.concurrency > MAX_CONCURRENCY {
        return Err(AppError::validation(ValidationError::ConcurrencyTooLarge {
            value: settings.concurrency,
            max: MAX_CONCURRENCY,
        }));
    }
    if settings.timeout.is_zero() {
        return Err(AppError::validation(ValidationError::TimeoutZero));
    }

    info!(
        "Attacking at {} for {}ms: {} requests, concurrency {}, saturation {}",
        plan.rate(),
        plan.duration().as_millis(),
        plan.total_permits(),
        settings.concurrency,
        settings.saturation.as_str()
    );

    let scheduler = RateScheduler::start(plan);
    let cancel = scheduler.canceller();
    let (results_tx, results_rx) = mpsc::channel(RESULT_BUFFER);
    let dispatcher = Dispatcher {
        scheduler,
        targeter,
        transport,
        slots: Arc::new(Semaphore::new(settings.concurrency)),
        concurrency: settings.concurrency,
        timeout: settings.timeout,
        saturation: settings.saturation,
        results_tx,
        shutdown_rx: shutdown_tx.subscribe(),
    };

    Ok(Attack {
        plan,
        results_rx,
        dispatcher: tokio::spawn(dispatcher.run()),
        cancel,
    })
}
