use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError, mpsc};
use tracing::{debug, error, info, warn};

use crate::args::SaturationPolicy;
use crate::error::TargetError;
use crate::metrics::AttackResult;
use crate::shutdown::{ShutdownReceiver, wait_for_shutdown};
use crate::target::{RequestSpec, Targeter};

use super::super::rate::{RatePermit, RateScheduler};
use super::super::transport::Transport;
use super::EngineStats;
use super::worker::{WorkerContext, run_request};

pub(super) struct Dispatcher<T> {
    pub(super) scheduler: RateScheduler,
    pub(super) targeter: T,
    pub(super) transport: Arc<dyn Transport>,
    pub(super) slots: Arc<Semaphore>,
    pub(super) concurrency: usize,
    pub(super) timeout: Duration,
    pub(super) saturation: SaturationPolicy,
    pub(super) results_tx: mpsc::Sender<AttackResult>,
    pub(super) shutdown_rx: ShutdownReceiver,
}

enum Slot {
    /// A worker slot, and whether the dispatcher had to wait for it.
    Acquired(OwnedSemaphorePermit, bool),
    Dropped,
    Stopped,
}

impl<T: Targeter> Dispatcher<T> {
    /// Pulls permits until the schedule ends, then waits for every worker.
    pub(super) async fn run(mut self) -> Result<EngineStats, TargetError> {
        let mut stats = EngineStats::default();
        let mut saturation_logged = false;

        let outcome = loop {
            let next = tokio::select! {
                biased;
                () = wait_for_shutdown(&mut self.shutdown_rx) => {
                    info!("Shutdown requested, no further requests will be scheduled");
                    self.scheduler.cancel();
                    break Ok(());
                }
                permit = self.scheduler.next_permit() => permit,
            };
            let Some(permit) = next else {
                break Ok(());
            };
            stats.permits = stats.permits.saturating_add(1);

            let spec = match self.targeter.next() {
                Ok(spec) => spec,
                Err(TargetError::Exhausted) => {
                    info!("Target exhausted after {} requests", stats.dispatched);
                    break Ok(());
                }
                Err(err) => {
                    error!("Target failed, stopping the attack: {}", err);
                    self.scheduler.cancel();
                    break Err(err);
                }
            };

            let slot = match self.acquire_slot(&mut stats).await {
                Slot::Acquired(slot, waited) => {
                    if waited && !saturation_logged {
                        warn!(
                            "All {} workers busy, queueing requests behind the schedule",
                            self.concurrency
                        );
                        saturation_logged = true;
                    }
                    slot
                }
                Slot::Dropped => {
                    if !saturation_logged {
                        warn!(
                            "All {} workers busy, dropping requests (seq {})",
                            self.concurrency, permit.seq
                        );
                        saturation_logged = true;
                    }
                    stats.dispatched = stats.dispatched.saturating_add(1);
                    let result = AttackResult::overloaded(permit.seq, spec.body_len());
                    if self.results_tx.send(result).await.is_err() {
                        debug!("Result receiver closed, stopping dispatch");
                        break Ok(());
                    }
                    continue;
                }
                Slot::Stopped => break Ok(()),
            };
            stats.dispatched = stats.dispatched.saturating_add(1);
            self.spawn_worker(permit, spec, slot);
        };

        let Self {
            scheduler,
            slots,
            concurrency,
            results_tx,
            ..
        } = self;
        drop(results_tx);
        debug!(
            "Schedule finished after {} permits, draining in-flight requests",
            scheduler.issued()
        );
        drain(&slots, concurrency).await;
        info!(
            "Attack drained: {} dispatched, {} queued, {} dropped",
            stats.dispatched, stats.queued, stats.dropped
        );
        outcome.map(|()| stats)
    }

    async fn acquire_slot(&mut self, stats: &mut EngineStats) -> Slot {
        match Arc::clone(&self.slots).try_acquire_owned() {
            Ok(slot) => return Slot::Acquired(slot, false),
            Err(TryAcquireError::Closed) => return Slot::Stopped,
            Err(TryAcquireError::NoPermits) => {}
        }

        match self.saturation {
            SaturationPolicy::Drop => {
                stats.dropped = stats.dropped.saturating_add(1);
                Slot::Dropped
            }
            SaturationPolicy::Queue => {
                stats.queued = stats.queued.saturating_add(1);
                let canceller = self.scheduler.canceller();
                tokio::select! {
                    biased;
                    () = wait_for_shutdown(&mut self.shutdown_rx) => {
                        info!("Shutdown requested while queued, no further requests will be scheduled");
                        self.scheduler.cancel();
                        Slot::Stopped
                    }
                    () = canceller.cancelled() => Slot::Stopped,
                    slot = Arc::clone(&self.slots).acquire_owned() => match slot {
                        Ok(slot) => Slot::Acquired(slot, true),
                        Err(_closed) => Slot::Stopped,
                    },
                }
            }
        }
    }

    fn spawn_worker(&self, permit: RatePermit, spec: RequestSpec, slot: OwnedSemaphorePermit) {
        let context = WorkerContext {
            transport: Arc::clone(&self.transport),
            timeout: self.timeout,
            results_tx: self.results_tx.clone(),
        };
        tokio::spawn(run_request(context, permit, spec, slot));
    }
}

/// Resolves once every worker has released its slot.
async fn drain(slots: &Semaphore, concurrency: usize) {
    let concurrency = u32::try_from(concurrency).unwrap_or(u32::MAX);
    match slots.acquire_many(concurrency).await {
        Ok(all) => drop(all),
        Err(_closed) => debug!("Worker pool closed before drain"),
    }
}
