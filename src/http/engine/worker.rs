use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{OwnedSemaphorePermit, mpsc};
use tokio::time::Instant;
use tracing::debug;

use crate::metrics::{AttackResult, RequestFailure};
use crate::target::RequestSpec;

use super::super::rate::RatePermit;
use super::super::transport::Transport;

pub(super) struct WorkerContext {
    pub(super) transport: Arc<dyn Transport>,
    pub(super) timeout: Duration,
    pub(super) results_tx: mpsc::Sender<AttackResult>,
}

/// Sends one request and reports exactly one result. The slot is released
/// only after the result is queued, so a finished drain means every result
/// has been handed to the consumer.
pub(super) async fn run_request(
    context: WorkerContext,
    permit: RatePermit,
    spec: RequestSpec,
    slot: OwnedSemaphorePermit,
) {
    let bytes_out = spec.body_len();
    let timestamp = Utc::now();
    let started_at = Instant::now();

    let outcome = tokio::time::timeout(context.timeout, context.transport.send(spec)).await;
    let ended_at = Instant::now();
    let (status, bytes_in, error) = match outcome {
        Ok(Ok(response)) => (response.status, response.bytes_in, None),
        Ok(Err(failure)) => (0, 0, Some(failure)),
        Err(_elapsed) => (0, 0, Some(RequestFailure::timeout(context.timeout))),
    };

    let result = AttackResult {
        seq: permit.seq,
        timestamp,
        started_at,
        ended_at,
        latency: ended_at.saturating_duration_since(started_at),
        status,
        bytes_in,
        bytes_out,
        error,
    };
    if context.results_tx.send(result).await.is_err() {
        debug!("Result receiver closed before seq {} was reported", permit.seq);
    }
    drop(slot);
}
