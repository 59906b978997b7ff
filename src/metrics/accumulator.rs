use std::collections::{BTreeMap, BTreeSet};

use tokio::time::Instant;
use tracing::debug;

use crate::args::Rate;
use crate::error::MetricsError;

use super::histogram::LatencyHistogram;
use super::types::{AttackResult, FailureKind, LatencySummary, MetricsSummary};

/// Microseconds per second.
const US_PER_SEC: u128 = 1_000_000;
/// Fixed-point scale for two-decimal rates.
const SCALE_X100: u128 = 100;
/// Basis points in a whole.
const BASIS_POINTS: u128 = 10_000;
/// Status codes accepted when no explicit status is expected.
const DEFAULT_ACCEPTED: std::ops::RangeInclusive<u16> = 200..=399;

/// Incremental aggregation of attack results.
///
/// Every statistic is commutative, so results may be added in any order.
/// Once closed, the accumulator only serves its `MetricsSummary`.
#[derive(Debug)]
pub struct MetricsAccumulator {
    expected_status: Option<u16>,
    requested_rate: Option<Rate>,
    state: State,
}

#[derive(Debug)]
enum State {
    Open(Box<Totals>),
    Closed(Box<MetricsSummary>),
}

#[derive(Debug)]
struct Totals {
    requests: u64,
    success: u64,
    latency_sum_us: u128,
    min_us: Option<u64>,
    max_us: u64,
    histogram: LatencyHistogram,
    bytes_in: u64,
    bytes_out: u64,
    earliest_start: Option<Instant>,
    latest_start: Option<Instant>,
    latest_end: Option<Instant>,
    status_codes: BTreeMap<u16, u64>,
    failures: BTreeMap<FailureKind, u64>,
    errors: BTreeSet<String>,
}

impl MetricsAccumulator {
    /// Creates an open accumulator.
    ///
    /// # Errors
    ///
    /// Returns an error if the latency histogram cannot be created.
    pub fn new(expected_status: Option<u16>) -> Result<Self, MetricsError> {
        Ok(Self {
            expected_status,
            requested_rate: None,
            state: State::Open(Box::new(Totals {
                requests: 0,
                success: 0,
                latency_sum_us: 0,
                min_us: None,
                max_us: 0,
                histogram: LatencyHistogram::new()?,
                bytes_in: 0,
                bytes_out: 0,
                earliest_start: None,
                latest_start: None,
                latest_end: None,
                status_codes: BTreeMap::new(),
                failures: BTreeMap::new(),
                errors: BTreeSet::new(),
            })),
        })
    }

    /// Records the configured rate so the report can compare it with the achieved one.
    #[must_use]
    pub const fn with_requested_rate(mut self, rate: Rate) -> Self {
        self.requested_rate = Some(rate);
        self
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed(_))
    }

    /// True when the response counts as a success.
    #[must_use]
    pub fn is_success(&self, result: &AttackResult) -> bool {
        result.error.is_none()
            && match self.expected_status {
                Some(expected) => result.status == expected,
                None => DEFAULT_ACCEPTED.contains(&result.status),
            }
    }

    /// Folds one result into the running totals.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::InvalidState` after `close`, or a histogram error.
    pub fn add(&mut self, result: &AttackResult) -> Result<(), MetricsError> {
        let success = self.is_success(result);
        let totals = match &mut self.state {
            State::Open(totals) => totals,
            State::Closed(_) => {
                return Err(MetricsError::InvalidState {
                    operation: "add",
                    reason: "accumulator is already closed",
                });
            }
        };

        let latency_us = u64::try_from(result.latency.as_micros()).unwrap_or(u64::MAX);
        totals.histogram.record(latency_us)?;
        totals.requests = totals.requests.saturating_add(1);
        totals.latency_sum_us = totals.latency_sum_us.saturating_add(u128::from(latency_us));
        totals.min_us = Some(totals.min_us.map_or(latency_us, |min| min.min(latency_us)));
        totals.max_us = totals.max_us.max(latency_us);
        totals.bytes_in = totals.bytes_in.saturating_add(result.bytes_in);
        totals.bytes_out = totals.bytes_out.saturating_add(result.bytes_out);

        totals.earliest_start = Some(
            totals
                .earliest_start
                .map_or(result.started_at, |start| start.min(result.started_at)),
        );
        totals.latest_start = Some(
            totals
                .latest_start
                .map_or(result.started_at, |start| start.max(result.started_at)),
        );
        totals.latest_end = Some(
            totals
                .latest_end
                .map_or(result.ended_at, |end| end.max(result.ended_at)),
        );

        let count = totals.status_codes.entry(result.status).or_insert(0);
        *count = count.saturating_add(1);

        if success {
            totals.success = totals.success.saturating_add(1);
        } else if let Some(failure) = result.error.as_ref() {
            let count = totals.failures.entry(failure.kind).or_insert(0);
            *count = count.saturating_add(1);
            totals.errors.insert(failure.to_string());
        } else {
            totals
                .errors
                .insert(format!("unexpected status {}", result.status));
        }

        Ok(())
    }

    /// Finalises the totals into a summary. No `add` is accepted afterwards.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::InvalidState` when already closed, or a histogram
    /// serialization error.
    pub fn close(&mut self) -> Result<&MetricsSummary, MetricsError> {
        let summary = match &self.state {
            State::Open(totals) => summarize(totals, self.requested_rate)?,
            State::Closed(_) => {
                return Err(MetricsError::InvalidState {
                    operation: "close",
                    reason: "accumulator is already closed",
                });
            }
        };
        debug!(
            "Metrics closed: {} requests, {} successful",
            summary.requests, summary.success
        );
        self.state = State::Closed(Box::new(summary));
        self.summary()
    }

    /// Returns the finalized summary.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::InvalidState` while the accumulator is still open.
    pub fn summary(&self) -> Result<&MetricsSummary, MetricsError> {
        match &self.state {
            State::Closed(summary) => Ok(summary.as_ref()),
            State::Open(_) => Err(MetricsError::InvalidState {
                operation: "report",
                reason: "accumulator is not closed",
            }),
        }
    }
}

fn summarize(totals: &Totals, requested_rate: Option<Rate>) -> Result<MetricsSummary, MetricsError> {
    let requests = u128::from(totals.requests);
    let attack_us = duration_us(totals.earliest_start, totals.latest_start);
    let wait_us = duration_us(totals.latest_start, totals.latest_end);
    let total_us = attack_us.saturating_add(wait_us);

    let percentiles = totals.histogram.percentiles();
    let mean_us = totals
        .latency_sum_us
        .checked_div(requests)
        .map_or(0, |mean| u64::try_from(mean).unwrap_or(u64::MAX));

    Ok(MetricsSummary {
        requests: totals.requests,
        success: totals.success,
        success_ratio_bp: scaled_ratio(u128::from(totals.success), BASIS_POINTS, requests),
        requested_rate_x100: requested_rate.map(|rate| rate.per_second_x100()),
        achieved_rate_x100: per_second(totals.requests, SCALE_X100, attack_us),
        throughput_x100: per_second(totals.success, SCALE_X100, total_us),
        attack_us,
        wait_us,
        latency: LatencySummary {
            mean_us,
            min_us: totals.min_us.unwrap_or(0),
            max_us: totals.max_us,
            p50_us: percentiles.p50,
            p90_us: percentiles.p90,
            p95_us: percentiles.p95,
            p99_us: percentiles.p99,
        },
        bytes_in: totals.bytes_in,
        bytes_out: totals.bytes_out,
        bytes_in_per_sec: per_second(totals.bytes_in, 1, total_us),
        bytes_out_per_sec: per_second(totals.bytes_out, 1, total_us),
        status_codes: totals.status_codes.clone(),
        failures: totals.failures.clone(),
        errors: totals.errors.iter().cloned().collect(),
        histogram: totals.histogram.encode_base64()?,
    })
}

fn duration_us(from: Option<Instant>, to: Option<Instant>) -> u64 {
    match (from, to) {
        (Some(from), Some(to)) => {
            u64::try_from(to.saturating_duration_since(from).as_micros()).unwrap_or(u64::MAX)
        }
        _ => 0,
    }
}

/// `value * scale / total`, `None` when `total` is zero.
fn scaled_ratio(value: u128, scale: u128, total: u128) -> Option<u64> {
    value
        .saturating_mul(scale)
        .checked_div(total)
        .map(|ratio| u64::try_from(ratio).unwrap_or(u64::MAX))
}

/// `count * scale` per second over `elapsed_us`, `None` when nothing elapsed.
fn per_second(count: u64, scale: u128, elapsed_us: u64) -> Option<u64> {
    scaled_ratio(
        u128::from(count).saturating_mul(US_PER_SEC),
        scale,
        u128::from(elapsed_us),
    )
}
