use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

/// Why a request produced no usable response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Timeout,
    Connect,
    Transport,
    Protocol,
    /// Not sent: every worker slot was busy under the drop policy.
    Overload,
}

impl FailureKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Connect => "connect",
            FailureKind::Transport => "transport",
            FailureKind::Protocol => "protocol",
            FailureKind::Overload => "overload",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl RequestFailure {
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn timeout(after: Duration) -> Self {
        Self::new(
            FailureKind::Timeout,
            format!("request timed out after {}ms", after.as_millis()),
        )
    }

    #[must_use]
    pub fn overload() -> Self {
        Self::new(FailureKind::Overload, "no free worker slot")
    }
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Outcome of one dispatched request.
#[derive(Debug, Clone)]
pub struct AttackResult {
    /// Sequence number of the permit that authorised the request.
    pub seq: u64,
    /// Wall-clock time the request was started.
    pub timestamp: DateTime<Utc>,
    pub started_at: Instant,
    pub ended_at: Instant,
    pub latency: Duration,
    /// `0` when no response was received.
    pub status: u16,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub error: Option<RequestFailure>,
}

impl AttackResult {
    /// Result for a request that was never sent because the pool was saturated.
    #[must_use]
    pub fn overloaded(seq: u64, bytes_out: u64) -> Self {
        let now = Instant::now();
        Self {
            seq,
            timestamp: Utc::now(),
            started_at: now,
            ended_at: now,
            latency: Duration::ZERO,
            status: 0,
            bytes_in: 0,
            bytes_out,
            error: Some(RequestFailure::overload()),
        }
    }
}

/// Latency statistics in microseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LatencySummary {
    pub mean_us: u64,
    pub min_us: u64,
    pub max_us: u64,
    pub p50_us: u64,
    pub p90_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
}

/// Immutable snapshot produced by closing a `MetricsAccumulator`.
///
/// Rates and ratios are fixed-point integers: `*_x100` carry two decimals,
/// `success_ratio_bp` is in basis points (10000 == 100%).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSummary {
    pub requests: u64,
    pub success: u64,
    pub success_ratio_bp: Option<u64>,
    pub requested_rate_x100: Option<u64>,
    pub achieved_rate_x100: Option<u64>,
    pub throughput_x100: Option<u64>,
    /// Time between the first and the last request start.
    pub attack_us: u64,
    /// Time between the last request start and the last response.
    pub wait_us: u64,
    pub latency: LatencySummary,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub bytes_in_per_sec: Option<u64>,
    pub bytes_out_per_sec: Option<u64>,
    pub status_codes: BTreeMap<u16, u64>,
    pub failures: BTreeMap<FailureKind, u64>,
    pub errors: Vec<String>,
    /// HDR histogram of latencies (microseconds), V2 serialization, base64.
    pub histogram: String,
}

impl MetricsSummary {
    #[must_use]
    pub const fn total_us(&self) -> u64 {
        self.attack_us.saturating_add(self.wait_us)
    }
}
