//! Result aggregation: running totals, latency histogram, finalized summaries.
mod accumulator;
mod histogram;
mod types;


pub use accumulator::MetricsAccumulator;
pub use histogram::{LatencyHistogram, Percentiles};
pub use types::{AttackResult, FailureKind, LatencySummary, MetricsSummary, RequestFailure};
