//! Renders a finalized `MetricsSummary` as a text table or JSON.
mod text;

#[cfg(test)]
mod tests;

use crate::args::OutputFormat;
use crate::error::MetricsError;
use crate::metrics::{MetricsAccumulator, MetricsSummary};

pub use text::{format_latency_us, render_text};

/// Renders the summary of a closed accumulator.
///
/// # Errors
///
/// Returns `MetricsError::InvalidState` when the accumulator is still open,
/// or a serialization error for JSON output.
pub fn report(accumulator: &MetricsAccumulator, format: OutputFormat) -> Result<String, MetricsError> {
    let summary = accumulator.summary()?;
    match format {
        OutputFormat::Text => Ok(render_text(summary)),
        OutputFormat::Json => render_json(summary),
    }
}

/// Serializes the summary, histogram included, as pretty-printed JSON.
///
/// # Errors
///
/// Returns `MetricsError::Serialize` if serialization fails.
pub fn render_json(summary: &MetricsSummary) -> Result<String, MetricsError> {
    serde_json::to_string_pretty(summary).map_err(|source| MetricsError::Serialize { source })
}
