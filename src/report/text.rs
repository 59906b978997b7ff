use crate::metrics::MetricsSummary;

const LABEL_WIDTH: usize = 14;
const FIELDS_WIDTH: usize = 38;

/// Multi-line human readable report.
#[must_use]
pub fn render_text(summary: &MetricsSummary) -> String {
    let latency = &summary.latency;
    let mut lines = vec![
        line(
            "Requests",
            "[total, requested, rate, throughput]",
            &format!(
                "{}, {}, {}, {}",
                summary.requests,
                format_x100(summary.requested_rate_x100),
                format_x100(summary.achieved_rate_x100),
                format_x100(summary.throughput_x100)
            ),
        ),
        line(
            "Duration",
            "[total, attack, wait]",
            &format!(
                "{}, {}, {}",
                format_latency_us(summary.total_us()),
                format_latency_us(summary.attack_us),
                format_latency_us(summary.wait_us)
            ),
        ),
        line(
            "Latencies",
            "[min, mean, 50, 90, 95, 99, max]",
            &[
                latency.min_us,
                latency.mean_us,
                latency.p50_us,
                latency.p90_us,
                latency.p95_us,
                latency.p99_us,
                latency.max_us,
            ]
            .iter()
            .map(|us| format_latency_us(*us))
            .collect::<Vec<_>>()
            .join(", "),
        ),
        line(
            "Bytes In",
            "[total, per second]",
            &format!(
                "{}, {}",
                summary.bytes_in,
                optional(summary.bytes_in_per_sec)
            ),
        ),
        line(
            "Bytes Out",
            "[total, per second]",
            &format!(
                "{}, {}",
                summary.bytes_out,
                optional(summary.bytes_out_per_sec)
            ),
        ),
        line(
            "Success",
            "[ratio]",
            &summary
                .success_ratio_bp
                .map_or_else(|| "N/A".to_owned(), format_percent_bp),
        ),
        line(
            "Status Codes",
            "[code:count]",
            &summary
                .status_codes
                .iter()
                .map(|(code, count)| format!("{}:{}", code, count))
                .collect::<Vec<_>>()
                .join("  "),
        ),
    ];

    if !summary.failures.is_empty() {
        lines.push(line(
            "Failures",
            "[kind:count]",
            &summary
                .failures
                .iter()
                .map(|(kind, count)| format!("{}:{}", kind, count))
                .collect::<Vec<_>>()
                .join("  "),
        ));
    }

    lines.push("Error Set:".to_owned());
    lines.extend(summary.errors.iter().cloned());

    let mut rendered = lines.join("\n");
    rendered.push('\n');
    rendered
}

fn line(label: &str, fields: &str, values: &str) -> String {
    format!(
        "{:<label_width$}{:<fields_width$}{}",
        label,
        fields,
        values,
        label_width = LABEL_WIDTH,
        fields_width = FIELDS_WIDTH
    )
    .trim_end()
    .to_owned()
}

/// Formats microseconds with the largest unit that keeps at least one
/// whole digit: `850us`, `12.34ms`, `1.50s`.
#[must_use]
pub fn format_latency_us(us: u64) -> String {
    if us < 1_000 {
        format!("{}us", us)
    } else if us < 1_000_000 {
        format!("{}.{:02}ms", us / 1_000, (us % 1_000) / 10)
    } else {
        format!("{}.{:02}s", us / 1_000_000, (us % 1_000_000) / 10_000)
    }
}

fn format_x100(value: Option<u64>) -> String {
    value.map_or_else(
        || "N/A".to_owned(),
        |value| format!("{}.{:02}", value / 100, value % 100),
    )
}

fn format_percent_bp(bp: u64) -> String {
    format!("{}.{:02}%", bp / 100, bp % 100)
}

fn optional(value: Option<u64>) -> String {
    value.map_or_else(|| "N/A".to_owned(), |value| value.to_string())
}
