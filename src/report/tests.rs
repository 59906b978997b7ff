use super::*;
use crate::metrics::{AttackResult, FailureKind, LatencyHistogram, LatencySummary, RequestFailure};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;

fn sample_summary() -> MetricsSummary {
    MetricsSummary {
        requests: 10,
        success: 9,
        success_ratio_bp: Some(9_000),
        requested_rate_x100: Some(1_000),
        achieved_rate_x100: Some(1_111),
        throughput_x100: Some(947),
        attack_us: 900_000,
        wait_us: 50_120,
        latency: LatencySummary {
            mean_us: 50_120,
            min_us: 850,
            max_us: 1_500_000,
            p50_us: 50_000,
            p90_us: 51_000,
            p95_us: 52_000,
            p99_us: 99_990,
        },
        bytes_in: 20,
        bytes_out: 170,
        bytes_in_per_sec: Some(21),
        bytes_out_per_sec: Some(178),
        status_codes: BTreeMap::from([(0, 1), (200, 9)]),
        failures: BTreeMap::from([(FailureKind::Timeout, 1)]),
        errors: vec!["timeout: request timed out after 100ms".to_owned()],
        histogram: String::new(),
    }
}

fn result(seq: u64, latency_ms: u64, status: u16) -> AttackResult {
    let started_at = Instant::now();
    let latency = Duration::from_millis(latency_ms);
    AttackResult {
        seq,
        timestamp: chrono::Utc::now(),
        started_at,
        ended_at: started_at.checked_add(latency).unwrap_or(started_at),
        latency,
        status,
        bytes_in: 2,
        bytes_out: 17,
        error: None,
    }
}

#[test]
fn latency_units() -> Result<(), MetricsError> {
    let cases = [
        (0, "0us"),
        (850, "850us"),
        (12_345, "12.34ms"),
        (1_000, "1.00ms"),
        (1_500_000, "1.50s"),
        (61_000_000, "61.00s"),
    ];
    for (us, expected) in cases {
        let formatted = format_latency_us(us);
        if formatted != expected {
            return Err(format!("{}us rendered as {}, expected {}", us, formatted, expected).into());
        }
    }
    Ok(())
}

#[test]
fn text_report_lists_every_section() -> Result<(), MetricsError> {
    let rendered = render_text(&sample_summary());
    let expected_lines = [
        "Requests      [total, requested, rate, throughput]  10, 10.00, 11.11, 9.47",
        "Duration      [total, attack, wait]                 950.12ms, 900.00ms, 50.12ms",
        "Latencies     [min, mean, 50, 90, 95, 99, max]      850us, 50.12ms, 50.00ms, 51.00ms, 52.00ms, 99.99ms, 1.50s",
        "Bytes In      [total, per second]                   20, 21",
        "Bytes Out     [total, per second]                   170, 178",
        "Success       [ratio]                               90.00%",
        "Status Codes  [code:count]                          0:1  200:9",
        "Failures      [kind:count]                          timeout:1",
        "Error Set:",
        "timeout: request timed out after 100ms",
    ];
    let lines: Vec<&str> = rendered.lines().collect();
    if lines != expected_lines {
        return Err(format!("Unexpected report:\n{}", rendered).into());
    }
    Ok(())
}

#[test]
fn empty_run_reports_not_available() -> Result<(), MetricsError> {
    let mut accumulator = MetricsAccumulator::new(None)?;
    accumulator.close()?;
    let rendered = report(&accumulator, OutputFormat::Text)?;

    let success_line = rendered
        .lines()
        .find(|line| line.starts_with("Success"))
        .ok_or("Missing success line")?;
    if !success_line.ends_with("N/A") {
        return Err(format!("Expected N/A ratio, got {}", success_line).into());
    }
    if rendered.contains("Failures") {
        return Err("No failure line expected for an empty run".into());
    }
    Ok(())
}

#[test]
fn report_requires_closed_accumulator() -> Result<(), MetricsError> {
    let accumulator = MetricsAccumulator::new(None)?;
    for format in [OutputFormat::Text, OutputFormat::Json] {
        match report(&accumulator, format) {
            Err(err) if err.is_invalid_state() => {}
            Err(err) => return Err(format!("Unexpected error: {}", err).into()),
            Ok(_) => return Err("Open accumulator must not be reported".into()),
        }
    }
    Ok(())
}

#[test]
fn json_report_carries_mergeable_histogram() -> Result<(), MetricsError> {
    let mut accumulator = MetricsAccumulator::new(None)?;
    accumulator.add(&result(0, 10, 200))?;
    accumulator.add(&result(1, 20, 200))?;
    let mut failed = result(2, 30, 0);
    failed.error = Some(RequestFailure::new(FailureKind::Connect, "refused"));
    accumulator.add(&failed)?;
    accumulator.close()?;

    let rendered = report(&accumulator, OutputFormat::Json)?;
    let value: serde_json::Value =
        serde_json::from_str(&rendered).map_err(|source| MetricsError::Serialize { source })?;

    if value.get("requests").and_then(serde_json::Value::as_u64) != Some(3) {
        return Err(format!("Unexpected requests in {}", rendered).into());
    }
    if value.get("success_ratio_bp").and_then(serde_json::Value::as_u64) != Some(6_666) {
        return Err(format!("Unexpected ratio in {}", rendered).into());
    }
    let connect_failures = value
        .get("failures")
        .and_then(|failures| failures.get("connect"))
        .and_then(serde_json::Value::as_u64);
    if connect_failures != Some(1) {
        return Err(format!("Unexpected failures in {}", rendered).into());
    }

    let encoded = value
        .get("histogram")
        .and_then(serde_json::Value::as_str)
        .ok_or("Missing histogram")?;
    let histogram = LatencyHistogram::decode_base64(encoded)?;
    if histogram.count() != 3 {
        return Err(format!("Expected 3 samples, got {}", histogram.count()).into());
    }
    Ok(())
}
