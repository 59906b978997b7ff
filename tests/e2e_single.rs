mod support_single;

use std::fs;

use tempfile::tempdir;

use support_single::{run_strafe, spawn_http_server_or_skip};

fn output_text(output: &std::process::Output) -> String {
    format!(
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[test]
fn e2e_single_text_report() -> Result<(), String> {
    let Some((url, _server)) = spawn_http_server_or_skip(200)? else {
        return Ok(());
    };

    let output = run_strafe(["-u", url.as_str(), "-r", "20", "-t", "1s", "-c", "5"])?;
    if !output.status.success() {
        return Err(output_text(&output));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    for section in [
        "Requests      [total, requested, rate, throughput]",
        "Latencies     [min, mean, 50, 90, 95, 99, max]",
        "Success       [ratio]                               100.00%",
        "Status Codes  [code:count]                          200:",
        "Error Set:",
    ] {
        if !stdout.contains(section) {
            return Err(format!("missing '{}' in\n{}", section, output_text(&output)));
        }
    }
    Ok(())
}

#[test]
fn e2e_single_json_report_to_file() -> Result<(), String> {
    let Some((url, _server)) = spawn_http_server_or_skip(404)? else {
        return Ok(());
    };
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let report_path = dir.path().join("report.json");
    let report_arg = report_path.to_string_lossy().into_owned();

    let output = run_strafe([
        "-u",
        url.as_str(),
        "-X",
        "get",
        "-r",
        "10",
        "-t",
        "1s",
        "-f",
        "json",
        "-o",
        report_arg.as_str(),
    ])?;
    if !output.status.success() {
        return Err(output_text(&output));
    }

    let written =
        fs::read_to_string(&report_path).map_err(|err| format!("read report failed: {}", err))?;
    let value: serde_json::Value =
        serde_json::from_str(&written).map_err(|err| format!("invalid JSON report: {}", err))?;
    let requests = value
        .get("requests")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(0);
    let not_found = value
        .get("status_codes")
        .and_then(|codes| codes.get("404"))
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(0);
    let success = value.get("success").and_then(serde_json::Value::as_u64);
    if requests == 0 || not_found != requests || success != Some(0) {
        return Err(format!("unexpected report: {}", written));
    }
    if !String::from_utf8_lossy(&output.stdout).trim().is_empty() {
        return Err("report must not be printed when --output is set".to_owned());
    }
    Ok(())
}

#[test]
fn e2e_single_config_file() -> Result<(), String> {
    let Some((url, _server)) = spawn_http_server_or_skip(200)? else {
        return Ok(());
    };
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let config_path = dir.path().join("strafe.toml");
    let config = format!(
        "url = \"{}/orders/{{{{seq}}}}\"\nrate = \"10/1s\"\nduration = \"1s\"\nstatus = 200\n\n[vars]\ntenant = \"acme\"\n",
        url
    );
    fs::write(&config_path, config).map_err(|err| format!("write config failed: {}", err))?;
    let config_arg = config_path.to_string_lossy().into_owned();

    let output = run_strafe(["--config", config_arg.as_str(), "-f", "json"])?;
    if !output.status.success() {
        return Err(output_text(&output));
    }
    let value: serde_json::Value = serde_json::from_slice(&output.stdout)
        .map_err(|err| format!("invalid JSON report: {}\n{}", err, output_text(&output)))?;
    if value.get("success_ratio_bp").and_then(serde_json::Value::as_u64) != Some(10_000) {
        return Err(format!("unexpected report: {}", output_text(&output)));
    }
    Ok(())
}

#[test]
fn e2e_single_missing_url_fails() -> Result<(), String> {
    let output = run_strafe(["-r", "10", "-t", "1s"])?;
    if output.status.success() {
        return Err(format!("expected failure\n{}", output_text(&output)));
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.contains("Missing URL") && !stderr.contains("MissingUrl") {
        return Err(format!("unexpected error output\n{}", output_text(&output)));
    }
    Ok(())
}

#[test]
fn e2e_single_invalid_rate_fails() -> Result<(), String> {
    let output = run_strafe(["-u", "http://127.0.0.1:9/", "-r", "fast"])?;
    if output.status.success() {
        return Err(format!("expected failure\n{}", output_text(&output)));
    }
    Ok(())
}
