use super::runner::{execute, write_report};
use crate::args::parse_test_args;
use crate::entry::{AttackPlan, build_plan};
use crate::error::{AppError, AppResult};
use crate::http::{Transport, TransportResponse};
use crate::metrics::RequestFailure;
use crate::system::shutdown_handlers::shutdown_channel;
use crate::target::RequestSpec;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

struct OkTransport;

#[async_trait]
impl Transport for OkTransport {
    async fn send(&self, _spec: RequestSpec) -> Result<TransportResponse, RequestFailure> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(TransportResponse {
            status: 200,
            bytes_in: 2,
        })
    }
}

fn run_paused_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

fn plan_from(argv: &[&str]) -> AppResult<AttackPlan> {
    build_plan(parse_test_args(argv)?)
}

#[test]
fn text_report_covers_every_request() -> AppResult<()> {
    run_paused_test(async {
        let plan = plan_from(&["strafe", "-u", "http://localhost/", "-r", "10", "-t", "1s"])?;
        let (shutdown_tx, _) = shutdown_channel();
        let rendered = execute(&plan, Arc::new(OkTransport), &shutdown_tx).await?;

        let requests_line = rendered.lines().next().unwrap_or_default();
        if !requests_line.ends_with("10, 10.00, 11.11, 10.86") {
            return Err(AppError::validation(format!(
                "Unexpected requests line: {}",
                requests_line
            )));
        }
        if !rendered.contains("200:10") || !rendered.contains("100.00%") {
            return Err(AppError::validation(format!(
                "Unexpected report:\n{}",
                rendered
            )));
        }
        Ok(())
    })
}

#[test]
fn json_report_is_written_to_file() -> AppResult<()> {
    run_paused_test(async {
        let dir = tempdir()?;
        let path = dir.path().join("report.json");
        let path_arg = path.to_string_lossy().into_owned();
        let plan = plan_from(&[
            "strafe",
            "-u",
            "http://localhost/",
            "-r",
            "5",
            "-t",
            "1s",
            "-f",
            "json",
            "-o",
            &path_arg,
        ])?;
        let (shutdown_tx, _) = shutdown_channel();
        let rendered = execute(&plan, Arc::new(OkTransport), &shutdown_tx).await?;
        write_report(&plan, &rendered)?;

        let written = std::fs::read_to_string(&path)?;
        let value: serde_json::Value = serde_json::from_str(&written)
            .map_err(|err| AppError::validation(format!("Invalid JSON report: {}", err)))?;
        if value.get("requests").and_then(serde_json::Value::as_u64) != Some(5) {
            return Err(AppError::validation(format!(
                "Unexpected JSON report: {}",
                written
            )));
        }
        if !written.ends_with('\n') {
            return Err(AppError::validation("Report file must end with a newline"));
        }
        Ok(())
    })
}
