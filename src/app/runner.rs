use std::io::Write;
use std::sync::Arc;

use tracing::info;

use crate::entry::AttackPlan;
use crate::error::{AppError, AppResult};
use crate::http::{self, ReqwestTransport, Transport};
use crate::metrics::MetricsAccumulator;
use crate::report::report;
use crate::shutdown::ShutdownSender;
use crate::system::shutdown_handlers::{setup_signal_shutdown_handler, shutdown_channel};
use crate::target::build_targeter;

/// Runs the attack described by `plan` and writes the report.
///
/// Ctrl+C / SIGTERM stop the schedule; the report still covers every
/// request that was dispatched.
pub(crate) async fn run_attack(plan: AttackPlan) -> AppResult<()> {
    let transport = Arc::new(ReqwestTransport::new(plan.client_settings())?);
    let (shutdown_tx, _) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let outcome = execute(&plan, transport, &shutdown_tx).await;
    signal_handle.abort();

    let rendered = outcome?;
    write_report(&plan, &rendered)
}

/// Drives the engine into a fresh accumulator and renders the closed summary.
pub(crate) async fn execute(
    plan: &AttackPlan,
    transport: Arc<dyn Transport>,
    shutdown_tx: &ShutdownSender,
) -> AppResult<String> {
    let targeter = build_targeter(plan.template.clone());
    let mut attack = http::attack(targeter, transport, plan.engine_settings(), shutdown_tx)?;
    let mut accumulator =
        MetricsAccumulator::new(plan.expected_status)?.with_requested_rate(plan.rate);

    while let Some(result) = attack.next_result().await {
        accumulator.add(&result)?;
    }
    let stats = attack.finish().await?;

    let summary = accumulator.close()?;
    info!(
        "Attack complete: {} requests ({} of {} permits), {} successful",
        summary.requests,
        stats.dispatched,
        stats.permits,
        summary.success
    );

    report(&accumulator, plan.output_format).map_err(AppError::metrics)
}

pub(crate) fn write_report(plan: &AttackPlan, rendered: &str) -> AppResult<()> {
    let mut content = rendered.to_owned();
    if !content.ends_with('\n') {
        content.push('\n');
    }

    match plan.output.as_deref() {
        Some(path) => {
            std::fs::write(path, content)?;
            info!("Report written to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
