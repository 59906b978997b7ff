use clap::ArgMatches;
use clap::parser::ValueSource;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::args::{AttackArgs, PositiveUsize, parse_header};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::{ConfigFile, DurationValue};

/// Applies configuration values to CLI arguments.
///
/// Options given on the command line always win over the file.
///
/// # Errors
///
/// Returns an error when config values are invalid or conflict with each other.
pub fn apply_config(
    args: &mut AttackArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if config.body.is_some() && config.body_file.is_some() {
        return Err(AppError::config(ConfigError::Conflict {
            left: "body",
            right: "body_file",
        }));
    }

    if !is_cli(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = Some(url);
    }

    if !is_cli(matches, "method")
        && let Some(method) = config.method
    {
        args.method = method;
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        args.headers = parse_headers(headers)?;
    }

    let body_from_cli = is_cli(matches, "body") || is_cli(matches, "body_file");
    if !body_from_cli {
        if let Some(body) = config.body.clone() {
            args.body = body;
        }
        if let Some(path) = config.body_file.clone() {
            args.body_file = Some(path);
        }
    }

    if let Some(vars) = config.vars.as_ref() {
        args.vars = merge_vars(vars, &args.vars);
    }

    if !is_cli(matches, "rate")
        && let Some(rate) = config.rate.as_ref()
    {
        args.rate = rate
            .to_rate()
            .map_err(|err| AppError::config(ConfigError::InvalidRate { source: err }))?;
    }

    if !is_cli(matches, "duration")
        && let Some(duration) = config.duration.as_ref()
    {
        args.duration = to_duration(duration, "duration")?;
    }

    if !is_cli(matches, "concurrency")
        && let Some(concurrency) = config.concurrency
    {
        args.concurrency = Some(ensure_positive_usize(concurrency, "concurrency")?);
    }

    if !is_cli(matches, "saturation")
        && let Some(policy) = config.saturation
    {
        args.saturation = policy;
    }

    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = to_duration(timeout, "timeout")?;
    }

    if !is_cli(matches, "connect_timeout")
        && let Some(timeout) = config.connect_timeout.as_ref()
    {
        args.connect_timeout = to_duration(timeout, "connect_timeout")?;
    }

    if !is_cli(matches, "expected_status")
        && let Some(status) = config.status
    {
        args.expected_status = Some(status);
    }

    if !is_cli(matches, "output_format")
        && let Some(format) = config.output_format
    {
        args.output_format = format;
    }

    if !is_cli(matches, "output")
        && let Some(path) = config.output.clone()
    {
        args.output = Some(path);
    }

    if !is_cli(matches, "verbose")
        && let Some(verbose) = config.verbose
    {
        args.verbose = verbose;
    }

    if !is_cli(matches, "no_color")
        && let Some(no_color) = config.no_color
    {
        args.no_color = no_color;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_usize(value: usize, field: &'static str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value)
        .map_err(|err| AppError::config(ConfigError::FieldMustBePositive { field, source: err }))
}

fn to_duration(value: &DurationValue, field: &'static str) -> AppResult<Duration> {
    value
        .to_duration()
        .map_err(|err| AppError::config(ConfigError::InvalidDuration { field, source: err }))
}

fn parse_headers(headers: &[String]) -> AppResult<Vec<(String, String)>> {
    let mut parsed = Vec::with_capacity(headers.len());
    for header in headers {
        parsed.push(
            parse_header(header)
                .map_err(|err| AppError::config(ConfigError::InvalidHeader { source: err }))?,
        );
    }
    Ok(parsed)
}

/// Config vars first, then CLI vars so a `--var` overrides the file.
fn merge_vars(
    config_vars: &BTreeMap<String, String>,
    cli_vars: &[(String, String)],
) -> Vec<(String, String)> {
    let mut merged: BTreeMap<String, String> = config_vars.clone();
    for (name, value) in cli_vars {
        merged.insert(name.clone(), value.clone());
    }
    merged.into_iter().collect()
}
