use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::ArgMatches;
use reqwest::header::{HeaderName, HeaderValue};
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::args::defaults::{MAX_DEFAULT_CONCURRENCY, default_headers};
use crate::args::AttackArgs;
use crate::config::{apply_config, load_config};
use crate::error::{AppError, AppResult, HttpError, ValidationError};
use crate::http::{MAX_CONCURRENCY, RatePlan};
use crate::target::{BUILTIN_VARS, RequestTemplate, has_placeholders, render_template};

use super::types::AttackPlan;

/// Merges the config file (explicit or default) into `args`.
///
/// Returns whether a file was applied.
///
/// # Errors
///
/// Returns an error when the file cannot be loaded or holds invalid values.
pub(crate) fn apply_config_file(args: &mut AttackArgs, matches: &ArgMatches) -> AppResult<bool> {
    match load_config(args.config.as_deref())? {
        Some(config) => {
            apply_config(args, matches, &config)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Validates the merged arguments and resolves every default.
///
/// # Errors
///
/// Returns an error for a missing or invalid URL, a var named after a built-in
/// placeholder, invalid headers, an unreadable body file, a rate/duration pair
/// that schedules nothing, or a worker pool above `MAX_CONCURRENCY`.
pub(crate) fn build_plan(args: AttackArgs) -> AppResult<AttackPlan> {
    let Some(url) = args.url else {
        tracing::error!("Missing URL (set --url or provide in config).");
        return Err(AppError::validation(ValidationError::MissingUrl));
    };

    let vars: BTreeMap<String, String> = args.vars.into_iter().collect();
    if let Some(name) = BUILTIN_VARS.iter().find(|name| vars.contains_key(**name)) {
        return Err(AppError::validation(ValidationError::ReservedVar {
            name: (*name).to_owned(),
        }));
    }
    validate_url(&url, &vars)?;

    let headers = if args.headers.is_empty() {
        default_headers()
    } else {
        args.headers
    };
    validate_headers(&headers)?;

    let body = match args.body_file {
        Some(path) => read_body_file(PathBuf::from(path))?,
        None => args.body,
    };

    let plan = RatePlan::new(args.rate, args.duration).map_err(AppError::validation)?;
    let concurrency = match args.concurrency {
        Some(concurrency) => concurrency.get(),
        None => default_concurrency(plan.rate().per_second_ceil()),
    };
    if concurrency > MAX_CONCURRENCY {
        return Err(AppError::validation(ValidationError::ConcurrencyTooLarge {
            value: concurrency,
            max: MAX_CONCURRENCY,
        }));
    }
    debug!(
        "Resolved plan: {} requests, concurrency {}",
        plan.total_permits(),
        concurrency
    );

    Ok(AttackPlan {
        template: RequestTemplate {
            method: args.method,
            url,
            headers,
            body,
            vars,
        },
        rate: args.rate,
        duration: args.duration,
        concurrency,
        saturation: args.saturation,
        request_timeout: args.request_timeout,
        connect_timeout: args.connect_timeout,
        expected_status: args.expected_status,
        output_format: args.output_format,
        output: args.output.map(PathBuf::from),
    })
}

/// Worker pool size for a rate of `per_second` requests, within `[1, 10_000]`.
pub(super) fn default_concurrency(per_second: u64) -> usize {
    let clamped = per_second.clamp(1, MAX_DEFAULT_CONCURRENCY);
    usize::try_from(clamped).unwrap_or(1)
}

/// Checks the URL with placeholders rendered to sample values.
fn validate_url(url: &str, vars: &BTreeMap<String, String>) -> AppResult<()> {
    let rendered = if has_placeholders(url) {
        let mut sample = vars.clone();
        sample.insert("uuid".to_owned(), Uuid::nil().to_string());
        for name in ["seq", "timestamp_ms", "timestamp_s"] {
            sample.insert(name.to_owned(), "0".to_owned());
        }
        render_template(url, &sample)
    } else {
        url.to_owned()
    };

    let parsed = Url::parse(&rendered).map_err(|err| {
        AppError::validation(ValidationError::InvalidUrl {
            url: url.to_owned(),
            source: err,
        })
    })?;
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(AppError::validation(ValidationError::UnsupportedUrlScheme {
                scheme: scheme.to_owned(),
            }));
        }
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(AppError::validation(ValidationError::UrlMissingHost));
    }
    Ok(())
}

/// Header names must be valid as given; values only when they are not templated.
fn validate_headers(headers: &[(String, String)]) -> AppResult<()> {
    for (name, value) in headers {
        HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
            AppError::http(HttpError::InvalidHeaderName {
                header: name.clone(),
                source: err,
            })
        })?;
        if !has_placeholders(value) {
            HeaderValue::from_str(value).map_err(|err| {
                AppError::http(HttpError::InvalidHeaderValue {
                    header: name.clone(),
                    source: err,
                })
            })?;
        }
    }
    Ok(())
}

fn read_body_file(path: PathBuf) -> AppResult<String> {
    match std::fs::read_to_string(&path) {
        Ok(body) => {
            info!("Loaded request body from {}", path.display());
            Ok(body)
        }
        Err(err) => Err(AppError::http(HttpError::ReadBodyFile { path, source: err })),
    }
}
