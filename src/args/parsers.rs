use std::time::Duration;

use super::types::{PositiveUsize, Rate};
use crate::error::{AppError, AppResult, ValidationError};

pub(crate) fn parse_header(s: &str) -> Result<(String, String), ValidationError> {
    match s.split_once(':') {
        Some((key, value)) => {
            let key = key.trim();
            if key.is_empty() {
                return Err(ValidationError::HeaderNameEmpty {
                    value: s.to_owned(),
                });
            }
            Ok((key.to_owned(), value.trim().to_owned()))
        }
        None => Err(ValidationError::InvalidHeaderFormat {
            value: s.to_owned(),
        }),
    }
}

pub(crate) fn parse_var(s: &str) -> Result<(String, String), ValidationError> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_owned(), value.to_owned()))
        }
        Some(_) | None => Err(ValidationError::InvalidVarFormat {
            value: s.to_owned(),
        }),
    }
}

pub(super) fn parse_positive_usize(s: &str) -> AppResult<PositiveUsize> {
    s.parse::<PositiveUsize>().map_err(AppError::from)
}

pub(crate) fn parse_bool_env(s: &str) -> AppResult<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(AppError::validation(ValidationError::InvalidBoolean {
            value: s.to_owned(),
        })),
    }
}

/// Parses `N` (per second) or `N/<duration>`, e.g. `100`, `50/1m`, `5/500ms`.
///
/// A bare unit after the slash means one of it, so `10/s` equals `10/1s`.
pub(crate) fn parse_rate(s: &str) -> AppResult<Rate> {
    parse_rate_value(s).map_err(AppError::validation)
}

pub(crate) fn parse_rate_value(s: &str) -> Result<Rate, ValidationError> {
    let value = s.trim();
    let invalid = || ValidationError::InvalidRateFormat {
        value: value.to_owned(),
    };

    let (freq_part, per_part) = match value.split_once('/') {
        Some((freq, per)) => (freq.trim(), Some(per.trim())),
        None => (value, None),
    };
    let freq: u64 = freq_part.parse().map_err(|_parse_err| invalid())?;
    if freq == 0 {
        return Err(ValidationError::RateZero);
    }

    let per = match per_part {
        None => Duration::from_secs(1),
        Some(per) if per.starts_with(|ch: char| ch.is_ascii_digit()) => {
            parse_duration_value(per)?
        }
        Some(unit) if !unit.is_empty() => parse_duration_value(&format!("1{}", unit))?,
        Some(_) => return Err(invalid()),
    };

    Ok(Rate { freq, per })
}

pub(crate) fn parse_duration_arg(s: &str) -> AppResult<Duration> {
    parse_duration_value(s).map_err(AppError::validation)
}

pub(crate) fn parse_duration_value(s: &str) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let mut digits_len = 0usize;
    for ch in value.chars() {
        if ch.is_ascii_digit() {
            digits_len = digits_len.saturating_add(1);
        } else {
            break;
        }
    }
    if digits_len == 0 {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 = num_part
        .parse()
        .map_err(|err| ValidationError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part };
    let duration = match unit {
        "ms" => Duration::from_millis(number),
        "s" => Duration::from_secs(number),
        "m" => Duration::from_secs(
            number
                .checked_mul(60)
                .ok_or(ValidationError::DurationOverflow)?,
        ),
        "h" => Duration::from_secs(
            number
                .checked_mul(3_600)
                .ok_or(ValidationError::DurationOverflow)?,
        ),
        _ => {
            return Err(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    };

    if duration.as_millis() == 0 {
        return Err(ValidationError::DurationZero);
    }

    Ok(duration)
}
