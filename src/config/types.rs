use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::args::{
    HttpMethod, OutputFormat, Rate, SaturationPolicy, parse_duration_value, parse_rate_value,
};
use crate::error::ValidationError;

/// On-disk mirror of the CLI options. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    pub headers: Option<Vec<String>>,
    pub body: Option<String>,
    pub body_file: Option<String>,
    pub vars: Option<BTreeMap<String, String>>,
    pub rate: Option<RateValue>,
    pub duration: Option<DurationValue>,
    pub concurrency: Option<usize>,
    pub saturation: Option<SaturationPolicy>,
    pub timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub status: Option<u16>,
    pub output_format: Option<OutputFormat>,
    pub output: Option<String>,
    pub verbose: Option<bool>,
    pub no_color: Option<bool>,
}

/// Durations accept plain seconds or a unit string (`"250ms"`, `"1m"`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => parse_duration_value(text),
        }
    }
}

/// Rates accept a plain per-second number or the CLI form (`"50/1m"`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RateValue {
    PerSecond(u64),
    Text(String),
}

impl RateValue {
    pub(crate) fn to_rate(&self) -> Result<Rate, ValidationError> {
        match self {
            RateValue::PerSecond(0) => Err(ValidationError::RateZero),
            RateValue::PerSecond(freq) => Ok(Rate::per_second(*freq)),
            RateValue::Text(text) => parse_rate_value(text),
        }
    }
}
