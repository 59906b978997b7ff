use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::time::Duration;

use crate::error::ValidationError;

/// Nanoseconds per second.
const NANOS_PER_SEC: u128 = 1_000_000_000;
/// Fixed-point scale used for rates reported with two decimals.
const RATE_SCALE_X100: u128 = 100;

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Put,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(value: HttpMethod) -> Self {
        match value {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

/// What the engine does with a permit when every worker slot is busy.
#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SaturationPolicy {
    /// Hold the permit until a slot frees up.
    #[default]
    Queue,
    /// Record the request as an overload failure without sending it.
    Drop,
}

impl SaturationPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SaturationPolicy::Queue => "queue",
            SaturationPolicy::Drop => "drop",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositiveUsize(NonZeroUsize);

impl PositiveUsize {
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl TryFrom<usize> for PositiveUsize {
    type Error = ValidationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        NonZeroUsize::new(value)
            .map(PositiveUsize)
            .ok_or(ValidationError::ValueTooSmall { min: 1 })
    }
}

impl std::str::FromStr for PositiveUsize {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: usize = s
            .trim()
            .parse()
            .map_err(|err| ValidationError::InvalidNumber { source: err })?;
        PositiveUsize::try_from(value)
    }
}

/// A request frequency: `freq` requests every `per`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rate {
    pub freq: u64,
    pub per: Duration,
}

impl Rate {
    #[must_use]
    pub const fn per_second(freq: u64) -> Self {
        Self {
            freq,
            per: Duration::from_secs(1),
        }
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.freq == 0 || self.per.is_zero()
    }

    /// Number of whole permits that fit into `duration` (floor(freq * duration / per)).
    #[must_use]
    pub fn permits_over(&self, duration: Duration) -> u64 {
        let per_nanos = self.per.as_nanos();
        let scaled = u128::from(self.freq).saturating_mul(duration.as_nanos());
        let permits = scaled.checked_div(per_nanos).unwrap_or(0);
        u64::try_from(permits).unwrap_or(u64::MAX)
    }

    /// Offset from the schedule start at which permit `seq` becomes due.
    #[must_use]
    pub fn offset_for(&self, seq: u64) -> Duration {
        let nanos = u128::from(seq)
            .saturating_mul(self.per.as_nanos())
            .checked_div(u128::from(self.freq))
            .unwrap_or(0);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// Requests per second rounded up, used to size the default worker pool.
    #[must_use]
    pub fn per_second_ceil(&self) -> u64 {
        let per_nanos = self.per.as_nanos().max(1);
        let scaled = u128::from(self.freq).saturating_mul(NANOS_PER_SEC);
        let whole = scaled.checked_div(per_nanos).unwrap_or(0);
        let rounded = if scaled.checked_rem(per_nanos).unwrap_or(0) > 0 {
            whole.saturating_add(1)
        } else {
            whole
        };
        u64::try_from(rounded).unwrap_or(u64::MAX)
    }

    /// Requests per second scaled by 100 (two fixed decimals).
    #[must_use]
    pub fn per_second_x100(&self) -> u64 {
        let per_nanos = self.per.as_nanos().max(1);
        let scaled = u128::from(self.freq)
            .saturating_mul(NANOS_PER_SEC)
            .saturating_mul(RATE_SCALE_X100)
            .checked_div(per_nanos)
            .unwrap_or(0);
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let per_ms = self.per.as_millis();
        if per_ms.checked_rem(1_000) == Some(0) {
            write!(f, "{}/{}s", self.freq, per_ms.checked_div(1_000).unwrap_or(0))
        } else {
            write!(f, "{}/{}ms", self.freq, per_ms)
        }
    }
}
