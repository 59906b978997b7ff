use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid header format: '{value}'. Expected 'Key: Value'")]
    InvalidHeaderFormat { value: String },
    #[error("Header name must not be empty: '{value}'.")]
    HeaderNameEmpty { value: String },
    #[error("Invalid boolean '{value}'. Expected true/false, yes/no, on/off, or 1/0.")]
    InvalidBoolean { value: String },
    #[error("Invalid template variable '{value}'. Expected 'name=value'")]
    InvalidVarFormat { value: String },
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Invalid rate '{value}'. Expected 'N' or 'N/<duration>' (e.g. 100/1s).")]
    InvalidRateFormat { value: String },
    #[error("Rate must be > 0.")]
    RateZero,
    #[error("Rate {rate} over {duration_ms}ms schedules no requests.")]
    NoRequestsScheduled { rate: String, duration_ms: u128 },
    #[error("Concurrency must be > 0.")]
    ConcurrencyZero,
    #[error("Concurrency {value} exceeds the maximum of {max}.")]
    ConcurrencyTooLarge { value: usize, max: usize },
    #[error("Request timeout must be > 0.")]
    TimeoutZero,
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Template variable '{name}' is reserved for a built-in placeholder.")]
    ReservedVar { name: String },
    #[error("Missing URL (set --url or provide in config).")]
    MissingUrl,
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Unsupported URL scheme '{scheme}'. Use http or https.")]
    UnsupportedUrlScheme { scheme: String },
    #[error("URL is missing host.")]
    UrlMissingHost,
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
