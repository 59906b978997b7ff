pub(crate) const DEFAULT_USER_AGENT: &str = concat!("strafe/", env!("CARGO_PKG_VERSION"));

/// Requests per second when no rate is given.
pub(crate) const DEFAULT_RATE: &str = "100/1s";
/// Attack length when no duration is given.
pub(crate) const DEFAULT_DURATION: &str = "1m";
pub(crate) const DEFAULT_TIMEOUT: &str = "10s";
pub(crate) const DEFAULT_CONNECT_TIMEOUT: &str = "5s";

/// JSON payload carrying a fresh identifier per request.
pub(crate) const DEFAULT_BODY: &str =
    r#"{"id": "{{uuid}}", "github_username": "vegeta", "commit_hash": "vegeta#hash"}"#;

/// Headers sent when the user configures none.
pub(crate) const DEFAULT_HEADERS: [(&str, &str); 2] = [
    ("Accept", "application/json"),
    ("Content-Type", "application/json"),
];

/// Upper bound for the worker pool derived from the rate.
pub(crate) const MAX_DEFAULT_CONCURRENCY: u64 = 10_000;

/// Default config filenames checked when `--config` is absent.
pub(crate) const DEFAULT_CONFIG_FILES: [&str; 2] = ["strafe.toml", "strafe.json"];

pub(crate) fn default_headers() -> Vec<(String, String)> {
    DEFAULT_HEADERS
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect()
}
