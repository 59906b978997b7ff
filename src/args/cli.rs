use clap::Parser;
use std::time::Duration;

use super::defaults::{
    DEFAULT_BODY, DEFAULT_CONNECT_TIMEOUT, DEFAULT_DURATION, DEFAULT_RATE, DEFAULT_TIMEOUT,
};
use super::parsers::{
    parse_bool_env, parse_duration_arg, parse_header, parse_positive_usize, parse_rate, parse_var,
};
use super::types::{HttpMethod, OutputFormat, PositiveUsize, Rate, SaturationPolicy};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Fixed-rate async HTTP attack engine: sends one request template at a constant rate and prints latency/throughput statistics."
)]
pub struct AttackArgs {
    /// Target URL (supports {{uuid}}, {{seq}}, {{timestamp_ms}}, {{timestamp_s}} and --var placeholders)
    #[arg(long, short)]
    pub url: Option<String>,

    /// HTTP method to use
    #[arg(long, short = 'X', default_value = "post", ignore_case = true)]
    pub method: HttpMethod,

    /// HTTP headers in 'Key: Value' format (repeatable). Defaults to JSON Accept/Content-Type.
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Request body; placeholders are rendered for every request
    #[arg(long, short = 'd', default_value = DEFAULT_BODY)]
    pub body: String,

    /// Request body from file (placeholders are rendered as well)
    #[arg(long = "body-file", short = 'D', conflicts_with = "body")]
    pub body_file: Option<String>,

    /// Template variable in 'name=value' format (repeatable)
    #[arg(long = "var", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    /// Request rate: N per second or N/<duration> (e.g. 100, 50/1m, 5/500ms)
    #[arg(long, short = 'r', default_value = DEFAULT_RATE, value_parser = parse_rate)]
    pub rate: Rate,

    /// Attack duration (supports ms/s/m/h)
    #[arg(
        long = "duration",
        short = 't',
        default_value = DEFAULT_DURATION,
        value_parser = parse_duration_arg
    )]
    pub duration: Duration,

    /// Maximum in-flight requests (defaults to the per-second rate, capped at 10000)
    #[arg(long, short = 'c', value_parser = parse_positive_usize)]
    pub concurrency: Option<PositiveUsize>,

    /// What to do with a request when every worker is busy
    #[arg(long, value_enum, default_value = "queue", ignore_case = true)]
    pub saturation: SaturationPolicy,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(
        long = "timeout",
        default_value = DEFAULT_TIMEOUT,
        value_parser = parse_duration_arg
    )]
    pub request_timeout: Duration,

    /// Timeout for establishing a new connection (supports ms/s/m/h)
    #[arg(
        long = "connect-timeout",
        default_value = DEFAULT_CONNECT_TIMEOUT,
        value_parser = parse_duration_arg
    )]
    pub connect_timeout: Duration,

    /// Expected HTTP status code (any 2xx/3xx counts as success when unset)
    #[arg(long = "status", short = 's')]
    pub expected_status: Option<u16>,

    /// Report format
    #[arg(long = "output-format", short = 'f', value_enum, default_value = "text")]
    pub output_format: OutputFormat,

    /// Write the report to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// Path to config file (TOML/JSON). Defaults to ./strafe.toml or ./strafe.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by STRAFE_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,
}
