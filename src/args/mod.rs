//! CLI argument types and parsing helpers.
mod cli;
pub(crate) mod defaults;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
mod test_support;

pub use cli::AttackArgs;
pub use types::{HttpMethod, OutputFormat, PositiveUsize, Rate, SaturationPolicy};

pub(crate) use defaults::DEFAULT_USER_AGENT;
#[cfg(test)]
pub(crate) use test_support::parse_test_args;
pub(crate) use parsers::{parse_duration_value, parse_header, parse_rate_value};
