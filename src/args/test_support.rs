use clap::Parser;

use crate::error::{AppError, AppResult};

use super::AttackArgs;

pub(crate) fn parse_test_args<I, T>(args: I) -> AppResult<AttackArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    AttackArgs::try_parse_from(args).map_err(AppError::from)
}
