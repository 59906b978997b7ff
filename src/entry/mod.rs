mod plan;

use std::ffi::OsString;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::info;

use crate::args::AttackArgs;
use crate::config::default_config_present;
use crate::error::AppResult;

pub(crate) use plan::{AttackPlan, build_plan};
use plan::apply_config_file;

/// Parses the command line, merges the config file and runs one attack.
///
/// # Errors
///
/// Returns an error for invalid arguments or configuration, when the
/// runtime cannot start, or when the attack fails fatally.
pub fn run() -> AppResult<()> {
    let Some((mut args, matches)) = parse_args()? else {
        return Ok(());
    };

    let config_applied = apply_config_file(&mut args, &matches)?;
    crate::system::logger::init_logging(args.verbose, args.no_color);
    if config_applied {
        info!("Configuration file applied");
    }

    let plan = build_plan(args)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(crate::app::run_attack(plan))
}

fn parse_args() -> AppResult<Option<(AttackArgs, ArgMatches)>> {
    let mut cmd = AttackArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = AttackArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

/// Bare `strafe` prints help, unless a default config file can drive the run.
fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !default_config_present()
}
