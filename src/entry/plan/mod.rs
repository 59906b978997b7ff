mod build;
mod types;


pub(crate) use build::{apply_config_file, build_plan};
pub(crate) use types::AttackPlan;
