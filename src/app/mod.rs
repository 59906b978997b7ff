mod runner;

#[cfg(test)]
mod tests;

pub(crate) use runner::run_attack;
