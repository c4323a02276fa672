//! `wbx check`: interpret a unit and summarise the result.

use clap::Args;
use wirebox_common::config::BuildConfig;

use crate::output;

/// Arguments for the `check` command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Unit to interpret; defaults to the configured entry unit.
    pub unit: Option<String>,
}

/// Executes the `check` command.
///
/// # Errors
///
/// Returns an error if the unit or one of its imports fails to lex, parse,
/// or interpret.
pub fn execute(args: CheckArgs, config: &BuildConfig) -> anyhow::Result<()> {
    let unit = args.unit.as_deref().unwrap_or(&config.entry);
    tracing::info!(unit, "checking unit");
    let namespace = super::factory(config).namespace(unit)?;
    print!("{}", output::namespace_summary(unit, &namespace));
    Ok(())
}
