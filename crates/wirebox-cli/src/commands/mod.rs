//! CLI command definitions and dispatch.

pub mod check;
pub mod compile;
pub mod plan;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use wirebox_common::config::BuildConfig;
use wirebox_runtime::ClassRegistry;
use wirebox_sdk::ContainerFactory;

/// wirebox: dependency-injection container toolchain.
#[derive(Parser, Debug)]
#[command(name = "wbx", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// JSON build configuration file.
    #[arg(long, global = true, env = "WIREBOX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory unit names are resolved against.
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Extension appended to bare unit names.
    #[arg(long, global = true)]
    pub extension: Option<String>,
}

impl GlobalArgs {
    /// The build configuration: the config file or defaults, with flags
    /// applied on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded.
    pub fn build_config(&self) -> anyhow::Result<BuildConfig> {
        let mut config = match &self.config {
            Some(path) => BuildConfig::from_json_file(path)?,
            None => BuildConfig::default(),
        };
        if let Some(root) = &self.root {
            config.source_root.clone_from(root);
        }
        if let Some(extension) = &self.extension {
            config.extension.clone_from(extension);
        }
        Ok(config)
    }
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interpret a unit and summarise its parameters, services, and aliases.
    Check(check::CheckArgs),
    /// Show the construction order of a unit's services.
    Plan(plan::PlanArgs),
    /// Compile a unit into a container module.
    Compile(compile::CompileArgs),
}

/// Pipeline for commands that never construct services.
pub(crate) fn factory(config: &BuildConfig) -> ContainerFactory {
    ContainerFactory::from_config(config, ClassRegistry::new())
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = cli.global.build_config()?;
    match cli.command {
        Command::Check(args) => check::execute(args, &config),
        Command::Plan(args) => plan::execute(args, &config),
        Command::Compile(args) => compile::execute(args, &config),
    }
}
