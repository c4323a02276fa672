//! `wbx compile`: compile a unit into a container module.

use std::path::PathBuf;

use clap::Args;
use wirebox_common::config::BuildConfig;
use wirebox_compiler::{Renderer, RustRenderer};

/// Arguments for the `compile` command.
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Unit to compile; defaults to the configured entry unit.
    pub unit: Option<String>,

    /// Module name, e.g. `app::di::AppContainer`.
    #[arg(short, long)]
    pub module: Option<String>,

    /// Emit the module as JSON instead of Rust source.
    #[arg(long)]
    pub json: bool,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Executes the `compile` command.
///
/// # Errors
///
/// Returns an error if interpretation or compilation fails, or the output
/// cannot be written.
pub fn execute(args: CompileArgs, config: &BuildConfig) -> anyhow::Result<()> {
    let unit = args.unit.as_deref().unwrap_or(&config.entry);
    let module_name = args.module.as_deref().unwrap_or(&config.module);
    tracing::info!(unit, module = module_name, json = args.json, "compiling unit");

    let module = super::factory(config).module(module_name).compile(unit)?;
    let text = if args.json {
        module.to_json()?
    } else {
        RustRenderer.render(&module)?
    };

    if let Some(ref out_path) = args.out {
        std::fs::write(out_path, &text)?;
        println!("Compiled {unit} -> {}", out_path.display());
        println!("Services: {}", module.units.len());
        println!("Aliases: {}", module.aliases.len());
    } else {
        print!("{text}");
    }
    Ok(())
}
