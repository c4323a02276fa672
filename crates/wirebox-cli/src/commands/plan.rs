//! `wbx plan`: display the construction order of a unit's services.

use clap::Args;
use wirebox_common::config::BuildConfig;

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Unit to plan; defaults to the configured entry unit.
    pub unit: Option<String>,
}

/// Executes the `plan` command.
///
/// Interprets the unit, builds the dependency graph, and prints services
/// with their direct dependencies, dependencies first.
///
/// # Errors
///
/// Returns an error if interpretation fails or the services depend on each
/// other cyclically.
pub fn execute(args: PlanArgs, config: &BuildConfig) -> anyhow::Result<()> {
    let unit = args.unit.as_deref().unwrap_or(&config.entry);
    let namespace = super::factory(config).namespace(unit)?;
    let graph = wirebox_lang::graph::DependencyGraph::from_namespace(&namespace);
    let order = graph.resolve_order()?;

    println!("Construction plan for: {unit}");
    println!();
    for name in &order {
        let deps = graph.dependencies_of(name);
        if deps.is_empty() {
            println!("  + {name}");
        } else {
            println!("  + {name} <- {}", deps.join(", "));
        }
    }
    println!();
    println!("  {} service(s) and alias(es).", order.len());
    Ok(())
}
