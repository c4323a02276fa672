//! Formatted output helpers for CLI commands.

use std::fmt::Write;

use wirebox_lang::{Argument, Namespace};

/// Renders a unit's namespace as an indented summary.
#[must_use]
pub fn namespace_summary(unit: &str, namespace: &Namespace) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Unit: {unit}");

    let _ = writeln!(out, "  Parameters ({}):", namespace.parameters().len());
    for (name, value) in namespace.parameters() {
        let _ = writeln!(out, "    :{name} = {value}");
    }

    let _ = writeln!(out, "  Services ({}):", namespace.services().len());
    for (name, definition) in namespace.services() {
        let args: Vec<String> = definition.arguments.iter().map(format_argument).collect();
        let scope = if definition.shared { "shared" } else { "transient" };
        let _ = writeln!(
            out,
            "    @{name}: {}({}) [{scope}]",
            definition.class,
            args.join(", ")
        );
        for call in &definition.method_calls {
            let args: Vec<String> = call.arguments.iter().map(format_argument).collect();
            let _ = writeln!(out, "      - {}({})", call.name, args.join(", "));
        }
        for tag in definition.metadata.keys() {
            let _ = writeln!(out, "      = {tag}");
        }
    }

    let _ = writeln!(out, "  Aliases ({}):", namespace.aliases().len());
    for (name, target) in namespace.aliases() {
        let _ = writeln!(out, "    @{name} -> @{target}");
    }
    out
}

/// Formats an argument the way it is written in a unit.
#[must_use]
pub fn format_argument(argument: &Argument) -> String {
    match argument {
        Argument::Dependency(name) => format!("@{name}"),
        Argument::Parameter(name) => format!(":{name}"),
        Argument::Raw(value) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use wirebox_lang::MemorySourceResolver;

    use super::*;

    #[test]
    fn summary_lists_everything() {
        let ns = Namespace::parse(
            "\
:db.host: 'localhost'
transient @logger: app.Logger
@db: app.Database(:db.host, @logger, 3)
  - setTimeout(30)
  = tag: 'x'
@database: @db",
            &MemorySourceResolver::new(),
        )
        .expect("interpret");
        let text = namespace_summary("app", &ns);
        assert!(text.contains("Unit: app"));
        assert!(text.contains(":db.host = \"localhost\""));
        assert!(text.contains("@logger: app.Logger() [transient]"));
        assert!(text.contains("@db: app.Database(:db.host, @logger, 3) [shared]"));
        assert!(text.contains("- setTimeout(30)"));
        assert!(text.contains("= tag"));
        assert!(text.contains("@database -> @db"));
    }

    #[test]
    fn arguments_use_unit_syntax() {
        assert_eq!(format_argument(&Argument::Dependency("a".into())), "@a");
        assert_eq!(format_argument(&Argument::Parameter("p".into())), ":p");
        assert_eq!(format_argument(&Argument::Raw("s".into())), "\"s\"");
    }
}
