//! Rendering a compiled module as source text.
//!
//! Rendering is a separate step from compilation: a [`Renderer`] turns the
//! [`CompiledModule`] IR into text for one target. [`RustRenderer`] emits a
//! Rust module whose resolver units are plain methods against
//! `wirebox-runtime`.

use wirebox_common::error::{Result, WireboxError};
use wirebox_common::types::Value;

use crate::ir::{CompiledModule, Construct, Expr, ResolverUnit};

/// Turns a compiled module into source text.
pub trait Renderer {
    /// Renders `module`.
    ///
    /// # Errors
    ///
    /// Returns an error if the module cannot be expressed in the target.
    fn render(&self, module: &CompiledModule) -> Result<String>;
}

/// Renders a module as Rust source.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustRenderer;

/// Indented line buffer.
#[derive(Default)]
struct Source {
    text: String,
    depth: usize,
}

impl Source {
    fn line(&mut self, line: impl AsRef<str>) {
        let line = line.as_ref();
        if !line.is_empty() {
            for _ in 0..self.depth {
                self.text.push_str("    ");
            }
            self.text.push_str(line);
        }
        self.text.push('\n');
    }

    fn open(&mut self, line: impl AsRef<str>) {
        self.line(line);
        self.depth += 1;
    }

    fn close(&mut self, line: impl AsRef<str>) {
        self.depth = self.depth.saturating_sub(1);
        self.line(line);
    }
}

impl Renderer for RustRenderer {
    fn render(&self, module: &CompiledModule) -> Result<String> {
        tracing::info!(module = %module.name, "rendering rust module");
        let mut out = Source::default();
        out.line("// Generated by wirebox. Do not edit.");
        out.line("");

        let local = rust_ident(module.name.local())?;
        for segment in module.name.namespace() {
            out.open(format!("pub mod {} {{", rust_ident(&segment.to_lowercase())?));
        }

        render_imports(&mut out);
        render_tables(&mut out, module);
        render_struct(&mut out, module, &local);
        render_dispatch(&mut out, module, &local);

        for _ in module.name.namespace() {
            out.close("}");
        }
        Ok(out.text)
    }
}

fn render_imports(out: &mut Source) {
    out.line("use std::sync::Arc;");
    out.line("");
    out.line("use wirebox_common::error::{Result, WireboxError};");
    out.line("use wirebox_common::types::Value;");
    out.line("use wirebox_runtime::{Arg, ClassRegistry, CompiledUnits, Container, Instance};");
    out.line("");
}

fn render_tables(out: &mut Source, module: &CompiledModule) {
    out.line("/// Tag and the services carrying it.");
    out.open("pub const TAGGED_SERVICES: &[(&str, &[&str])] = &[");
    for (tag, services) in &module.metadata {
        out.line(format!("({tag:?}, &[{}]),", quoted(services.keys())));
    }
    out.close("];");
    out.line("");

    out.line("/// Service and the tags it carries.");
    out.open("pub const SERVICE_TAGS: &[(&str, &[&str])] = &[");
    for (service, tags) in &module.service_tags {
        out.line(format!("({service:?}, &[{}]),", quoted(tags)));
    }
    out.close("];");
    out.line("");

    out.line("/// Tag payloads as `(tag, service, payloads)`, one payload per tag line.");
    out.open("pub fn metadata() -> Vec<(&'static str, &'static str, Vec<Vec<Value>>)> {");
    out.open("vec![");
    for (tag, services) in &module.metadata {
        for (service, payloads) in services {
            let payloads: Vec<String> = payloads
                .iter()
                .map(|payload| {
                    let values: Vec<String> = payload.iter().map(value_expr).collect();
                    format!("vec![{}]", values.join(", "))
                })
                .collect();
            out.line(format!("({tag:?}, {service:?}, vec![{}]),", payloads.join(", ")));
        }
    }
    out.close("]");
    out.close("}");
    out.line("");
}

fn quoted<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> String {
    names
        .into_iter()
        .map(|name| format!("{:?}", name.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_struct(out: &mut Source, module: &CompiledModule, local: &str) {
    out.line(format!("/// Compiled container `{}`.", module.name));
    out.open(format!("pub struct {local} {{"));
    out.line("classes: ClassRegistry,");
    out.close("}");
    out.line("");

    out.open(format!("impl {local} {{"));
    out.line("/// Creates a container running this module.");
    out.open("pub fn load(classes: ClassRegistry) -> Result<Container> {");
    out.line("let container = Container::with_units(Arc::new(Self { classes }));");
    for (name, value) in &module.parameters {
        out.line(format!("container.set_parameter({name:?}, {});", value_expr(value)));
    }
    for (name, method) in &module.method_names {
        out.line(format!("container.register_method({name:?}, {method:?})?;"));
    }
    for (name, target) in &module.aliases {
        out.line(format!("container.alias({name:?}, {target:?})?;"));
    }
    out.line("Ok(container)");
    out.close("}");

    for (method, unit) in &module.units {
        out.line("");
        render_unit(out, method, unit);
    }

    out.line("");
    out.open("fn parameter(container: &Container, name: &str) -> Result<Value> {");
    out.open("container.parameter(name).ok_or_else(|| WireboxError::Container {");
    out.line("message: format!(\"parameter \\\"{name}\\\" is not defined\"),");
    out.close("})");
    out.close("}");
    out.close("}");
    out.line("");
}

fn render_unit(out: &mut Source, method: &str, unit: &ResolverUnit) {
    let service = &unit.service;
    out.open(format!(
        "fn {}(&self, {}: &Container) -> Result<Instance> {{",
        snake_case(method),
        if uses_container(unit) { "container" } else { "_container" }
    ));
    if unit.shared {
        out.open(format!(
            "if let Some(instance) = container.resolved_instance({service:?}) {{"
        ));
        out.line("return Ok(instance);");
        out.close("}");
    }

    let (factory, args) = match &unit.construct {
        Construct::New { args, .. } => ("None".to_owned(), args),
        Construct::StaticFactory { method, args, .. } => (format!("Some({method:?})"), args),
    };
    out.open(format!(
        "let {}pending = self.classes.construct({service:?}, {:?}, {factory}, vec![",
        if unit.calls.is_empty() { "" } else { "mut " },
        unit.construct.class()
    ));
    render_args(out, args);
    out.close("])?;");
    for call in &unit.calls {
        out.open(format!("pending.call({:?}, vec![", call.method));
        render_args(out, &call.args);
        out.close("])?;");
    }

    if unit.shared {
        out.line(format!(
            "Ok(container.cache_instance({service:?}, pending.finish()))"
        ));
    } else {
        out.line("Ok(pending.finish())");
    }
    out.close("}");
}

fn render_args(out: &mut Source, args: &[Expr]) {
    for arg in args {
        out.line(format!("{},", arg_expr(arg)));
    }
}

fn render_dispatch(out: &mut Source, module: &CompiledModule, local: &str) {
    out.open(format!("impl CompiledUnits for {local} {{"));
    out.open("fn call(&self, container: &Container, method: &str) -> Result<Instance> {");
    out.open("match method {");
    for method in module.units.keys() {
        out.line(format!("{method:?} => self.{}(container),", snake_case(method)));
    }
    out.line("_ => Err(WireboxError::unknown_service(method, \"no resolver unit with this name\")),");
    out.close("}");
    out.close("}");
    out.close("}");
}

fn uses_container(unit: &ResolverUnit) -> bool {
    unit.shared
        || unit
            .construct
            .args()
            .iter()
            .chain(unit.calls.iter().flat_map(|call| call.args.iter()))
            .any(|arg| !matches!(arg, Expr::Literal { .. }))
}

const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// A module segment as a Rust identifier, raw when it is a keyword.
fn rust_ident(segment: &str) -> Result<String> {
    if matches!(segment, "_" | "crate" | "self" | "Self" | "super") {
        return Err(WireboxError::builder(format!(
            "\"{segment}\" cannot name a generated Rust item"
        )));
    }
    if RUST_KEYWORDS.contains(&segment) {
        Ok(format!("r#{segment}"))
    } else {
        Ok(segment.to_owned())
    }
}

fn arg_expr(expr: &Expr) -> String {
    match expr {
        Expr::SelfRef => "Arg::Service(Arc::new(container.clone()))".to_owned(),
        Expr::SharedInvoke { service, method } => format!(
            "Arg::Service(match container.resolved_instance({service:?}) {{ Some(i) => i, None => self.{}(container)? }})",
            snake_case(method)
        ),
        Expr::Invoke { method } => format!("Arg::Service(self.{}(container)?)", snake_case(method)),
        Expr::Lookup { service } => format!("Arg::Service(container.get({service:?})?)"),
        Expr::Parameter { name } => format!("Arg::Value(Self::parameter(container, {name:?})?)"),
        Expr::Literal { value } => format!("Arg::Value({})", value_expr(value)),
    }
}

fn value_expr(value: &Value) -> String {
    match value {
        Value::Null => "Value::Null".to_owned(),
        Value::Bool(b) => format!("Value::Bool({b})"),
        Value::Int(n) => format!("Value::Int({n})"),
        Value::Float(x) => format!("Value::Float({x:?})"),
        Value::String(s) => format!("Value::String({s:?}.to_owned())"),
        Value::List(items) => {
            let items: Vec<String> = items.iter().map(value_expr).collect();
            format!("Value::List(vec![{}])", items.join(", "))
        }
    }
}

/// `resolveDbHost1` to `resolve_db_host1`.
fn snake_case(method: &str) -> String {
    let mut out = String::with_capacity(method.len() + 4);
    for c in method.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use wirebox_lang::{ArgumentList, ServiceDefinition};

    use super::*;
    use crate::builder::ContainerBuilder;

    fn module() -> CompiledModule {
        let mut b = ContainerBuilder::new("app::di::AppContainer").expect("module name");
        b.add_parameter("db.host", "localhost");
        b.add_service("logger", ServiceDefinition::new("app.Logger").unshared())
            .expect("add");
        b.add_service(
            "db",
            ServiceDefinition::new("app.Database")
                .with_arguments(ArgumentList::new().parameter("db.host").dependency("logger"))
                .with_call("setTimeout", ArgumentList::new().raw(30))
                .with_metadata("tag", vec![Value::from("storage")]),
        )
        .expect("add");
        b.add_alias("database", "db").expect("alias");
        b.build().expect("build")
    }

    #[test]
    fn snake_cases_method_names() {
        assert_eq!(snake_case("resolveDbHostMain"), "resolve_db_host_main");
        assert_eq!(snake_case("resolveFooBar1"), "resolve_foo_bar1");
    }

    #[test]
    fn renders_nested_modules_and_struct() {
        let text = RustRenderer.render(&module()).expect("render");
        assert!(text.starts_with("// Generated by wirebox."));
        assert!(text.contains("pub mod app {"));
        assert!(text.contains("    pub mod di {"));
        assert!(text.contains("pub struct AppContainer {"));
        assert!(text.contains("impl CompiledUnits for AppContainer {"));
    }

    #[test]
    fn renders_tables() {
        let text = RustRenderer.render(&module()).expect("render");
        assert!(text.contains(
            r#"container.set_parameter("db.host", Value::String("localhost".to_owned()));"#
        ));
        assert!(text.contains(r#"container.register_method("db", "resolveDb")?;"#));
        assert!(text.contains(r#"container.alias("database", "db")?;"#));
        assert!(text.contains(r#"("tag", &["db"]),"#));
        assert!(text.contains("pub const SERVICE_TAGS: &[(&str, &[&str])] = &["));
        assert!(text.contains(r#"("db", &["tag"]),"#));
        assert!(text.contains(
            r#"("tag", "db", vec![vec![Value::String("storage".to_owned())]]),"#
        ));
    }

    #[test]
    fn keyword_segments_render_as_raw_identifiers() {
        let module = ContainerBuilder::new("gen::Type::match")
            .expect("module name")
            .build()
            .expect("build");
        let text = RustRenderer.render(&module).expect("render");
        assert!(text.contains("pub mod r#gen {"));
        assert!(text.contains("pub mod r#type {"));
        assert!(text.contains("pub struct r#match {"));

        for name in ["self::AppContainer", "app::Self", "crate::X"] {
            let module = ContainerBuilder::new(name)
                .expect("module name")
                .build()
                .expect("build");
            assert!(
                matches!(RustRenderer.render(&module), Err(WireboxError::Builder { .. })),
                "rendered {name}"
            );
        }
    }

    #[test]
    fn units_without_lookups_ignore_the_container() {
        let text = RustRenderer.render(&module()).expect("render");
        assert!(
            text.contains("fn resolve_logger(&self, _container: &Container) -> Result<Instance> {")
        );
        assert!(text.contains("fn resolve_db(&self, container: &Container) -> Result<Instance> {"));
    }

    #[test]
    fn renders_resolver_units() {
        let text = RustRenderer.render(&module()).expect("render");
        assert!(text.contains("fn resolve_db(&self, container: &Container) -> Result<Instance> {"));
        assert!(text.contains(r#"if let Some(instance) = container.resolved_instance("db") {"#));
        assert!(text.contains("Arg::Service(self.resolve_logger(container)?),"));
        assert!(text.contains(r#"Arg::Value(Self::parameter(container, "db.host")?),"#));
        assert!(text.contains(r#"pending.call("setTimeout", vec!["#));
        assert!(text.contains(r#"Ok(container.cache_instance("db", pending.finish()))"#));
        assert!(text.contains(r#""resolveLogger" => self.resolve_logger(container),"#));

        let logger = text
            .split("fn resolve_logger")
            .nth(1)
            .and_then(|rest| rest.split("\n\n").next())
            .expect("logger unit");
        assert!(!logger.contains("resolved_instance"));
        assert!(logger.contains("Ok(pending.finish())"));
    }

    #[test]
    fn renders_literals() {
        assert_eq!(
            value_expr(&Value::List(vec![Value::Float(1.0), Value::Null, Value::from("a\"b")])),
            r#"Value::List(vec![Value::Float(1.0), Value::Null, Value::String("a\"b".to_owned())])"#
        );
    }
}
