//! Host classes shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use wirebox_sdk::ContainerFactory;
use wirebox_sdk::common::error::WireboxError;
use wirebox_sdk::runtime::{Arg, Class, ClassRegistry, Container};

static NEXT_LOGGER: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug)]
pub struct Logger {
    pub id: usize,
    pub name: String,
}

#[derive(Debug)]
pub struct Database {
    pub host: String,
    pub logger: Arc<Logger>,
    pub label: Option<String>,
    pub timeout: Option<i64>,
    pub notes: Vec<String>,
}

#[derive(Debug)]
pub struct Report {
    pub db: Arc<Database>,
    pub host: String,
    pub copies: i64,
    pub notes: Vec<String>,
}

/// `unit` built once through the compiled module and once bound dynamically.
pub fn both_paths(factory: &ContainerFactory, unit: &str) -> [Container; 2] {
    [
        factory.create(unit).expect("compiled"),
        factory.create_dynamic(unit).expect("dynamic"),
    ]
}

fn missing(class: &str, what: &str) -> WireboxError {
    WireboxError::Factory {
        name: class.to_owned(),
        message: format!("missing {what}"),
    }
}

pub fn classes() -> ClassRegistry {
    ClassRegistry::new()
        .with(
            "app.Logger",
            Class::new("app.Logger")
                .constructor(|args: Vec<Arg>| {
                    Ok(Logger {
                        id: NEXT_LOGGER.fetch_add(1, Ordering::SeqCst),
                        name: args.first().and_then(Arg::as_str).unwrap_or("default").to_owned(),
                    })
                })
                .factory("named", |args: Vec<Arg>| {
                    Ok(Logger {
                        id: NEXT_LOGGER.fetch_add(1, Ordering::SeqCst),
                        name: format!(
                            "named:{}",
                            args.first().and_then(Arg::as_str).unwrap_or_default()
                        ),
                    })
                }),
        )
        .with(
            "app.Database",
            Class::new("app.Database")
                .constructor(|args: Vec<Arg>| {
                    Ok(Database {
                        host: args
                            .first()
                            .and_then(Arg::as_str)
                            .ok_or_else(|| missing("app.Database", "host"))?
                            .to_owned(),
                        logger: args
                            .get(1)
                            .and_then(Arg::service::<Logger>)
                            .ok_or_else(|| missing("app.Database", "logger"))?,
                        label: args.get(2).and_then(Arg::as_str).map(str::to_owned),
                        timeout: None,
                        notes: Vec::new(),
                    })
                })
                .method("setTimeout", |db: &mut Database, args| {
                    db.timeout = args.first().and_then(Arg::as_int);
                    Ok(())
                })
                .method("note", |db: &mut Database, args| {
                    db.notes.extend(args.iter().map(|a| match a.value() {
                        Some(v) => v.to_string(),
                        None => "<service>".to_owned(),
                    }));
                    Ok(())
                }),
        )
        .with(
            "app.Report",
            Class::new("app.Report")
                .constructor(|args: Vec<Arg>| {
                    Ok(Report {
                        db: args
                            .first()
                            .and_then(Arg::service::<Database>)
                            .ok_or_else(|| missing("app.Report", "db"))?,
                        host: args.get(1).and_then(Arg::as_str).unwrap_or_default().to_owned(),
                        copies: args.get(2).and_then(Arg::as_int).unwrap_or_default(),
                        notes: Vec::new(),
                    })
                })
                .method("note", |report: &mut Report, args| {
                    report
                        .notes
                        .extend(args.iter().filter_map(Arg::as_str).map(str::to_owned));
                    Ok(())
                }),
        )
}
