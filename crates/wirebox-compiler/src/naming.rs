//! Service-name validation and resolver-method naming.

use std::collections::HashSet;

use indexmap::IndexMap;
use wirebox_common::constants::{RESOLVER_PREFIX, SELF_NAME};
use wirebox_common::error::{Result, WireboxError};

/// Checks that `name` can be registered as a service or alias.
///
/// # Errors
///
/// Returns [`WireboxError::Builder`] if the name is empty, reserved, starts
/// with a digit, has surrounding whitespace, starts or ends with `.` or `_`,
/// or contains anything besides alphanumerics, `.` and `_`.
pub fn validate_service_name(name: &str) -> Result<()> {
    let reject = |reason: &str| {
        Err(WireboxError::builder(format!(
            "invalid service name \"{name}\": {reason}"
        )))
    };

    if name.is_empty() {
        return reject("name cannot be empty");
    }
    if name == SELF_NAME {
        return reject("the name is reserved for the container itself");
    }
    if name.trim() != name {
        return reject("surrounding whitespace is not allowed");
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return reject("cannot start with a digit");
    }
    if name.starts_with(['.', '_']) || name.ends_with(['.', '_']) {
        return reject("cannot start or end with `.` or `_`");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
    {
        return reject("only alphanumerics, `.` and `_` are allowed");
    }
    Ok(())
}

/// `resolve` followed by the camel-cased service name, splitting on `.` and
/// `_`.
#[must_use]
pub fn resolver_method_base(service: &str) -> String {
    let mut method = String::from(RESOLVER_PREFIX);
    for segment in service.split(['.', '_']).filter(|s| !s.is_empty()) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            method.extend(first.to_uppercase());
            method.push_str(chars.as_str());
        }
    }
    method
}

/// Assigns each service a unique resolver-method name.
///
/// Names are handed out in registration order; a name whose camel-cased
/// form is already taken gets the next free numeric suffix.
#[derive(Debug, Clone, Default)]
pub struct MethodNames {
    assigned: IndexMap<String, String>,
    taken: HashSet<String>,
}

impl MethodNames {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the method name of `service`, assigning one on first use.
    pub fn assign(&mut self, service: &str) -> &str {
        if !self.assigned.contains_key(service) {
            let base = resolver_method_base(service);
            let mut candidate = base.clone();
            let mut suffix = 1_u32;
            while self.taken.contains(&candidate) {
                candidate = format!("{base}{suffix}");
                suffix += 1;
            }
            let _ = self.taken.insert(candidate.clone());
            let _ = self.assigned.insert(service.to_owned(), candidate);
        }
        self.assigned
            .get(service)
            .map_or("", String::as_str)
    }

    /// Method name previously assigned to `service`.
    ///
    /// # Errors
    ///
    /// Returns [`WireboxError::Builder`] if `service` was never registered.
    pub fn get(&self, service: &str) -> Result<&str> {
        self.assigned
            .get(service)
            .map(String::as_str)
            .ok_or_else(|| {
                WireboxError::builder(format!(
                    "no resolver method for unregistered service \"{service}\""
                ))
            })
    }
}
