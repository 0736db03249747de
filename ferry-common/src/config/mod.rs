//! Access to the MTA's configuration-parameter registry.
//!
//! The registry itself (parameter names, built-in defaults, overrides from
//! the main configuration file) lives outside this workspace. Consumers only
//! see it through [`ParameterSource`], a `get(name) -> value` lookup, and
//! use the helpers here to turn raw values into typed settings.

use std::collections::{BTreeMap, HashMap};

use crate::ConfigError;

/// A `get(name) -> value` view of the parameter registry.
pub trait ParameterSource {
    /// Returns the effective value of `name`, or `None` when the registry
    /// has no such parameter.
    fn get(&self, name: &str) -> Option<String>;
}

impl ParameterSource for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

impl ParameterSource for BTreeMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        BTreeMap::get(self, name).cloned()
    }
}

impl<T: ParameterSource + ?Sized> ParameterSource for &T {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }
}

/// Reads a boolean parameter, accepting `yes`/`no` and `true`/`false` in
/// any case.
///
/// # Errors
/// Returns [`ConfigError::InvalidValue`] for anything else.
pub fn get_bool(
    source: &impl ParameterSource,
    name: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(value) = source.get(name) else {
        return Ok(default);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" => Ok(true),
        "no" | "false" => Ok(false),
        _ => Err(ConfigError::invalid(name, &value, "expected yes or no")),
    }
}

/// Reads a list parameter. Elements are separated by commas and/or
/// whitespace; empty elements are dropped.
#[must_use]
pub fn get_list(source: &impl ParameterSource, name: &str) -> Option<Vec<String>> {
    source.get(name).map(|value| {
        value
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
}
