//! Environment placeholders in configuration values.
//!
//! String values in `config.toml` may reference the environment:
//! - `{env:VAR_NAME}` - replaced by the variable, error when unset
//! - `{env:VAR_NAME:default}` - replaced by the variable or `default`
//!
//! Deployments use this to keep client ids and origins out of the file.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Group 1: variable name. Group 2: optional default value.
static ENV_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{env:([^:}]+)(?::([^}]*))?\}").expect("env regex pattern is valid and tested")
});

/// Errors that can occur during placeholder substitution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubstitutionError {
    /// Environment variable not found and no default provided.
    #[error("Environment variable '{0}' not found and no default provided")]
    EnvVarNotFound(String),
}

/// Placeholder substitution engine.
///
/// Variable lookup is injectable so callers (and tests) can resolve
/// placeholders without touching the process environment.
pub struct ConfigSubstitution {
    lookup: Box<dyn Fn(&str) -> Option<String> + Send + Sync>,
}

impl Default for ConfigSubstitution {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSubstitution {
    /// Resolves variables from the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lookup: Box::new(|name| std::env::var(name).ok()),
        }
    }

    /// Resolves variables with a custom lookup function.
    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// Substitutes every placeholder in `input`.
    ///
    /// Reports the first unresolvable variable.
    pub fn substitute(&self, input: &str) -> Result<String, SubstitutionError> {
        let mut failure: Option<SubstitutionError> = None;

        let replaced = ENV_REGEX.replace_all(input, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            match (self.lookup)(name) {
                Some(value) => value,
                None => match caps.get(2) {
                    Some(default) => default.as_str().to_string(),
                    None => {
                        if failure.is_none() {
                            failure = Some(SubstitutionError::EnvVarNotFound(name.to_string()));
                        }
                        String::new()
                    }
                },
            }
        });

        match failure {
            Some(e) => Err(e),
            None => Ok(replaced.into_owned()),
        }
    }
}

/// Recursively substitutes placeholders in every string of a TOML value.
pub fn substitute_toml_value(
    value: &mut toml::Value,
    substitution: &ConfigSubstitution,
) -> Result<(), SubstitutionError> {
    match value {
        toml::Value::String(s) => {
            *s = substitution.substitute(s)?;
        }
        toml::Value::Array(arr) => {
            for item in arr.iter_mut() {
                substitute_toml_value(item, substitution)?;
            }
        }
        toml::Value::Table(table) => {
            for (_, v) in table.iter_mut() {
                substitute_toml_value(v, substitution)?;
            }
        }
        _ => {}
    }
    Ok(())
}
