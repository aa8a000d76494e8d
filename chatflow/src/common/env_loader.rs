//! Prefixed environment variable lookup with typed parsing

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Reads `<PREFIX>_<NAME>` variables, treating unset, blank and unparsable
/// values alike as absent
#[derive(Debug, Clone)]
pub struct EnvLoader {
    prefix: String,
}

impl EnvLoader {
    /// Create a loader for variables named `<prefix>_<NAME>`
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    /// Full variable name for `name`
    pub fn key(&self, name: &str) -> String {
        format!("{}_{}", self.prefix, name)
    }

    fn raw(&self, name: &str) -> Option<String> {
        env::var(self.key(name))
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Parsed value, or `None` when unset or unparsable
    pub fn optional<T: FromStr>(&self, name: &str) -> Option<T> {
        let raw = self.raw(name)?;
        match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring unparsable value '{}' for {}", raw, self.key(name));
                None
            }
        }
    }

    /// Parsed value accepted by `validator`, else `default`
    pub fn validated<T, F>(&self, name: &str, default: T, validator: F) -> T
    where
        T: FromStr,
        F: Fn(&T) -> bool,
    {
        match self.optional(name) {
            Some(value) if validator(&value) => value,
            Some(_) => {
                tracing::warn!("Ignoring out-of-range value for {}", self.key(name));
                default
            }
            None => default,
        }
    }

    /// Whole seconds as a [`Duration`]; zero is rejected
    pub fn duration_secs(&self, name: &str, default: Duration) -> Duration {
        match self.optional::<u64>(name) {
            Some(0) => {
                tracing::warn!("Ignoring zero duration for {}", self.key(name));
                default
            }
            Some(secs) => Duration::from_secs(secs),
            None => default,
        }
    }

    /// Non-blank path value
    pub fn path(&self, name: &str) -> Option<PathBuf> {
        self.raw(name).map(PathBuf::from)
    }
}
