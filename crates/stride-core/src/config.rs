//! Kernel configuration
//!
//! A flat string map read once when a pipeline is built. Values come from code
//! (`Config::set`, `Config::from_pairs`) or from `STRIDE_*` environment
//! variables (`Config::from_env`).

use std::collections::BTreeMap;
use std::env;
use std::str::FromStr;
use stride_constants::config::ENV_PREFIX;
use thiserror::Error;
use tracing::warn;

/// Configuration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for '{key}': expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("component '{name}' rejected its configuration: {reason}")]
    Rejected { name: String, reason: String },
}

impl ConfigError {
    /// Create an invalid value error
    pub fn invalid_value(key: &str, value: &str, expected: &'static str) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected,
        }
    }

    /// Create a rejection error raised by an extension or listener
    pub fn rejected<S: Into<String>>(name: &str, reason: S) -> Self {
        Self::Rejected {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Flat key/value configuration with typed getters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    values: BTreeMap<String, String>,
}

impl Config {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration from key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Create a configuration from `STRIDE_*` environment variables
    ///
    /// `STRIDE_RETRY_COUNT=3` becomes `stride.retry.count = 3`. Variables with
    /// a non-Unicode name are ignored. A non-Unicode value is kept lossily, so
    /// typed getters reject it as an invalid value.
    pub fn from_env() -> Self {
        Self::from_pairs(env::vars_os().filter_map(|(name, value)| {
            let key = env_key(name.to_str()?)?;
            let value = match value.into_string() {
                Ok(value) => value,
                Err(raw) => {
                    warn!(key = %key, "Environment value is not valid Unicode");
                    raw.to_string_lossy().into_owned()
                }
            };
            Some((key, value))
        }))
    }

    /// Set a value, builder style
    pub fn set<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.values.insert(key.into(), value.to_string());
        self
    }

    /// Overlay `other` on top of this configuration
    pub fn merge(mut self, other: Config) -> Self {
        self.values.extend(other.values);
        self
    }

    /// Raw value lookup
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Check if a key is set
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Get a string value or the default
    pub fn get_str(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// Get a boolean value or the default
    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(true),
                "false" | "no" | "off" | "0" => Ok(false),
                _ => Err(ConfigError::invalid_value(key, raw, "a boolean")),
            },
        }
    }

    /// Get a signed integer value or the default
    pub fn get_i32(&self, key: &str, default: i32) -> Result<i32, ConfigError> {
        self.parse(key, default, "a signed 32-bit integer")
    }

    /// Get an unsigned integer value or the default
    pub fn get_u32(&self, key: &str, default: u32) -> Result<u32, ConfigError> {
        self.parse(key, default, "an unsigned 32-bit integer")
    }

    /// Get an unsigned 64-bit integer value or the default
    pub fn get_u64(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        self.parse(key, default, "an unsigned 64-bit integer")
    }

    /// Optional signed integer, `None` when the key is unset
    pub fn get_opt_i32(&self, key: &str) -> Result<Option<i32>, ConfigError> {
        self.get(key)
            .map(|raw| {
                i32::from_str(raw.trim())
                    .map_err(|_| ConfigError::invalid_value(key, raw, "a signed 32-bit integer"))
            })
            .transpose()
    }

    /// Number of configured keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if nothing is configured
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn parse<V: FromStr>(&self, key: &str, default: V, expected: &'static str) -> Result<V, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => V::from_str(raw.trim())
                .map_err(|_| ConfigError::invalid_value(key, raw, expected)),
        }
    }
}

/// Map an environment variable name to a configuration key
fn env_key(name: &str) -> Option<String> {
    let rest = name.strip_prefix(ENV_PREFIX)?;
    if rest.is_empty() {
        return None;
    }
    Some(format!("stride.{}", rest.to_ascii_lowercase().replace('_', ".")))
}
