//! Filter configuration.
//!
//! Filters are configured from string key/value pairs, the way a
//! pipeline definition hands them over. Values are parsed once at
//! construction into immutable typed settings.

use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::policy::{CountLimits, NetworkSet};

/// Parses a boolean configuration or header value.
///
/// Accepts `true/false`, `1/0`, `yes/no` and `on/off`, ignoring case and
/// surrounding whitespace.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Raw string configuration for a filter.
///
/// # Examples
///
/// ```
/// use network_attach_policy::FilterConf;
///
/// let global = FilterConf::from_pairs([("networks_max", "1"), ("enabled", "true")]);
/// let conf = global.overlay([("networks_max", "2")]);
///
/// assert_eq!(conf.usize_or("networks_max", 1).unwrap(), 2);
/// assert!(conf.bool_or("enabled", false).unwrap());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConf {
    values: BTreeMap<String, String>,
}

impl FilterConf {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from key/value pairs.
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

    /// Returns a copy with `local` pairs layered over this configuration.
    pub fn overlay<I, K, V>(&self, local: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut merged = self.clone();
        for (k, v) in local {
            merged.set(k, v);
        }
        merged
    }

    /// Sets a single value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Returns the raw value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns `key` parsed as a boolean, or `default` when unset.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the value is not a recognized boolean.
    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => parse_bool(raw)
                .ok_or_else(|| ConfigError::new(key, raw, "expected a boolean")),
        }
    }

    /// Returns `key` parsed as a non-negative integer, or `default` when unset.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the value is not a non-negative integer.
    pub fn usize_or(&self, key: &str, default: usize) -> Result<usize, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::new(key, raw, "expected a non-negative integer")),
        }
    }

    /// Returns `key` split on whitespace as a set of network ids.
    pub fn networks(&self, key: &str) -> NetworkSet {
        self.get(key)
            .map(|raw| raw.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

/// Settings shared by every filter: on/off switch and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSettings {
    /// Whether the filter evaluates requests at all
    pub enabled: bool,
    /// Whether per-request override headers are honored
    pub runtime_overrides: bool,
    /// Name attached to every log event
    pub log_name: String,
}

impl FilterSettings {
    /// Reads `enabled`, `runtime_overrides` and `log_name`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an unparsable boolean.
    pub fn from_conf(conf: &FilterConf, default_log_name: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            enabled: conf.bool_or("enabled", true)?,
            runtime_overrides: conf.bool_or("runtime_overrides", false)?,
            log_name: conf
                .get("log_name")
                .map(str::to_string)
                .unwrap_or_else(|| default_log_name.to_string()),
        })
    }
}

/// Network count, required and banned set policy.
///
/// Built once per filter and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
    /// Networks that must be present at boot and may not be detached
    pub required_networks: NetworkSet,
    /// Networks that may never be attached
    pub banned_networks: NetworkSet,
    /// Networks left out of the isolated count
    pub optional_networks: NetworkSet,
    /// Minimum isolated networks at boot; `0` disables the bound
    pub networks_min: usize,
    /// Maximum isolated networks
    pub networks_max: usize,
    /// Count optional networks as isolated
    pub count_optional_nets: bool,
    /// Treat a boot without `networks` as booting with none
    pub strict_boot_check: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            required_networks: NetworkSet::new(),
            banned_networks: NetworkSet::new(),
            optional_networks: NetworkSet::new(),
            networks_min: 1,
            networks_max: 1,
            count_optional_nets: false,
            strict_boot_check: false,
        }
    }
}

impl PolicyConfig {
    /// Parses the policy keys out of `conf`.
    ///
    /// `networks_min > networks_max` is accepted; such a policy rejects
    /// every counted request. See [`limits_consistent`](Self::limits_consistent).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for unparsable integers or booleans.
    pub fn from_conf(conf: &FilterConf) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            required_networks: conf.networks("required_nets"),
            banned_networks: conf.networks("banned_nets"),
            optional_networks: conf.networks("optional_nets"),
            networks_min: conf.usize_or("networks_min", defaults.networks_min)?,
            networks_max: conf.usize_or("networks_max", defaults.networks_max)?,
            count_optional_nets: conf
                .bool_or("count_optional_nets", defaults.count_optional_nets)?,
            strict_boot_check: conf.bool_or("strict_boot_check", defaults.strict_boot_check)?,
        })
    }

    /// Count limits applied at boot.
    pub fn limits(&self) -> CountLimits {
        CountLimits::new(self.networks_min, self.networks_max)
    }

    /// Returns false when `networks_min > networks_max`.
    pub fn limits_consistent(&self) -> bool {
        self.networks_min <= self.networks_max
    }
}
