//! TOML configuration loading, `source = "..."` include resolution, per-logger
//! policy overrides and `flogger.*` property overlays.
//!
//! Separated from struct definitions so that the loading logic (file I/O, cycle detection,
//! merge strategy) stays independent of the serde schema.

mod structs;

pub use structs::{
    DEFAULT_DIAGNOSTICS, DEFAULT_TRANSPORT_KIND, GeneralConfig, LoggerConfig, PolicyConfig,
    RemoteConfig, TransportConfig,
};

use crate::internal;
use crate::level::Level;
use crate::policy::{
    EXCLUSIVE_KEY, INCLUSIVE_KEY, Policy, PolicyResolver, PropertySource, THRESHOLD_KEY,
    level_key,
};
use crate::transport::{
    DEFAULT_HOST, DEFAULT_PORT, HOST_KEY, PORT_KEY, RemoteSettings, TAG_PREFIX_KEY,
};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// An empty file is a valid configuration: every section defaults.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub remote: RemoteConfig,
    pub transport: TransportConfig,
    /// Policy applied to every logger unless overridden below.
    pub policy: PolicyConfig,
    pub loggers: HashMap<String, LoggerConfig>,
}

/// Scans raw TOML for `source = "..."` directives before deserialization,
/// since serde cannot handle repeated top-level keys.
/// Returns the extracted paths and the remaining TOML content stripped of those lines.
#[doc(hidden)]
#[must_use]
pub fn extract_sources(content: &str) -> (Vec<String>, String) {
    let mut sources = Vec::new();
    let mut remaining = String::new();

    for line in content.lines() {
        let trimmed = line.trim();
        let is_source = trimmed
            .strip_prefix("source")
            .is_some_and(|rest| rest.trim_start().starts_with('='));
        if is_source {
            if let Some(path) = trimmed
                .split_once('=')
                .map(|(_, v)| v.trim().trim_matches('"').trim_matches('\''))
                && !path.is_empty()
            {
                sources.push(path.to_string());
            }
        } else {
            remaining.push_str(line);
            remaining.push('\n');
        }
    }

    (sources, remaining)
}

impl Config {
    /// Loads from the default location, resolving includes.
    ///
    /// # Errors
    /// Fails if the config directory can't be determined or TOML parsing hits a syntax error.
    pub fn load() -> Result<Self, crate::Error> {
        let config_path = Self::get_config_path()?;
        let config = Self::load_with_sources(&config_path, &mut HashSet::new())?;
        internal::debug(
            "CONFIG",
            &format!("Config loaded from {}", config_path.display()),
        );
        Ok(config)
    }

    /// Loads configuration from an explicit path instead of the default location.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed, or contains cyclic includes.
    pub fn load_from(path: &Path) -> Result<Self, crate::Error> {
        Self::load_with_sources(path, &mut HashSet::new())
    }

    /// Parses a single TOML document; `source` lines are ignored.
    ///
    /// # Errors
    /// TOML syntax or schema errors.
    pub fn parse(content: &str) -> Result<Self, crate::Error> {
        let (_, toml_content) = extract_sources(content);
        Ok(toml::from_str(&toml_content)?)
    }

    /// Recursive loader that expands `source = "..."` includes while tracking
    /// visited paths in `seen` to break include cycles.
    fn load_with_sources(path: &Path, seen: &mut HashSet<PathBuf>) -> Result<Self, crate::Error> {
        if !path.exists() {
            internal::debug("CONFIG", "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if !seen.insert(canonical.clone()) {
            internal::warn(
                "CONFIG",
                &format!("Cyclic include detected: {}", canonical.display()),
            );
            return Err(crate::Error::CyclicInclude(canonical));
        }

        let content = fs::read_to_string(path)?;
        let (sources, toml_content) = extract_sources(&content);
        let mut config: Self = toml::from_str(&toml_content)?;

        for source_path in sources {
            let expanded = shellexpand::tilde(&source_path);
            let source_file = Path::new(expanded.as_ref());
            if source_file.exists() {
                let source_config = Self::load_with_sources(source_file, seen)?;
                config.merge(source_config);
            } else {
                internal::warn("CONFIG", &format!("Source file not found: {source_path}"));
            }
        }

        Ok(config)
    }

    /// Folds an included config into `self`. The including file wins: only
    /// map entries and unset scalars are taken from `other`.
    pub fn merge(&mut self, other: Self) {
        for (k, v) in other.loggers {
            self.loggers.entry(k).or_insert(v);
        }
        for (k, v) in other.policy.levels {
            self.policy.levels.entry(k).or_insert(v);
        }
        self.policy.exclusive = self.policy.exclusive.or(other.policy.exclusive);
        self.policy.inclusive = self.policy.inclusive.or(other.policy.inclusive);
        if self.policy.threshold.is_none() {
            self.policy.threshold = other.policy.threshold;
        }
        if self.general.tag_prefix.is_none() {
            self.general.tag_prefix = other.general.tag_prefix;
        }
        if self.general.diagnostics.is_none() {
            self.general.diagnostics = other.general.diagnostics;
        }
        if self.remote.host.is_none() {
            self.remote.host = other.remote.host;
        }
        if self.remote.port.is_none() {
            self.remote.port = other.remote.port;
        }
        if self.transport.kind.is_none() {
            self.transport.kind = other.transport.kind;
        }
        if self.transport.path.is_none() {
            self.transport.path = other.transport.path;
        }
    }

    /// Overlays `flogger.*` properties (typically the environment) on top of the file.
    /// Properties win over file values.
    pub fn apply_properties(&mut self, source: &impl PropertySource) {
        let flag = |key: &str| {
            source
                .property(key)
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
        };
        if let Some(v) = flag(EXCLUSIVE_KEY) {
            self.policy.exclusive = Some(v);
        }
        if let Some(v) = flag(INCLUSIVE_KEY) {
            self.policy.inclusive = Some(v);
        }
        if let Some(raw) = source.property(THRESHOLD_KEY) {
            self.policy.threshold = Some(toml::Value::String(raw));
        }
        for level in Level::all() {
            if let Some(v) = flag(&level_key(level)) {
                self.policy.levels.insert(level.as_str().to_string(), v);
            }
        }
        if let Some(host) = source.property(HOST_KEY) {
            self.remote.host = Some(host);
        }
        if let Some(port) = source.property(PORT_KEY) {
            self.remote.port = Some(toml::Value::String(port));
        }
        if let Some(prefix) = source.property(TAG_PREFIX_KEY) {
            self.general.tag_prefix = Some(prefix);
        }
    }

    /// Global policy with the logger's own section laid over it.
    #[must_use]
    pub fn policy_config_for(&self, name: &str) -> PolicyConfig {
        self.loggers
            .get(name)
            .map_or_else(|| self.policy.clone(), |l| self.policy.overlay(&l.policy))
    }

    /// Collector address; missing or malformed values fall back to `localhost:24224`.
    #[must_use]
    pub fn remote_settings(&self) -> RemoteSettings {
        let host = self
            .remote
            .host
            .clone()
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = self.remote.port.as_ref().map_or(DEFAULT_PORT, |raw| {
            let parsed = match raw {
                toml::Value::Integer(i) => u16::try_from(*i).ok(),
                toml::Value::String(s) => s.trim().parse().ok(),
                _ => None,
            };
            parsed.unwrap_or_else(|| {
                internal::warn("CONFIG", &format!("Ignoring malformed port {raw}"));
                DEFAULT_PORT
            })
        });
        RemoteSettings { host, port }
    }

    /// Config stores the diagnostics level as a string for TOML ergonomics.
    #[must_use]
    pub fn parse_diagnostics_level(&self) -> Level {
        self.general.diagnostics().parse().unwrap_or(Level::Warning)
    }

    /// `<config_dir>/fluentgate/fluentgate.toml`.
    ///
    /// # Errors
    /// Fails when the platform has no concept of a config directory.
    pub fn get_config_path() -> Result<PathBuf, crate::Error> {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("fluentgate").join("fluentgate.toml"))
            .ok_or(crate::Error::ConfigDirNotFound)
    }
}

impl PolicyResolver for Config {
    fn resolve(&self, name: &str) -> Policy {
        self.policy_config_for(name).to_policy(name)
    }
}
