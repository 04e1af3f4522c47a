//! Configuration struct definitions.

use crate::internal;
use crate::policy::{Mode, Policy, parse_threshold};
use serde::Deserialize;
use std::collections::HashMap;

pub const DEFAULT_DIAGNOSTICS: &str = "warning";
pub const DEFAULT_TRANSPORT_KIND: &str = "forward";

/// General configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Collector tag prefix shared by every logger. Unset means each logger's name is used.
    pub tag_prefix: Option<String>,
    /// Minimum level of fluentgate's own diagnostics on stderr. Unset means `warning`.
    pub diagnostics: Option<String>,
}

impl GeneralConfig {
    #[must_use]
    pub fn diagnostics(&self) -> &str {
        self.diagnostics.as_deref().unwrap_or(DEFAULT_DIAGNOSTICS)
    }
}

/// Collector address. Kept as raw TOML so a malformed port degrades to the default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub host: Option<String>,
    pub port: Option<toml::Value>,
}

/// Which transport the registry builds.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// `forward` (TCP to the collector) or `jsonl` (local file). Unset means `forward`.
    pub kind: Option<String>,
    /// JSONL file path; defaults to the platform state directory.
    pub path: Option<String>,
}

impl TransportConfig {
    #[must_use]
    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or(DEFAULT_TRANSPORT_KIND)
    }
}

/// Gating configuration as written in the file. Every field is optional so
/// per-logger sections can override single fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub exclusive: Option<bool>,
    pub inclusive: Option<bool>,
    /// Integer or numeric string; anything else is ignored with a warning.
    pub threshold: Option<toml::Value>,
    /// Per-level overrides keyed by level name.
    pub levels: HashMap<String, bool>,
}

impl PolicyConfig {
    /// `other`'s fields win where set; level maps are merged.
    #[must_use]
    pub fn overlay(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        if other.exclusive.is_some() {
            merged.exclusive = other.exclusive;
        }
        if other.inclusive.is_some() {
            merged.inclusive = other.inclusive;
        }
        if other.threshold.is_some() {
            merged.threshold.clone_from(&other.threshold);
        }
        for (k, v) in &other.levels {
            merged.levels.insert(k.clone(), *v);
        }
        merged
    }

    /// Resolves to an immutable [`Policy`]. Conflicts and malformed thresholds
    /// are recovered here and only reported as warnings.
    #[must_use]
    pub fn to_policy(&self, name: &str) -> Policy {
        let mode = Mode::from_signals(self.exclusive, self.inclusive);
        if mode == Mode::Conflict {
            internal::warn(
                "POLICY",
                &format!("Both exclusive and inclusive set for '{name}', enabling all levels"),
            );
        }

        let mut policy = Policy::new(mode);
        if let Some(raw) = &self.threshold {
            match threshold_rank(raw) {
                Some(rank) => policy = policy.with_threshold(rank),
                None => internal::warn(
                    "POLICY",
                    &format!("Ignoring malformed threshold {raw} for '{name}'"),
                ),
            }
        }
        for (level, value) in &self.levels {
            policy = policy.with_override(level, *value);
        }
        policy
    }
}

fn threshold_rank(raw: &toml::Value) -> Option<i32> {
    match raw {
        toml::Value::Integer(i) => i32::try_from(*i).ok(),
        toml::Value::String(s) => parse_threshold(s),
        _ => None,
    }
}

/// Per-logger overrides, keyed by logger name in `[loggers."name"]`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub policy: PolicyConfig,
}
