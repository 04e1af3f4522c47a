//! Where policies come from. The registry asks a resolver once per logger name.

use super::{Mode, Policy};
use crate::internal;
use crate::level::Level;
use std::collections::HashMap;

pub const EXCLUSIVE_KEY: &str = "flogger.exclusive";
pub const INCLUSIVE_KEY: &str = "flogger.inclusive";
pub const THRESHOLD_KEY: &str = "flogger.level";
/// Per-level overrides live under `flogger.<LEVEL>`.
pub const LEVEL_PREFIX: &str = "flogger.";

/// Produces the policy for a logger name. May return [`Policy::unset`].
pub trait PolicyResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Policy;
}

/// A fixed policy applies to every logger.
impl PolicyResolver for Policy {
    fn resolve(&self, _name: &str) -> Policy {
        self.clone()
    }
}

/// Flat key/value configuration lookup. Absent keys return `None`; values are unvalidated.
pub trait PropertySource: Send + Sync {
    fn property(&self, key: &str) -> Option<String>;
}

impl PropertySource for HashMap<String, String> {
    fn property(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Reads properties from the environment: `flogger.fluentd_port` becomes `FLOGGER_FLUENTD_PORT`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvProperties;

impl EnvProperties {
    #[must_use]
    pub fn variable_name(key: &str) -> String {
        key.to_uppercase().replace(['.', '-'], "_")
    }
}

impl PropertySource for EnvProperties {
    fn property(&self, key: &str) -> Option<String> {
        std::env::var(Self::variable_name(key)).ok()
    }
}

/// Builds policies from `flogger.*` properties. The same policy applies to every logger name.
#[derive(Debug, Clone, Default)]
pub struct PropertiesPolicyResolver<P> {
    source: P,
}

impl<P: PropertySource> PropertiesPolicyResolver<P> {
    pub const fn new(source: P) -> Self {
        Self { source }
    }

    fn flag(&self, key: &str) -> Option<bool> {
        self.source
            .property(key)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
    }
}

impl<P: PropertySource> PolicyResolver for PropertiesPolicyResolver<P> {
    fn resolve(&self, name: &str) -> Policy {
        let mode = Mode::from_signals(self.flag(EXCLUSIVE_KEY), self.flag(INCLUSIVE_KEY));
        if mode == Mode::Conflict {
            internal::warn(
                "POLICY",
                &format!("{EXCLUSIVE_KEY} and {INCLUSIVE_KEY} both set for '{name}', enabling all levels"),
            );
        }

        let mut policy = Policy::new(mode);
        if let Some(raw) = self.source.property(THRESHOLD_KEY) {
            match parse_threshold(&raw) {
                Some(rank) => policy = policy.with_threshold(rank),
                None => internal::warn(
                    "POLICY",
                    &format!("Ignoring malformed {THRESHOLD_KEY} value '{raw}'"),
                ),
            }
        }
        for level in Level::all() {
            if let Some(value) = self.flag(&level_key(level)) {
                policy = policy.with_override(level.as_str(), value);
            }
        }
        policy
    }
}

/// Override key for `level`, e.g. `flogger.CONFIG`.
#[must_use]
pub fn level_key(level: Level) -> String {
    format!("{LEVEL_PREFIX}{}", level.as_str())
}

/// Numeric threshold, or `None` for anything that isn't an integer.
#[must_use]
pub fn parse_threshold(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}
