//! Admission gate: whether a statement at a given level is emitted at all.
//!
//! Two independent axes combine here. The mode picks a coarse default
//! (log everything except a subset, or nothing except a subset) and the
//! threshold narrows it by rank. Per-level overrides always beat the threshold.

mod resolver;

pub use resolver::{
    EXCLUSIVE_KEY, EnvProperties, INCLUSIVE_KEY, LEVEL_PREFIX, PolicyResolver,
    PropertiesPolicyResolver, PropertySource, THRESHOLD_KEY, level_key, parse_threshold,
};

use crate::level::Level;
use std::collections::HashMap;

/// Coarse enablement default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Nothing configured; everything is enabled.
    #[default]
    Unset,
    /// Enabled unless excluded by an override or the threshold.
    Exclusive,
    /// Disabled unless included by an override or the threshold.
    Inclusive,
    /// Both exclusive and inclusive were requested. Resolves to enabled so an
    /// ambiguous configuration never drops output.
    Conflict,
}

impl Mode {
    /// Maps the two optional configuration signals to a mode.
    ///
    /// `exclusive = false` on its own means deny-by-default, matching the
    /// single-switch configuration older deployments use.
    #[must_use]
    pub const fn from_signals(exclusive: Option<bool>, inclusive: Option<bool>) -> Self {
        match (exclusive, inclusive) {
            (None, None) => Self::Unset,
            (Some(true), Some(true)) => Self::Conflict,
            (Some(true), _) | (None, Some(false)) => Self::Exclusive,
            (Some(false), _) | (None, Some(true)) => Self::Inclusive,
        }
    }
}

/// Immutable snapshot of the gating configuration for one logger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    mode: Mode,
    /// Keyed by upper-case level name.
    overrides: HashMap<String, bool>,
    threshold: Option<i32>,
}

impl Policy {
    /// Everything enabled.
    #[must_use]
    pub fn unset() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_threshold(mut self, rank: i32) -> Self {
        self.threshold = Some(rank);
        self
    }

    /// Forces the named level. Only `true` overrides take part in the decision;
    /// `false` is recorded but behaves like no override.
    #[must_use]
    pub fn with_override(mut self, level_name: &str, value: bool) -> Self {
        self.overrides.insert(level_name.to_uppercase(), value);
        self
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub const fn threshold(&self) -> Option<i32> {
        self.threshold
    }

    #[must_use]
    pub fn override_for(&self, level: Level) -> Option<bool> {
        self.overrides.get(level.as_str()).copied()
    }

    /// Decides admission for `level`; first matching rule wins.
    ///
    /// Without a level the override and threshold rules cannot apply, so the
    /// mode's default is returned.
    #[must_use]
    pub fn is_enabled(&self, level: Option<Level>) -> bool {
        match self.mode {
            Mode::Unset | Mode::Conflict => true,
            Mode::Exclusive => {
                let Some(level) = level else { return true };
                if self.override_for(level) == Some(true) {
                    return false;
                }
                self.threshold.is_none_or(|t| level.rank() < t)
            }
            Mode::Inclusive => {
                let Some(level) = level else { return false };
                if self.override_for(level) == Some(true) {
                    return true;
                }
                self.threshold.is_some_and(|t| level.rank() >= t)
            }
        }
    }
}
