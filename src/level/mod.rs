//! Severity levels the admission gate compares against configured thresholds.
//!
//! Ranks run from 300 (`FINEST`) to 1000 (`SEVERE`); a threshold of `900` means warnings and up.

use std::fmt;
use std::str::FromStr;

/// Derives `Ord` so callers can compare severities directly; `rank()` exposes the numeric scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Level {
    /// Highest-volume tracing.
    Finest,
    /// Detailed tracing.
    Finer,
    /// Developer diagnostics.
    Fine,
    /// Static configuration messages.
    Config,
    /// Normal operational milestones.
    #[default]
    Info,
    /// Potential problems.
    Warning,
    /// Serious failures.
    Severe,
}

impl Level {
    /// Numeric rank; higher is more severe.
    #[must_use]
    pub const fn rank(self) -> i32 {
        match self {
            Self::Finest => 300,
            Self::Finer => 400,
            Self::Fine => 500,
            Self::Config => 700,
            Self::Info => 800,
            Self::Warning => 900,
            Self::Severe => 1000,
        }
    }

    /// Upper-case name used as the record's `level` field, the collector label
    /// and the per-level override key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Finest => "FINEST",
            Self::Finer => "FINER",
            Self::Fine => "FINE",
            Self::Config => "CONFIG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Severe => "SEVERE",
        }
    }

    /// All levels from least to most severe.
    #[must_use]
    pub const fn all() -> [Self; 7] {
        [
            Self::Finest,
            Self::Finer,
            Self::Fine,
            Self::Config,
            Self::Info,
            Self::Warning,
            Self::Severe,
        ]
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by `FromStr` so callers can distinguish "unknown level" from other parse failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(String);

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log level: '{}'", self.0)
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "finest" | "trace" => Ok(Self::Finest),
            "finer" => Ok(Self::Finer),
            "fine" | "debug" => Ok(Self::Fine),
            "config" => Ok(Self::Config),
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "severe" | "error" | "err" => Ok(Self::Severe),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}
