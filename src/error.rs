//! Unified error type for all fluentgate operations.

use std::path::PathBuf;

/// Error type for fluentgate operations.
#[derive(Debug)]
pub enum Error {
    /// I/O error.
    Io(std::io::Error),
    /// TOML config parsing error.
    ConfigParse(toml::de::Error),
    /// Config directory not found.
    ConfigDirNotFound,
    /// Cyclic include detected in config sources.
    CyclicInclude(PathBuf),
    /// A record could not be serialized for the wire.
    Encode(String),
    /// The transport failed to hand a record to the collector.
    Transport {
        /// Full collector tag the record was addressed to.
        tag: String,
        /// Underlying failure, rendered.
        reason: String,
    },
    /// The registry could not build a backend for a logger name.
    Construction {
        /// Logger name whose backend failed to build.
        name: String,
        /// Failure reported by the collaborator.
        source: Box<Error>,
    },
}

impl Error {
    /// Shorthand used by transports, which only know the tag and the failure text.
    pub fn transport(tag: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Transport {
            tag: tag.into(),
            reason: reason.to_string(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ConfigParse(e) => write!(f, "parse error: {e}"),
            Self::ConfigDirNotFound => write!(f, "config directory not found"),
            Self::CyclicInclude(p) => write!(f, "cyclic include: {}", p.display()),
            Self::Encode(s) => write!(f, "encode error: {s}"),
            Self::Transport { tag, reason } => write!(f, "transport error for '{tag}': {reason}"),
            Self::Construction { name, source } => {
                write!(f, "failed to construct backend '{name}': {source}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::ConfigParse(e) => Some(e),
            Self::Construction { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::ConfigParse(e)
    }
}
