//! Append-only JSONL file: one object per line, greppable and `jq`-friendly,
//! for hosts where no collector runs or for replaying into one later.

use super::{Transport, TransportFactory, full_tag, tag_prefix};
use crate::encode::Record;
use crate::internal;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use ulid::Ulid;

#[derive(Debug, Serialize)]
struct JsonLine<'a> {
    /// Time-sortable and unique across concurrent writers.
    id: String,
    /// RFC 3339 rendering of `time`.
    ts: String,
    tag: String,
    time: i64,
    record: &'a Record,
}

/// Default location under the platform state directory.
#[must_use]
pub fn default_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "fluentgate").map_or_else(
        || PathBuf::from("fluentgate.jsonl"),
        |dirs| {
            dirs.state_dir()
                .unwrap_or_else(|| dirs.data_dir())
                .join("records.jsonl")
        },
    )
}

/// Expands `~` so config values stay portable.
fn resolve_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).as_ref())
}

#[derive(Debug, Clone)]
pub struct JsonlTransport {
    tag_prefix: String,
    file_path: PathBuf,
}

impl JsonlTransport {
    /// Creates missing parent directories up front so a bad path fails at construction.
    ///
    /// # Errors
    /// I/O errors creating the parent directory.
    pub fn new(tag_prefix: impl Into<String>, path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let file_path = resolve_path(path.as_ref());
        if let Some(parent) = file_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
            internal::debug("JSONL", &format!("Created directory: {}", parent.display()));
        }
        Ok(Self {
            tag_prefix: tag_prefix.into(),
            file_path,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl Transport for JsonlTransport {
    fn send(&self, label: &str, record: &Record, epoch_seconds: i64) -> Result<(), crate::Error> {
        let tag = full_tag(&self.tag_prefix, label);
        let ts = DateTime::<Utc>::from_timestamp(epoch_seconds, 0)
            .unwrap_or_default()
            .to_rfc3339();
        let line = JsonLine {
            id: Ulid::new().to_string(),
            ts,
            tag: tag.clone(),
            time: epoch_seconds,
            record,
        };
        let mut json = serde_json::to_string(&line)
            .map_err(|e| crate::Error::Encode(format!("JSON serialization failed: {e}")))?;
        json.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
            .map_err(|e| crate::Error::transport(&tag, e))?;
        // Single write so concurrent appenders never interleave within a line.
        file.write_all(json.as_bytes())
            .map_err(|e| crate::Error::transport(&tag, e))
    }
}

/// All loggers append to the same file; the tag tells them apart.
#[derive(Debug, Clone)]
pub struct JsonlTransportFactory {
    path: PathBuf,
    tag_prefix: Option<String>,
}

impl Default for JsonlTransportFactory {
    fn default() -> Self {
        Self::new(default_path())
    }
}

impl JsonlTransportFactory {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tag_prefix: None,
        }
    }

    #[must_use]
    pub fn tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tag_prefix = Some(prefix.into());
        self
    }
}

impl TransportFactory for JsonlTransportFactory {
    fn create(&self, name: &str) -> Result<Box<dyn Transport>, crate::Error> {
        let prefix = tag_prefix(self.tag_prefix.as_deref(), name);
        Ok(Box::new(JsonlTransport::new(prefix, &self.path)?))
    }
}
