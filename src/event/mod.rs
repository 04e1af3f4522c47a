//! The structured event a log call site produces, before any gating or encoding.

mod metadata;
mod value;

pub use metadata::{MetadataEntry, TagSet, TagSetBuilder};
pub use value::{Thrown, Value};

use crate::level::Level;
use chrono::Utc;
use std::panic::Location;

/// Where a log statement was written. Only the line number is mandatory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSite {
    /// Module path or type name of the caller.
    pub class_name: Option<String>,
    pub file_name: Option<String>,
    pub line_number: u32,
    pub method_name: Option<String>,
}

impl CallSite {
    /// Captures the file and line of the code that called this function.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self {
            class_name: None,
            file_name: Some(location.file().to_string()),
            line_number: location.line(),
            method_name: None,
        }
    }

    #[must_use]
    pub fn class_name(mut self, name: impl Into<String>) -> Self {
        self.class_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn method_name(mut self, name: impl Into<String>) -> Self {
        self.method_name = Some(name.into());
        self
    }
}

/// Builds a [`CallSite`] for the invoking location, with the module path as class name.
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::event::CallSite {
            class_name: Some(module_path!().to_string()),
            file_name: Some(file!().to_string()),
            line_number: line!(),
            method_name: None,
        }
    };
}

/// Immutable record of one log statement.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    message: Option<String>,
    level: Option<Level>,
    timestamp_nanos: i64,
    thrown: Option<Thrown>,
    call_site: Option<CallSite>,
    metadata: Vec<MetadataEntry>,
}

impl LogEvent {
    #[must_use]
    pub fn builder() -> LogEventBuilder {
        LogEventBuilder::default()
    }

    /// Level and message, stamped with the current time.
    #[must_use]
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self::builder().level(level).message(message).build()
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[must_use]
    pub const fn level(&self) -> Option<Level> {
        self.level
    }

    /// Wall-clock nanoseconds since the Unix epoch.
    #[must_use]
    pub const fn timestamp_nanos(&self) -> i64 {
        self.timestamp_nanos
    }

    /// Whole seconds since the epoch, rounded toward negative infinity.
    #[must_use]
    pub const fn epoch_seconds(&self) -> i64 {
        self.timestamp_nanos.div_euclid(1_000_000_000)
    }

    #[must_use]
    pub const fn thrown(&self) -> Option<&Thrown> {
        self.thrown.as_ref()
    }

    #[must_use]
    pub const fn call_site(&self) -> Option<&CallSite> {
        self.call_site.as_ref()
    }

    #[must_use]
    pub fn metadata(&self) -> &[MetadataEntry] {
        &self.metadata
    }

    /// Copy of this event with a call site filled in; used when a locator supplies one late.
    #[must_use]
    pub fn with_call_site(&self, call_site: CallSite) -> Self {
        Self {
            call_site: Some(call_site),
            ..self.clone()
        }
    }
}

#[derive(Debug, Default)]
pub struct LogEventBuilder {
    message: Option<String>,
    level: Option<Level>,
    timestamp_nanos: Option<i64>,
    thrown: Option<Thrown>,
    call_site: Option<CallSite>,
    metadata: Vec<MetadataEntry>,
}

impl LogEventBuilder {
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub const fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub const fn timestamp_nanos(mut self, nanos: i64) -> Self {
        self.timestamp_nanos = Some(nanos);
        self
    }

    #[must_use]
    pub fn thrown(mut self, thrown: Thrown) -> Self {
        self.thrown = Some(thrown);
        self
    }

    #[must_use]
    pub fn call_site(mut self, call_site: CallSite) -> Self {
        self.call_site = Some(call_site);
        self
    }

    /// Single-valued metadata; a later entry with the same label replaces this one in the record.
    #[must_use]
    pub fn field(mut self, label: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.push(MetadataEntry::Scalar {
            label: label.into(),
            value: Some(value.into()),
        });
        self
    }

    /// Repeatable metadata; all occurrences end up in a list under `label`.
    #[must_use]
    pub fn repeated(mut self, label: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.push(MetadataEntry::Repeatable {
            label: label.into(),
            value: Some(value.into()),
        });
        self
    }

    #[must_use]
    pub fn tags(mut self, label: impl Into<String>, tags: TagSet) -> Self {
        self.metadata.push(MetadataEntry::Tags {
            label: label.into(),
            tags,
        });
        self
    }

    /// Raw entry, including ones with an absent value.
    #[must_use]
    pub fn entry(mut self, entry: MetadataEntry) -> Self {
        self.metadata.push(entry);
        self
    }

    /// Missing timestamps are taken from the wall clock at build time.
    #[must_use]
    pub fn build(self) -> LogEvent {
        let timestamp_nanos = self
            .timestamp_nanos
            .unwrap_or_else(|| Utc::now().timestamp_nanos_opt().unwrap_or_default());
        LogEvent {
            message: self.message,
            level: self.level,
            timestamp_nanos,
            thrown: self.thrown,
            call_site: self.call_site,
            metadata: self.metadata,
        }
    }
}
