//! Turns a [`LogEvent`] into the flat attribute map a collector receives.
//!
//! Field order matters only for overwrite semantics: fixed fields are written
//! first, then metadata in insertion order, then repeatable buckets.

mod tags;

pub use tags::flatten;

use crate::event::{LogEvent, MetadataEntry, Value};
use crate::internal;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

pub const MESSAGE: &str = "message";
pub const LEVEL: &str = "level";
pub const THROWN: &str = "thrown";
pub const STACK_TRACE: &str = "stackTrace";
pub const TIMESTAMP_NANOS: &str = "timestampNanos";
pub const CLASS_NAME: &str = "className";
pub const FILE_NAME: &str = "fileName";
pub const LINE_NUMBER: &str = "lineNumber";
pub const METHOD_NAME: &str = "methodName";

/// Cause chains longer than this are treated as unrenderable.
const MAX_CAUSES: usize = 64;

const CONTEXT_PREFIX: &str = "[CONTEXT";

/// Everything before the first ` [CONTEXT` of a message ending in `]`.
static TRAILING_CONTEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(.*?) \[CONTEXT.*\]$").expect("Invalid context regex"));

/// Sink-ready attribute map. Keys are kept sorted so equal events encode to equal records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value previously stored under `key`, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The list stored under `key`, created or replacing a non-list value first.
    pub(crate) fn list_mut(&mut self, key: &str) -> &mut Vec<Value> {
        let slot = self
            .0
            .entry(key.to_string())
            .or_insert_with(|| Value::List(Vec::new()));
        if !matches!(slot, Value::List(_)) {
            *slot = Value::List(Vec::new());
        }
        match slot {
            Value::List(items) => items,
            _ => unreachable!("slot was just made a list"),
        }
    }
}

/// A field that could not be rendered; the record carries a marker in its place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingFailure {
    pub field: &'static str,
    pub reason: String,
}

impl fmt::Display for EncodingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not render '{}': {}", self.field, self.reason)
    }
}

impl std::error::Error for EncodingFailure {}

/// Encodes an event. Never fails; unrenderable fields are replaced by a marker.
#[must_use]
pub fn encode(event: &LogEvent) -> Record {
    encode_with_failures(event).0
}

/// Like [`encode`], also returning what had to be replaced by a marker.
#[must_use]
pub fn encode_with_failures(event: &LogEvent) -> (Record, Vec<EncodingFailure>) {
    let mut out = Record::new();
    let mut failures = Vec::new();

    if let Some(message) = event.message().and_then(strip_context) {
        out.insert(MESSAGE, message);
    }
    if let Some(level) = event.level() {
        out.insert(LEVEL, level.as_str());
    }
    if let Some(thrown) = event.thrown() {
        out.insert(THROWN, thrown.clone());
        match render_stack_trace(thrown.error()) {
            Ok(trace) => {
                out.insert(STACK_TRACE, trace);
            }
            Err(reason) => {
                internal::warn("ENCODE", &format!("Unrenderable stack trace: {reason}"));
                out.insert(STACK_TRACE, format!("<unrenderable stack trace: {reason}>"));
                failures.push(EncodingFailure {
                    field: STACK_TRACE,
                    reason,
                });
            }
        }
    }
    out.insert(TIMESTAMP_NANOS, event.timestamp_nanos());

    if let Some(site) = event.call_site() {
        if let Some(class_name) = &site.class_name {
            out.insert(CLASS_NAME, class_name.as_str());
        }
        if let Some(file_name) = &site.file_name {
            out.insert(FILE_NAME, file_name.as_str());
        }
        out.insert(LINE_NUMBER, site.line_number);
        if let Some(method_name) = &site.method_name {
            out.insert(METHOD_NAME, method_name.as_str());
        }
    }

    // Label order of first appearance, so buckets merge deterministically.
    let mut repeated: Vec<(String, Vec<Value>)> = Vec::new();
    for entry in event.metadata() {
        match entry {
            MetadataEntry::Tags { label, tags } => flatten(label, tags, &mut out),
            MetadataEntry::Repeatable { value: None, .. }
            | MetadataEntry::Scalar { value: None, .. } => {}
            MetadataEntry::Repeatable {
                label,
                value: Some(value),
            } => match repeated.iter_mut().find(|(l, _)| l == label) {
                Some((_, values)) => values.push(value.clone()),
                None => repeated.push((label.clone(), vec![value.clone()])),
            },
            MetadataEntry::Scalar {
                label,
                value: Some(value),
            } => {
                out.insert(label.as_str(), value.clone());
            }
        }
    }
    for (label, values) in repeated {
        out.insert(label, Value::List(values));
    }

    (out, failures)
}

/// Drops a trailing `[CONTEXT ...]` annotation.
///
/// Returns `None` when nothing but the annotation is left.
#[must_use]
pub fn strip_context(message: &str) -> Option<&str> {
    if message.starts_with(CONTEXT_PREFIX) {
        return None;
    }
    let text = TRAILING_CONTEXT
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map_or(message, |m| m.as_str());
    (!text.is_empty()).then_some(text)
}

/// Display of the error followed by one `Caused by:` line per source.
///
/// # Errors
/// Returns the reason when the chain revisits an error or exceeds [`MAX_CAUSES`] links.
pub fn render_stack_trace(error: &(dyn std::error::Error + 'static)) -> Result<String, String> {
    // Wide pointers: a newtype and the error it wraps share an address but not a vtable.
    let mut seen: Vec<*const (dyn std::error::Error + 'static)> = Vec::new();
    let mut trace = String::new();
    let mut current = Some(error);
    let mut depth = 0;

    while let Some(err) = current {
        let ptr = std::ptr::from_ref(err);
        if seen.iter().any(|&p| std::ptr::eq(p, ptr)) {
            return Err(format!("cause chain is cyclic after {depth} links"));
        }
        seen.push(ptr);
        if depth >= MAX_CAUSES {
            return Err(format!("cause chain exceeds {MAX_CAUSES} links"));
        }
        if depth == 0 {
            trace.push_str(&err.to_string());
        } else {
            trace.push_str("\nCaused by: ");
            trace.push_str(&err.to_string());
        }
        depth += 1;
        current = err.source();
    }

    trace.push('\n');
    Ok(trace)
}
