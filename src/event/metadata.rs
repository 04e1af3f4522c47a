//! Metadata attached to a log statement.

use super::Value;
use std::collections::{BTreeMap, BTreeSet};

/// One metadata entry. The three shapes encode differently, so the encoder
/// branches on the variant instead of inspecting values.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataEntry {
    /// Last write wins under `label`.
    Scalar { label: String, value: Option<Value> },
    /// Every occurrence is kept; the record gets a list under `label`.
    Repeatable { label: String, value: Option<Value> },
    /// Flag tags collect under `label`, valued tags use their own key.
    Tags { label: String, tags: TagSet },
}

impl MetadataEntry {
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Scalar { label, .. } | Self::Repeatable { label, .. } | Self::Tags { label, .. } => {
                label
            }
        }
    }
}

/// Presence-only tags plus tags carrying a scalar.
///
/// Both halves are sorted so two sets built in different orders encode identically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagSet {
    flags: BTreeSet<String>,
    values: BTreeMap<String, Value>,
}

impl TagSet {
    #[must_use]
    pub fn builder() -> TagSetBuilder {
        TagSetBuilder::default()
    }

    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty() && self.values.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct TagSetBuilder {
    inner: TagSet,
}

impl TagSetBuilder {
    /// Adds a presence-only tag.
    #[must_use]
    pub fn tag(mut self, name: impl Into<String>) -> Self {
        self.inner.flags.insert(name.into());
        self
    }

    /// Adds a tag with a scalar; a later value for the same tag replaces the earlier one.
    #[must_use]
    pub fn tag_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inner.values.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn build(self) -> TagSet {
        self.inner
    }
}
