//! Delivery of encoded records to a collector.
//!
//! The gating and encoding layers only see these traits; concrete transports
//! own their connections and files. None of them retries a failed send.

mod forward;
mod jsonl;
mod memory;

pub use forward::{
    DEFAULT_HOST, DEFAULT_PORT, ForwardTransport, ForwardTransportFactory, HOST_KEY, PORT_KEY,
    RemoteSettings, TAG_PREFIX_KEY,
};
pub use jsonl::{JsonlTransport, JsonlTransportFactory, default_path as default_jsonl_path};
pub use memory::{MemorySink, MemoryTransport, MemoryTransportFactory, SentRecord};

use crate::encode::Record;

/// Per-logger handle to a collector. `Send + Sync` because one backend serves every thread.
pub trait Transport: Send + Sync {
    /// Hands one record to the collector under `label` (the level name).
    ///
    /// # Errors
    /// `Error::Transport` on I/O failure, `Error::Encode` when the record can't be serialized.
    fn send(&self, label: &str, record: &Record, epoch_seconds: i64) -> Result<(), crate::Error>;

    /// Pushes out anything buffered.
    ///
    /// # Errors
    /// I/O errors from the underlying sink.
    fn flush(&self) -> Result<(), crate::Error> {
        Ok(())
    }
}

/// Builds the transport for a logger name. Called once per name by the registry.
pub trait TransportFactory: Send + Sync {
    /// # Errors
    /// Whatever prevented the transport from being built; the registry reports it as a construction failure.
    fn create(&self, name: &str) -> Result<Box<dyn Transport>, crate::Error>;
}

impl<F> TransportFactory for F
where
    F: Fn(&str) -> Result<Box<dyn Transport>, crate::Error> + Send + Sync,
{
    fn create(&self, name: &str) -> Result<Box<dyn Transport>, crate::Error> {
        self(name)
    }
}

/// Collector tag prefix for a logger: the configured prefix if any, otherwise the
/// logger name with Rust path separators turned into tag separators.
#[must_use]
pub fn tag_prefix(configured: Option<&str>, name: &str) -> String {
    match configured {
        Some(prefix) if !prefix.is_empty() => prefix.to_string(),
        _ => name.replace("::", "."),
    }
}

/// Full collector tag, `<prefix>.<label>`.
#[must_use]
pub fn full_tag(prefix: &str, label: &str) -> String {
    format!("{prefix}.{label}")
}
