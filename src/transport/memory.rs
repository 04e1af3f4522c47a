//! In-process capture of everything sent, for tests and dry runs.

use super::{Transport, TransportFactory, full_tag, tag_prefix};
use crate::encode::Record;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// One captured send.
#[derive(Debug, Clone, PartialEq)]
pub struct SentRecord {
    pub tag: String,
    pub time: i64,
    pub record: Record,
}

/// Shared store behind every [`MemoryTransport`] built from it. Cloning shares the store.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<SentRecord>>>,
    failing: Arc<AtomicBool>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn transport(&self, tag_prefix: impl Into<String>) -> MemoryTransport {
        MemoryTransport {
            tag_prefix: tag_prefix.into(),
            sink: self.clone(),
        }
    }

    /// While set, every send fails with `Error::Transport` and nothing is stored.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    #[must_use]
    pub fn records(&self) -> Vec<SentRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[derive(Debug, Clone)]
pub struct MemoryTransport {
    tag_prefix: String,
    sink: MemorySink,
}

impl Transport for MemoryTransport {
    fn send(&self, label: &str, record: &Record, epoch_seconds: i64) -> Result<(), crate::Error> {
        let tag = full_tag(&self.tag_prefix, label);
        if self.sink.failing.load(Ordering::SeqCst) {
            return Err(crate::Error::transport(tag, "memory sink set to fail"));
        }
        self.sink
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SentRecord {
                tag,
                time: epoch_seconds,
                record: record.clone(),
            });
        Ok(())
    }
}

/// Builds memory transports over one sink and counts how many it built.
#[derive(Debug, Default)]
pub struct MemoryTransportFactory {
    sink: MemorySink,
    tag_prefix: Option<String>,
    created: AtomicUsize,
}

impl MemoryTransportFactory {
    #[must_use]
    pub fn new(sink: MemorySink) -> Self {
        Self {
            sink,
            tag_prefix: None,
            created: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tag_prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn sink(&self) -> &MemorySink {
        &self.sink
    }

    /// Number of transports built so far.
    #[must_use]
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl TransportFactory for MemoryTransportFactory {
    fn create(&self, name: &str) -> Result<Box<dyn Transport>, crate::Error> {
        self.created.fetch_add(1, Ordering::SeqCst);
        let prefix = tag_prefix(self.tag_prefix.as_deref(), name);
        Ok(Box::new(self.sink.transport(prefix)))
    }
}
