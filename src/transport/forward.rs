//! Fluentd forward protocol, message mode: each record goes out as a msgpack
//! `[tag, time, record]` array over TCP.

use super::{Transport, TransportFactory, full_tag, tag_prefix};
use crate::encode::Record;
use crate::internal;
use crate::policy::PropertySource;
use std::io::Write;
use std::net::TcpStream;
use std::sync::{Mutex, PoisonError};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 24224;

pub const HOST_KEY: &str = "flogger.fluentd_host";
pub const PORT_KEY: &str = "flogger.fluentd_port";
pub const TAG_PREFIX_KEY: &str = "flogger.tag_prefix";

/// Where the collector listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSettings {
    pub host: String,
    pub port: u16,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl RemoteSettings {
    /// Reads `flogger.fluentd_host` / `flogger.fluentd_port`. Missing or malformed values fall back to defaults.
    pub fn from_properties(source: &impl PropertySource) -> Self {
        let host = source
            .property(HOST_KEY)
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = source.property(PORT_KEY).map_or(DEFAULT_PORT, |raw| {
            raw.trim().parse().unwrap_or_else(|_| {
                internal::warn("REMOTE", &format!("Ignoring malformed port '{raw}'"));
                DEFAULT_PORT
            })
        });
        Self { host, port }
    }
}

/// Connects on first send and keeps the connection until a write fails.
#[derive(Debug)]
pub struct ForwardTransport {
    tag_prefix: String,
    settings: RemoteSettings,
    stream: Mutex<Option<TcpStream>>,
}

impl ForwardTransport {
    #[must_use]
    pub fn new(tag_prefix: impl Into<String>, settings: RemoteSettings) -> Self {
        Self {
            tag_prefix: tag_prefix.into(),
            settings,
            stream: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn tag_prefix(&self) -> &str {
        &self.tag_prefix
    }

    #[must_use]
    pub const fn settings(&self) -> &RemoteSettings {
        &self.settings
    }

    fn connect(&self, tag: &str) -> Result<TcpStream, crate::Error> {
        let address = (self.settings.host.as_str(), self.settings.port);
        internal::debug(
            "FORWARD",
            &format!("Connecting to {}:{}", self.settings.host, self.settings.port),
        );
        TcpStream::connect(address).map_err(|e| crate::Error::transport(tag, e))
    }
}

impl Transport for ForwardTransport {
    fn send(&self, label: &str, record: &Record, epoch_seconds: i64) -> Result<(), crate::Error> {
        let tag = full_tag(&self.tag_prefix, label);
        let payload = rmp_serde::to_vec(&(&tag, epoch_seconds, record))
            .map_err(|e| crate::Error::Encode(format!("msgpack serialization failed: {e}")))?;

        let mut guard = self.stream.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stream = match guard.take() {
            Some(stream) => stream,
            None => self.connect(&tag)?,
        };
        // A failed write drops the connection; the next send reconnects.
        stream
            .write_all(&payload)
            .map_err(|e| crate::Error::transport(&tag, e))?;
        *guard = Some(stream);
        Ok(())
    }

    fn flush(&self) -> Result<(), crate::Error> {
        let mut guard = self.stream.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(stream) = guard.as_mut() else {
            return Ok(());
        };
        let flushed = flush_to_collector(stream, &self.tag_prefix);
        if flushed.is_err() {
            *guard = None;
        }
        flushed
    }
}

/// Collector I/O failures surface as `Error::Transport`, the same as in `send`.
fn flush_to_collector(stream: &mut impl Write, tag: &str) -> Result<(), crate::Error> {
    stream
        .flush()
        .map_err(|e| crate::Error::transport(tag, e))
}

/// Builds one [`ForwardTransport`] per logger name, all pointed at the same collector.
#[derive(Debug, Clone, Default)]
pub struct ForwardTransportFactory {
    settings: RemoteSettings,
    tag_prefix: Option<String>,
}

impl ForwardTransportFactory {
    #[must_use]
    pub const fn new(settings: RemoteSettings) -> Self {
        Self {
            settings,
            tag_prefix: None,
        }
    }

    /// Replaces every logger's name in its tag with one shared prefix.
    #[must_use]
    pub fn tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tag_prefix = Some(prefix.into());
        self
    }

    /// Settings and tag prefix from `flogger.*` properties.
    pub fn from_properties(source: &impl PropertySource) -> Self {
        Self {
            settings: RemoteSettings::from_properties(source),
            tag_prefix: source.property(TAG_PREFIX_KEY),
        }
    }
}

impl TransportFactory for ForwardTransportFactory {
    fn create(&self, name: &str) -> Result<Box<dyn Transport>, crate::Error> {
        let prefix = tag_prefix(self.tag_prefix.as_deref(), name);
        Ok(Box::new(ForwardTransport::new(prefix, self.settings.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "collector went away"))
        }
    }

    #[test]
    fn flush_failure_is_transport_error() {
        let result = flush_to_collector(&mut BrokenPipe, "app");
        match result {
            Err(crate::Error::Transport { tag, reason }) => {
                assert_eq!(tag, "app");
                assert!(reason.contains("collector went away"));
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn flush_without_connection_is_ok() {
        let transport = ForwardTransport::new("app", RemoteSettings::default());
        assert!(transport.flush().is_ok());
    }
}
