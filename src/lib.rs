//! `fluentgate` - level gating, record encoding and cached Fluentd backends for structured logging.
//!
//! Sits between log call sites and a Fluentd collector:
//! - decides per statement whether it is emitted, from layered and possibly conflicting configuration
//! - flattens a structured event (message, level, call site, error, tags, repeatable keys) into one record
//! - caches one backend per logger name, built at most once even under concurrent lookups
//!
//! # Example
//!
//! ```
//! use fluentgate::{BackendRegistry, Level, LogEvent, MemorySink, MemoryTransportFactory, Mode, Policy, TagSet};
//!
//! let sink = MemorySink::new();
//! let registry = BackendRegistry::builder()
//!     .policy_resolver(Policy::new(Mode::Exclusive).with_override("FINE", true))
//!     .transport_factory(MemoryTransportFactory::new(sink.clone()))
//!     .build();
//!
//! let backend = registry.resolve("shop::billing").unwrap();
//! assert!(!backend.is_enabled(Level::Fine));
//!
//! let event = LogEvent::builder()
//!     .level(Level::Info)
//!     .message("charged card [CONTEXT request=42]")
//!     .tags("tags", TagSet::builder().tag("retry").tag_value("attempt", 2).build())
//!     .build();
//! backend.emit(&event).unwrap();
//!
//! let sent = &sink.records()[0];
//! assert_eq!(sent.tag, "shop.billing.INFO");
//! assert_eq!(sent.record.get("message").and_then(|v| v.as_str()), Some("charged card"));
//! ```
//!
//! # Features
//!
//! - `cli` (default): Enables the `fluentgate` command-line tool

pub mod backend;
pub mod config;
pub mod encode;
mod error;
pub mod event;
pub mod internal;
pub mod level;
pub mod policy;
pub mod transport;

#[cfg(feature = "cli")]
pub mod cli;

// Re-exports for convenience
pub use backend::{Backend, BackendRegistry, CallSiteLocator, RegistryBuilder};
pub use config::Config;
pub use encode::{EncodingFailure, Record, encode, flatten};
pub use error::Error;
pub use event::{CallSite, LogEvent, MetadataEntry, TagSet, Thrown, Value};
pub use level::Level;
pub use policy::{EnvProperties, Mode, Policy, PolicyResolver, PropertiesPolicyResolver, PropertySource};
pub use transport::{
    ForwardTransport, ForwardTransportFactory, JsonlTransport, JsonlTransportFactory, MemorySink,
    MemoryTransport, MemoryTransportFactory, RemoteSettings, SentRecord, Transport,
    TransportFactory,
};
