//! Per-logger-name backends and the registry that caches them.
//!
//! A [`Backend`] bundles the resolved policy with the transport for one logger
//! name. Call sites check [`Backend::is_enabled`] before building an event and
//! hand the event to [`Backend::emit`] afterwards.

mod from_config;
mod registry;

pub use registry::{BackendRegistry, RegistryBuilder};

use crate::encode::{self, Record};
use crate::event::{CallSite, LogEvent};
use crate::internal;
use crate::level::Level;
use crate::policy::Policy;
use crate::transport::Transport;
use chrono::Utc;
use std::fmt;
use std::sync::Arc;

/// Supplies a call site for events created without one.
pub trait CallSiteLocator: Send + Sync {
    fn locate(&self, event: &LogEvent) -> Option<CallSite>;
}

impl<F> CallSiteLocator for F
where
    F: Fn(&LogEvent) -> Option<CallSite> + Send + Sync,
{
    fn locate(&self, event: &LogEvent) -> Option<CallSite> {
        self(event)
    }
}

pub struct Backend {
    name: String,
    policy: Policy,
    transport: Box<dyn Transport>,
    locator: Option<Arc<dyn CallSiteLocator>>,
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .field("locator", &self.locator.is_some())
            .finish_non_exhaustive()
    }
}

impl Backend {
    #[must_use]
    pub fn new(name: impl Into<String>, policy: Policy, transport: Box<dyn Transport>) -> Self {
        Self {
            name: name.into(),
            policy,
            transport,
            locator: None,
        }
    }

    #[must_use]
    pub fn with_locator(mut self, locator: Arc<dyn CallSiteLocator>) -> Self {
        self.locator = Some(locator);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn policy(&self) -> &Policy {
        &self.policy
    }

    #[must_use]
    pub fn is_enabled(&self, level: Level) -> bool {
        self.policy.is_enabled(Some(level))
    }

    /// Encodes `event` and sends it under the event's level name.
    ///
    /// Fields that cannot be rendered are sent as markers and then reported
    /// through [`Self::report_encoding_failure`]; they never fail the call.
    ///
    /// # Errors
    /// The transport's failure, unchanged. Nothing is retried.
    pub fn emit(&self, event: &LogEvent) -> Result<(), crate::Error> {
        let located;
        let event = match (event.call_site(), &self.locator) {
            (None, Some(locator)) => match locator.locate(event) {
                Some(site) => {
                    located = event.with_call_site(site);
                    &located
                }
                None => event,
            },
            _ => event,
        };

        let (record, failures) = encode::encode_with_failures(event);
        let label = event.level().unwrap_or_default().as_str();
        if let Err(e) = self.transport.send(label, &record, event.epoch_seconds()) {
            internal::warn("BACKEND", &format!("[{}] {e}", self.name));
            return Err(e);
        }

        for failure in &failures {
            if let Err(e) = self.report_encoding_failure(failure, event) {
                internal::warn(
                    "BACKEND",
                    &format!("[{}] Could not report encoding failure: {e}", self.name),
                );
            }
        }
        Ok(())
    }

    /// Sends a `SEVERE` record describing why `event` could not be logged normally.
    ///
    /// # Errors
    /// The transport's failure, unchanged.
    pub fn report_encoding_failure(
        &self,
        error: &dyn std::error::Error,
        event: &LogEvent,
    ) -> Result<(), crate::Error> {
        let mut record = Record::new();
        record.insert(encode::LEVEL, Level::Severe.as_str());
        record.insert(encode::MESSAGE, error_report(error, event));
        self.transport
            .send(Level::Severe.as_str(), &record, Utc::now().timestamp())
    }

    /// # Errors
    /// I/O errors from the transport.
    pub fn flush(&self) -> Result<(), crate::Error> {
        self.transport.flush()
    }
}

fn error_report(error: &dyn std::error::Error, event: &LogEvent) -> String {
    let level = event.level().map_or("<none>", Level::as_str);
    let message = event.message().unwrap_or("<none>");
    format!(
        "LOGGING ERROR: {error}\n  original message: {message}\n  original level: {level}\n  timestamp (nanos): {}",
        event.timestamp_nanos()
    )
}
