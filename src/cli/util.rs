//! Shared helpers for the subcommands: config loading, level parsing and event assembly.

use super::EventArgs;
use crate::config::Config;
use crate::event::{CallSite, LogEvent, TagSet, Value};
use crate::internal;
use crate::level::Level;
use crate::policy::EnvProperties;
use std::path::Path;

/// Explicit path or default location, with `FLOGGER_*` environment variables laid on top.
///
/// # Errors
/// Config read or parse failures.
pub fn load_config(path: Option<&Path>) -> Result<Config, crate::Error> {
    let mut config = match path {
        Some(p) => Config::load_from(p)?,
        None => Config::load()?,
    };
    config.apply_properties(&EnvProperties);
    Ok(config)
}

/// Logs the problem itself so every command reports bad levels the same way.
#[must_use]
pub fn parse_level(raw: &str) -> Option<Level> {
    match raw.parse() {
        Ok(level) => Some(level),
        Err(e) => {
            internal::error("CLI", &e.to_string());
            None
        }
    }
}

fn split_pair(raw: &str) -> Option<(&str, &str)> {
    raw.split_once('=').filter(|(k, _)| !k.is_empty())
}

/// Builds the event described by the command line, stamped with the current time
/// and the CLI's own call site.
#[must_use]
pub fn build_event(level: Level, message: &[String], args: &EventArgs) -> LogEvent {
    let mut builder = LogEvent::builder()
        .level(level)
        .message(message.join(" "))
        .call_site(CallSite::caller().class_name("fluentgate::cli"));

    for raw in &args.fields {
        match split_pair(raw) {
            Some((k, v)) => builder = builder.field(k, Value::parse_lenient(v)),
            None => internal::warn("CLI", &format!("Ignoring field without '=': {raw}")),
        }
    }
    for raw in &args.repeated {
        match split_pair(raw) {
            Some((k, v)) => builder = builder.repeated(k, Value::parse_lenient(v)),
            None => internal::warn("CLI", &format!("Ignoring repeat without '=': {raw}")),
        }
    }
    if !args.tags.is_empty() {
        let mut tags = TagSet::builder();
        for raw in &args.tags {
            tags = match split_pair(raw) {
                Some((k, v)) => tags.tag_value(k, Value::parse_lenient(v)),
                None => tags.tag(raw.as_str()),
            };
        }
        builder = builder.tags(args.tag_label.as_str(), tags.build());
    }
    builder.build()
}
