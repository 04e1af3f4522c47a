//! Ships one record, the same way an application call site would.

use crate::backend::BackendRegistry;
use crate::cli::EventArgs;
use crate::cli::util::{build_event, parse_level};
use crate::config::Config;
use crate::internal;
use std::process::ExitCode;

/// A disabled level is not an error: the record is dropped and the command succeeds.
#[must_use]
pub fn cmd_emit(
    config: &Config,
    logger: &str,
    level: &str,
    message: &[String],
    args: &EventArgs,
) -> ExitCode {
    let Some(level) = parse_level(level) else {
        return ExitCode::FAILURE;
    };

    let registry = BackendRegistry::from_config(config);
    let backend = match registry.resolve(logger) {
        Ok(backend) => backend,
        Err(e) => {
            internal::error("CLI", &e.to_string());
            return ExitCode::FAILURE;
        }
    };

    if !backend.is_enabled(level) {
        internal::info("CLI", &format!("{level} is disabled for '{logger}'"));
        return ExitCode::SUCCESS;
    }

    let event = build_event(level, message, args);
    let sent = backend.emit(&event).and_then(|()| registry.flush());
    match sent {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            internal::error("CLI", &e.to_string());
            ExitCode::FAILURE
        }
    }
}
