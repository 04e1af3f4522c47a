//! Dry run: shows the attribute map without touching any transport.

use crate::cli::EventArgs;
use crate::cli::util::{build_event, parse_level};
use crate::encode;
use crate::internal;
use std::process::ExitCode;

#[must_use]
pub fn cmd_encode(level: &str, message: &[String], args: &EventArgs) -> ExitCode {
    let Some(level) = parse_level(level) else {
        return ExitCode::FAILURE;
    };
    let record = encode::encode(&build_event(level, message, args));
    match serde_json::to_string_pretty(&record) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            internal::error("CLI", &format!("JSON serialization failed: {e}"));
            ExitCode::FAILURE
        }
    }
}
