//! Answers "would this level be logged?" for a logger, using the same resolution as emit.

use crate::cli::util::parse_level;
use crate::config::Config;
use crate::policy::PolicyResolver;
use std::process::ExitCode;

#[must_use]
pub fn cmd_check(config: &Config, logger: &str, level: &str) -> ExitCode {
    let Some(level) = parse_level(level) else {
        return ExitCode::FAILURE;
    };
    let policy = config.resolve(logger);
    if policy.is_enabled(Some(level)) {
        println!("enabled");
    } else {
        println!("disabled");
    }
    ExitCode::SUCCESS
}
