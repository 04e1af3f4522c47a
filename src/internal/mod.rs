//! fluentgate's own diagnostic logger. Config problems, transport failures and
//! recovered conflicts are reported here on stderr, never through the collector
//! they concern.
//!
//! Uses `OnceLock` so the logger is initialized exactly once, even if
//! multiple entry points (CLI, library setup, tests) race to call `init`.

use crate::config::Config;
use crate::level::Level;
use chrono::Local;
use std::io::Write;
use std::sync::OnceLock;

static INTERNAL_LOGGER: OnceLock<InternalLogger> = OnceLock::new();

#[derive(Debug)]
struct InternalLogger {
    min_level: Level,
}

impl InternalLogger {
    fn log(&self, level: Level, scope: &str, msg: &str) {
        if level < self.min_level {
            return;
        }
        let ts = Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("{ts} [{:<7}] {scope:<10}  {msg}\n", level.as_str());
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
    }
}

/// Initializes with the default level (warnings and up). Later calls are no-ops.
pub fn init() {
    init_with_level(Level::Warning);
}

/// Uses `general.diagnostics` from an already-loaded config.
pub fn init_with_config(config: &Config) {
    init_with_level(config.parse_diagnostics_level());
}

pub fn init_with_level(min_level: Level) {
    let was_init = INTERNAL_LOGGER.get().is_some();
    INTERNAL_LOGGER.get_or_init(|| InternalLogger { min_level });
    if !was_init {
        debug("INTERNAL", &format!("Diagnostics at {min_level} and above"));
    }
}

/// Pre-init calls silently vanish rather than crashing.
fn log(level: Level, scope: &str, msg: &str) {
    if let Some(logger) = INTERNAL_LOGGER.get() {
        logger.log(level, scope, msg);
    }
}

pub fn debug(scope: &str, msg: &str) {
    log(Level::Fine, scope, msg);
}

pub fn info(scope: &str, msg: &str) {
    log(Level::Info, scope, msg);
}

/// Recovered problems: conflicts, malformed values, failed sends.
pub fn warn(scope: &str, msg: &str) {
    log(Level::Warning, scope, msg);
}

pub fn error(scope: &str, msg: &str) {
    log(Level::Severe, scope, msg);
}
