//! `fluentgate` binary: one-shot emission, policy checks and dry-run encoding.
//!
//! Usage:
//!   fluentgate emit <logger> <level> <msg...> [--field k=v] [--repeat k=v] [--tag t]
//!   fluentgate check <logger> <level>
//!   fluentgate encode <level> <msg...> [--field k=v] [--repeat k=v] [--tag t]

use clap::Parser;
use fluentgate::cli::{Cli, Command, cmd_check, cmd_emit, cmd_encode, load_config};
use fluentgate::internal;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Policies, transport and diagnostics level all come from config
    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            return ExitCode::FAILURE;
        }
    };

    internal::init_with_config(&config);

    match &cli.command {
        Command::Emit {
            logger,
            level,
            message,
            event,
        } => cmd_emit(&config, logger, level, message, event),
        Command::Check { logger, level } => cmd_check(&config, logger, level),
        Command::Encode {
            level,
            message,
            event,
        } => cmd_encode(level, message, event),
    }
}
