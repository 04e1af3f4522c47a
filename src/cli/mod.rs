//! CLI module for fluentgate.
//!
//! This module provides the command-line interface using Clap.

pub mod commands;
pub mod util;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Metadata flags shared by commands that build an event.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct EventArgs {
    /// Single-valued field, `key=value` (repeat the flag for more fields)
    #[arg(long = "field", value_name = "KEY=VALUE")]
    pub fields: Vec<String>,
    /// Repeatable field, `key=value`; every occurrence is kept
    #[arg(long = "repeat", value_name = "KEY=VALUE")]
    pub repeated: Vec<String>,
    /// Tag, either a flag `name` or a valued `name=value`
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,
    /// Label the tags are collected under
    #[arg(long, default_value = "tags")]
    pub tag_label: String,
}

/// fluentgate - gate, encode and ship structured log records to Fluentd.
#[derive(Parser)]
#[command(
    name = "fluentgate",
    version,
    about = "Gate, encode and ship structured log records to Fluentd"
)]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Send one record through the logger's backend.
    Emit {
        /// Logger name
        logger: String,
        /// Log level
        level: String,
        /// Log message
        message: Vec<String>,
        #[command(flatten)]
        event: EventArgs,
    },
    /// Print whether a level is enabled for a logger.
    Check {
        /// Logger name
        logger: String,
        /// Log level
        level: String,
    },
    /// Print the record an event would encode to, without sending it.
    Encode {
        /// Log level
        level: String,
        /// Log message
        message: Vec<String>,
        #[command(flatten)]
        event: EventArgs,
    },
}

pub use commands::{cmd_check, cmd_emit, cmd_encode};
pub use util::{build_event, load_config, parse_level};
