// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::{default_config_path, parse_duration};

/// Command-line arguments for `reswatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "reswatch",
    version,
    about = "Watch files and URLs and report when they change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Ignored when locations are given on the command line.
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Paths or HTTP(S) URLs to watch instead of the configured resources.
    #[arg(value_name = "LOCATION")]
    pub locations: Vec<String>,

    /// Poll interval for every resource (e.g. "30s", "5m").
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub poll_interval: Option<Duration>,

    /// Extra existence checks made at startup before giving up on a resource.
    #[arg(long, value_name = "N")]
    pub retry_attempts: Option<u32>,

    /// Probe every resource once, print its state, and exit.
    #[arg(long)]
    pub once: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RESWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the watch plan, but don't touch any resource.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
