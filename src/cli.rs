// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::Overrides;
use crate::duration::parse_duration;

/// Command-line arguments for `tugbot`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tugbot",
    version,
    about = "Launch fresh clones of exited test containers on engine events or on a timer.",
    long_about = None
)]
pub struct CliArgs {
    /// Only manage containers with these names. Default: all candidates.
    #[arg(value_name = "NAMES")]
    pub names: Vec<String>,

    /// Optional config file (TOML).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Engine API address (unix://, tcp:// or http://).
    ///
    /// Overrides `DOCKER_HOST` and `[engine].host`.
    #[arg(short = 'H', long, value_name = "HOST")]
    pub host: Option<String>,

    /// How often to re-list candidates for recurring launches, e.g. `18s`.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub tick: Option<Duration>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `--debug`, `TUGBOT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Shorthand for `--log-level debug`.
    #[arg(short, long)]
    pub debug: bool,

    /// List containers and what tugbot would do with them, then exit.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Explicit log level: `--log-level` wins over `--debug`.
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        self.log_level
            .or(self.debug.then_some(LogLevel::Debug))
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            tick_interval: self.tick,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
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
