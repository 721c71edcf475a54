//! Command-line interface for the smoke binary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Polls the local host through the shell gateway and prints snapshots as
/// JSON; the full engine pipeline without a remote transport.
#[derive(Parser, Debug)]
#[command(name = "hostwatch-metrics", version, about)]
pub struct Args {
    /// Poll interval in seconds
    #[arg(long, default_value_t = 5)]
    pub interval: u64,

    /// Collect one tick and exit
    #[arg(long)]
    pub once: bool,

    /// Detail section to collect alongside the basic tier
    /// (cpu, health, space, io, network, process)
    #[arg(long)]
    pub section: Option<String>,

    /// Collect every detail section alongside the basic tier
    #[arg(long, conflicts_with = "section")]
    pub all_details: bool,

    /// Path to a TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log verbosity
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,
}
