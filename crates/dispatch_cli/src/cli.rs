//! CLI surface for the `dispatcher-sim` binary (§4.10).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "dispatcher-sim", about = "Last-mile dispatch simulator and adapter server")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a TOML config file layered under environment and flag overrides.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Adapter bind address.
    #[arg(long, global = true)]
    pub bind: Option<String>,

    /// Adapter port.
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// tracing-subscriber EnvFilter directive, e.g. "debug" or "dispatch_core=trace".
    #[arg(long, global = true)]
    pub log_filter: Option<String>,

    /// Path to a JSON fixture of vehicles and a delivery arrival schedule.
    #[arg(long, global = true)]
    pub fixture: Option<PathBuf>,

    /// Depot longitude, paired with `--depot-lat`.
    #[arg(long, global = true)]
    pub depot_lng: Option<f64>,

    /// Depot latitude, paired with `--depot-lng`.
    #[arg(long, global = true)]
    pub depot_lat: Option<f64>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run a fixture-driven simulation to completion and print the monitor summary.
    Run,
    /// Boot the HTTP/WebSocket adapter server.
    Serve,
}
