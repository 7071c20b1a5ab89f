//! `dispatcher-sim`: drives the dispatch core either as a fixture-fed
//! simulation run or as the HTTP/WebSocket adapter server (§4.10).

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dispatch_cli::cli::{Args, Command};
use dispatch_cli::config::RuntimeConfig;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config = match RuntimeConfig::load(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_filter.clone()))
        .init();

    match args.command {
        Command::Run => match dispatch_cli::run_fixture_to_summary(&config) {
            Ok((steps, monitor)) => {
                println!("--- dispatcher-sim run ({steps} steps) ---");
                println!("{}", monitor.summary());
            }
            Err(err) => {
                eprintln!("{err}");
                std::process::exit(1);
            }
        },
        Command::Serve => dispatch_cli::serve(&config).await,
    }
}
