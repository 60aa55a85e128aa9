//! CardMap
//!
//! Card-and-connector diagrams from the command line.
//!
//! This is the main entry point; it sets up logging and hands the parsed
//! command line to `cardmap_cli`.

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cardmap_cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    debug!(version = cardmap_cli::VERSION, command = ?cli.command, "Starting cardmap");
    cardmap_cli::run(cli)
}
