//! ## hatchery-cli
//! **Command-line frontend for the incubator-bank simulation**
//!
//! - `run`: realtime paced loop with readings logged
//! - `simulate`: headless deterministic run with an optional digest check
//! - `fuzz`: randomized scenarios checked for lost commands

use clap::Parser;

mod commands;

use commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    commands::run_command(cli).await
}
