//! askglean CLI — batch question answering against a Glean instance.
//!
//! Reads questions from a CSV file, asks each one via the Glean chat API,
//! and writes the answers to a timestamped copy of the file.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
