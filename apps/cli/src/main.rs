//! Gateway Report CLI: daily DNS gateway activity digest by email.
//!
//! Queries resolver analytics for the trailing 24 hours, renders an HTML
//! summary, and mails it to a fixed recipient.

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
