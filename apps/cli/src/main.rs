//! Guidebook CLI — convert duome.eu guidebook pages to Markdown.
//!
//! Converts a single lesson page, or fetches a whole lesson range
//! concurrently and combines it into one document.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
