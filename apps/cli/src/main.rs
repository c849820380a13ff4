//! postweave CLI: offline enrichment for JSON blog corpora.
//!
//! Adds word counts, related-post lists, and internal cross-links to every
//! post of a corpus document.

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
