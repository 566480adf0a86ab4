//! pagestack CLI — fetch CMS pages by URL and emit live-preview config.
//!
//! Resolves a stack from `CONTENTSTACK_*` environment variables (and the
//! optional `~/.pagestack/pagestack.toml`), then serves page lookups and the
//! live-preview bridge configuration from that single resolution.

mod commands;

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
