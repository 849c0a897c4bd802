//! Blink CLI - collect text, links, images and files into boards
//!
//! Every command opens the local record database, performs one board or
//! media operation, and prints the affected ids.

mod cli;
mod commands;
mod error;
#[cfg(test)]
mod tests;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::board::run_board;
use crate::commands::common::resolve_db_path;
use crate::commands::completions::run_completions;
use crate::commands::media::run_media;
use crate::commands::snippets::run_snippets;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "blink=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db_path = resolve_db_path(cli.db_path);

    match cli.command {
        Commands::Board { command } => run_board(command, &db_path).await?,
        Commands::Media { command } => run_media(command, &db_path).await?,
        Commands::Snippets { board } => run_snippets(&board, &db_path).await?,
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref())?,
    }

    Ok(())
}
