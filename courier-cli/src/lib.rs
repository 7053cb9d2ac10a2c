//! COURIER CLI
//!
//! Inspect and maintain the proposition cache, and exercise the asset
//! resolver, from a terminal.

pub mod args;
pub mod commands;
pub mod config;
pub mod error;
pub mod telemetry;

use args::Cli;
use clap::Parser;
use error::CliError;

/// Parse `args` (program name excluded), load configuration and run the
/// selected command. Returns the text to print on stdout.
pub fn run<I>(args: I) -> Result<String, CliError>
where
    I: IntoIterator<Item = String>,
{
    let cli = Cli::try_parse_from(std::iter::once("courier".to_string()).chain(args))?;
    let config = config::load(cli.config.as_deref())?;
    tracing::debug!(app_id = %config.app_id, command = ?cli.command, "Running command");
    commands::execute(&config, &cli.command)
}
