//! Command-line parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "courier")]
#[command(about = "Inspect the proposition cache and exercise the asset resolver")]
#[command(after_help = "The config file may also be given with COURIER_CONFIG.")]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List cached surfaces and proposition counts
    Inspect,
    /// Replace the cache with a surface -> propositions document
    Import {
        #[arg(value_name = "FILE.json")]
        file: PathBuf,
    },
    /// Remove every cached proposition
    Clear,
    /// Print the content cards cached for a surface
    Cards {
        /// Path below the application; empty selects the base surface
        #[arg(default_value = "")]
        surface_path: String,
    },
    /// Download and decode a remote image
    FetchImage { url: String },
    /// Resolve a drawable to its resource id (0 when missing)
    Icon { name: String },
    /// Resolve the application icon (-1 when unavailable)
    AppIcon,
    /// Print the locator of a raw sound resource
    Sound { name: String },
}
