//! Command-line interface for spacesnap.
//!
//! This module provides the CLI structure for the `spacesnap` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, DownloadCommand, FavoritesCommand, ShowCommand, ViewCommand};

/// spacesnap - Your window to the cosmos
///
/// Browse NASA's Astronomy Picture of the Day from the terminal and keep
/// the ones you love as favorites.
#[derive(Debug, Parser)]
#[command(name = "spacesnap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show today's picture
    Today(ViewCommand),

    /// Show the picture for a date
    Show(ShowCommand),

    /// Show the picture for a random day
    Random(ViewCommand),

    /// Manage favorite pictures
    #[command(subcommand)]
    Favorites(FavoritesCommand),

    /// Save a picture to disk
    Download(DownloadCommand),

    /// Print a random space fact
    Fact,

    /// Browse interactively
    Browse,

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
