//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Arguments shared by the commands that display one picture.
#[derive(Debug, Args)]
pub struct ViewCommand {
    /// Output the record as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Date to show (YYYY-MM-DD, or "today")
    pub date: String,

    /// Output the record as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Download command arguments.
#[derive(Debug, Args)]
pub struct DownloadCommand {
    /// Date of the picture (YYYY-MM-DD, or "today")
    #[arg(default_value = "today")]
    pub date: String,

    /// Directory to save into (defaults to download.directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

/// Favorites commands.
#[derive(Debug, Subcommand)]
pub enum FavoritesCommand {
    /// List favorite pictures
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Fetch a picture and add it to favorites
    Add {
        /// Date of the picture (YYYY-MM-DD, or "today")
        date: String,
    },

    /// Remove a picture from favorites
    Remove {
        /// Date of the favorite (YYYY-MM-DD)
        date: String,
    },

    /// Show the favorites file path
    Path,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration (API key masked)
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        file: Option<PathBuf>,
    },
}
