//! `spacesnap` - CLI for browsing NASA's Astronomy Picture of the Day
//!
//! This binary wires configuration, the APOD client, and the favorites
//! store into one session per invocation.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::warn;

use spacesnap::cli::{Cli, Command, ConfigCommand, DownloadCommand, FavoritesCommand};
use spacesnap::session::DateChoice;
use spacesnap::{browse, display, explore};
use spacesnap::{init_logging, ApodClient, Config, FavoritesStore, Session};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Today(view) => handle_view(&config, None, view.json),
        Command::Show(show) => handle_view(&config, Some(show.date.as_str()), show.json),
        Command::Random(view) => handle_view(&config, Some("random"), view.json),
        Command::Favorites(favorites_cmd) => handle_favorites(&config, favorites_cmd),
        Command::Download(download_cmd) => handle_download(&config, &download_cmd),
        Command::Fact => {
            println!("Did you know? {}", explore::random_fact(&mut rand::thread_rng()));
            Ok(())
        }
        Command::Browse => handle_browse(&config),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

/// Open the favorites store, reporting and recovering from a corrupt file.
fn open_favorites(config: &Config) -> FavoritesStore {
    let (store, err) = FavoritesStore::open_or_empty(config.favorites_path());
    if let Some(err) = err {
        eprintln!("warning: {err}");
        eprintln!("warning: continuing with no favorites; the file is kept until you change them");
    }
    store
}

fn open_session(config: &Config) -> anyhow::Result<Session<ApodClient>> {
    let client = ApodClient::new(config)?;
    Ok(Session::new(client, open_favorites(config)))
}

fn choose(session: &Session<ApodClient>, date: Option<&str>) -> spacesnap::Result<DateChoice> {
    match date {
        None => Ok(DateChoice::Today),
        Some("random") => Ok(DateChoice::Random),
        Some(input) => session.choice_for(input),
    }
}

fn handle_view(config: &Config, date: Option<&str>, json: bool) -> anyhow::Result<()> {
    let mut session = open_session(config)?;
    let choice = choose(&session, date)?;
    let record = session.view(choice)?.clone();

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        let favorite = session.is_favorite(&record.date);
        display::render_record(&mut io::stdout().lock(), &record, favorite)?;
    }
    Ok(())
}

fn handle_favorites(config: &Config, cmd: FavoritesCommand) -> anyhow::Result<()> {
    match cmd {
        FavoritesCommand::List { json } => {
            let store = open_favorites(config);
            if json {
                let favorites: Vec<_> = store.iter().collect();
                println!("{}", serde_json::to_string_pretty(&favorites)?);
            } else {
                display::render_favorites(&mut io::stdout().lock(), &store)?;
            }
        }
        FavoritesCommand::Add { date } => {
            let mut session = open_session(config)?;
            let choice = choose(&session, Some(date.as_str()))?;
            let record = session.view(choice)?.clone();
            if session.is_favorite(&record.date) {
                println!("\"{}\" ({}) is already a favorite.", record.title, record.date);
            } else {
                session.add_favorite(&record)?;
                println!("Added \"{}\" ({}) to favorites!", record.title, record.date);
            }
        }
        FavoritesCommand::Remove { date } => {
            let mut store = open_favorites(config);
            if store.remove(date.trim())?.is_some() {
                println!("Removed {date} from favorites!");
            } else {
                println!("{date} is not a favorite.");
            }
        }
        FavoritesCommand::Path => {
            println!("{}", config.favorites_path().display());
        }
    }
    Ok(())
}

fn handle_download(config: &Config, cmd: &DownloadCommand) -> anyhow::Result<()> {
    let mut session = open_session(config)?;
    let choice = choose(&session, Some(cmd.date.as_str()))?;
    session.view(choice)?;

    let dir: PathBuf = cmd.output.clone().unwrap_or_else(|| config.download_dir());
    let path = session.download_current(&dir)?;
    println!("Saved {}", path.display());
    Ok(())
}

fn handle_browse(config: &Config) -> anyhow::Result<()> {
    let mut session = open_session(config)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    browse::run(&mut session, stdin.lock(), &mut stdout, &config.download_dir())?;
    stdout.flush()?;
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let shown = config.redacted();
            if json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[API]");
                println!("  Endpoint:        {}", shown.api.endpoint);
                println!(
                    "  Key:             {}",
                    shown.api.key.as_deref().unwrap_or("(not set)")
                );
                println!("  Timeout (secs):  {}", shown.api.timeout);
                println!();
                println!("[Favorites]");
                println!("  Path:            {}", config.favorites_path().display());
                println!();
                println!("[Download]");
                println!("  Directory:       {}", config.download_dir().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            let loaded = Config::load_from(Some(path.clone()))
                .with_context(|| format!("invalid configuration in {}", path.display()))?;
            if loaded.api.key.is_none() {
                warn!("No API key set; fetching pictures will fail");
            }
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
