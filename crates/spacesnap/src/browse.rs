//! Interactive browsing loop.
//!
//! Reads one command per line and acts on a [`Session`]. Failures are
//! printed and the loop carries on with whatever state is in memory.

use std::io::{self, BufRead, Write};
use std::path::Path;

use tracing::debug;

use crate::display;
use crate::explore;
use crate::provider::ImageProvider;
use crate::session::{DateChoice, Session, Toggle};

const PROMPT: &str = "spacesnap> ";

const HELP: &str = "\
Commands:
  today           show today's picture
  date <DATE>     show the picture for DATE (YYYY-MM-DD or today)
  random          show a picture from a random day
  fav             add the shown picture to favorites, or remove it
  list            list favorites
  remove <DATE>   remove a favorite
  download        save the shown picture to disk
  fact            show a space fact
  help            show this help
  quit            leave";

/// One parsed line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    /// Show today's picture.
    Today,
    /// Show the picture for a date (unvalidated input).
    Date(String),
    /// Show a random day.
    Random,
    /// Toggle the shown picture in favorites.
    Fav,
    /// List favorites.
    List,
    /// Remove a favorite by date.
    Remove(String),
    /// Save the shown picture.
    Download,
    /// Show a fact.
    Fact,
    /// Show help.
    Help,
    /// Leave the loop.
    Quit,
    /// Blank line.
    Nothing,
}

impl BrowseCommand {
    /// Parse a line of input.
    ///
    /// # Errors
    ///
    /// Returns a message describing the problem for unknown commands or
    /// missing arguments.
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Ok(Self::Nothing);
        };
        let argument = words.next().map(str::to_string);

        let command = match (word.to_ascii_lowercase().as_str(), argument) {
            ("today", _) => Self::Today,
            ("date" | "show", Some(date)) => Self::Date(date),
            ("date" | "show", None) => return Err(format!("usage: {word} <YYYY-MM-DD>")),
            ("random" | "lucky", _) => Self::Random,
            ("fav" | "favorite", _) => Self::Fav,
            ("list" | "favorites", _) => Self::List,
            ("remove" | "rm", Some(date)) => Self::Remove(date),
            ("remove" | "rm", None) => return Err(format!("usage: {word} <YYYY-MM-DD>")),
            ("download" | "save", _) => Self::Download,
            ("fact", _) => Self::Fact,
            ("help" | "?", _) => Self::Help,
            ("quit" | "exit" | "q", _) => Self::Quit,
            (other, _) => return Err(format!("unknown command '{other}'; type `help`")),
        };
        Ok(command)
    }
}

/// Run the loop until `quit` or end of input.
///
/// # Errors
///
/// Returns an error only if reading input or writing output fails.
pub fn run<P, R, W>(
    session: &mut Session<P>,
    input: R,
    out: &mut W,
    download_dir: &Path,
) -> io::Result<()>
where
    P: ImageProvider,
    R: BufRead,
    W: Write,
{
    let mut rng = rand::thread_rng();
    writeln!(out, "Did you know? {}", explore::random_fact(&mut rng))?;
    writeln!(out, "Type `help` for commands.")?;

    let mut lines = input.lines();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        let Some(line) = lines.next().transpose()? else {
            writeln!(out)?;
            break;
        };

        let command = match BrowseCommand::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(out, "{message}")?;
                continue;
            }
        };
        debug!("Browse command {command:?}");

        if command == BrowseCommand::Quit {
            break;
        }
        execute(session, &command, out, download_dir, &mut rng)?;
    }
    Ok(())
}

fn execute<P, W, G>(
    session: &mut Session<P>,
    command: &BrowseCommand,
    out: &mut W,
    download_dir: &Path,
    rng: &mut G,
) -> io::Result<()>
where
    P: ImageProvider,
    W: Write,
    G: rand::Rng,
{
    match command {
        BrowseCommand::Today => show(session, DateChoice::Today, out, rng),
        BrowseCommand::Random => show(session, DateChoice::Random, out, rng),
        BrowseCommand::Date(input) => match session.choice_for(input) {
            Ok(choice) => show(session, choice, out, rng),
            Err(err) => writeln!(out, "error: {err}"),
        },
        BrowseCommand::Fav => match session.toggle_current() {
            Ok(Toggle::Added) => writeln!(out, "Added to favorites!"),
            Ok(Toggle::Removed) => writeln!(out, "Removed from favorites!"),
            Err(err) if err.is_persistence_error() => {
                writeln!(out, "warning: {err} (change kept for this session)")
            }
            Err(err) => writeln!(out, "error: {err}"),
        },
        BrowseCommand::Remove(date) => match session.remove_favorite(date.trim()) {
            Ok(true) => writeln!(out, "Removed from favorites!"),
            Ok(false) => writeln!(out, "{date} is not a favorite."),
            Err(err) => writeln!(out, "warning: {err} (change kept for this session)"),
        },
        BrowseCommand::List => display::render_favorites(out, session.favorites()),
        BrowseCommand::Download => match session.download_current(download_dir) {
            Ok(path) => writeln!(out, "Saved {}", path.display()),
            Err(err) => writeln!(out, "error: {err}"),
        },
        BrowseCommand::Fact => writeln!(out, "Did you know? {}", explore::random_fact(rng)),
        BrowseCommand::Help => writeln!(out, "{HELP}"),
        BrowseCommand::Quit | BrowseCommand::Nothing => Ok(()),
    }
}

fn show<P, W, G>(
    session: &mut Session<P>,
    choice: DateChoice,
    out: &mut W,
    rng: &mut G,
) -> io::Result<()>
where
    P: ImageProvider,
    W: Write,
    G: rand::Rng,
{
    match session.view_with(choice, rng) {
        Ok(record) => {
            let record = record.clone();
            let favorite = session.is_favorite(&record.date);
            display::render_record(out, &record, favorite)
        }
        Err(err) => writeln!(out, "error: {err}"),
    }
}
