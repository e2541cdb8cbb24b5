//! Date handling and the "did you know?" facts.

use chrono::{Local, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Error, Result};

/// Format of dates exchanged with the provider and used as favorite keys.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Short facts shown alongside pictures.
pub const SPACE_FACTS: &[&str] = &[
    "One day on Venus is longer than one year on Venus.",
    "The footprints on the Moon will last for 100 million years.",
    "The Sun makes up 99.86% of our solar system's mass.",
    "A year on Mercury is just 88 Earth days long.",
    "Jupiter's Great Red Spot is shrinking.",
    "Saturn's rings are mostly made of ice and rock.",
    "You can fit all the planets in the solar system between Earth and the Moon.",
    "There are more stars in the universe than grains of sand on Earth.",
];

/// The first day in the picture archive.
#[must_use]
pub fn archive_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(1995, 6, 16).unwrap_or(NaiveDate::MIN)
}

/// Today's date in local time.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Format a date the way the provider expects.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` date that the archive can serve.
///
/// # Errors
///
/// Returns [`Error::InvalidDate`] if the input is malformed or falls outside
/// the archive range ending at `today`.
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let trimmed = input.trim();
    let date = NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| Error::invalid_date(input, "expected YYYY-MM-DD"))?;

    // chrono accepts unpadded fields; keys must stay canonical.
    if format_date(date) != trimmed {
        return Err(Error::invalid_date(input, "expected YYYY-MM-DD"));
    }

    let start = archive_start();
    if date < start {
        return Err(Error::invalid_date(
            input,
            format!("the archive starts on {}", format_date(start)),
        ));
    }
    if date > today {
        return Err(Error::invalid_date(input, "date is in the future"));
    }
    Ok(date)
}

/// Pick a day uniformly between the archive start and `today`, inclusive.
pub fn random_date<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> NaiveDate {
    let start = archive_start();
    let span = (today - start).num_days().max(0);
    let offset = rng.gen_range(0..=span);
    start + chrono::Duration::days(offset)
}

/// Pick one of [`SPACE_FACTS`].
pub fn random_fact<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    SPACE_FACTS.choose(rng).copied().unwrap_or_default()
}
