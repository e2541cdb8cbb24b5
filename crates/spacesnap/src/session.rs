//! Viewing session.
//!
//! A [`Session`] owns everything one run of spacesnap works with: the
//! image provider, the favorites store, and the record currently on screen.
//! Presentation code borrows the session; nothing is kept in globals.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rand::Rng;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::explore;
use crate::favorites::FavoritesStore;
use crate::provider::ImageProvider;
use crate::record::{FavoriteRecord, ImageRecord};

/// Which day to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateChoice {
    /// Today's picture.
    Today,
    /// The picture for a specific day.
    On(NaiveDate),
    /// A day picked at random from the archive.
    Random,
}

/// What a favorite toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// The record was added.
    Added,
    /// The record was removed.
    Removed,
}

/// Owned state for one viewing session.
#[derive(Debug)]
pub struct Session<P> {
    provider: P,
    favorites: FavoritesStore,
    current: Option<ImageRecord>,
    today: NaiveDate,
}

impl<P: ImageProvider> Session<P> {
    /// Start a session over `provider` and `favorites`.
    #[must_use]
    pub fn new(provider: P, favorites: FavoritesStore) -> Self {
        Self::with_today(provider, favorites, explore::today())
    }

    /// Start a session with a fixed notion of "today".
    #[must_use]
    pub fn with_today(provider: P, favorites: FavoritesStore, today: NaiveDate) -> Self {
        Self {
            provider,
            favorites,
            current: None,
            today,
        }
    }

    /// The date the session treats as today.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Parse a user-supplied date against this session's today.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDate`] for malformed or out-of-range input.
    pub fn parse_date(&self, input: &str) -> Result<NaiveDate> {
        explore::parse_date(input, self.today)
    }

    /// Turn `today` or a `YYYY-MM-DD` date into a [`DateChoice`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDate`] for malformed or out-of-range input.
    pub fn choice_for(&self, input: &str) -> Result<DateChoice> {
        if input.trim().eq_ignore_ascii_case("today") {
            return Ok(DateChoice::Today);
        }
        self.parse_date(input).map(DateChoice::On)
    }

    /// Fetch and select the picture for `choice`.
    ///
    /// A specific date equal to today is fetched as today's picture. On
    /// failure nothing is selected.
    ///
    /// # Errors
    ///
    /// Returns a fetch error if the provider fails.
    pub fn view(&mut self, choice: DateChoice) -> Result<&ImageRecord> {
        self.view_with(choice, &mut rand::thread_rng())
    }

    /// [`view`](Self::view) with an explicit random source.
    ///
    /// # Errors
    ///
    /// Returns a fetch error if the provider fails.
    pub fn view_with<R: Rng + ?Sized>(
        &mut self,
        choice: DateChoice,
        rng: &mut R,
    ) -> Result<&ImageRecord> {
        self.current = None;

        let date = match choice {
            DateChoice::Today => None,
            DateChoice::On(date) if date == self.today => None,
            DateChoice::On(date) => Some(date),
            DateChoice::Random => Some(explore::random_date(rng, self.today)),
        };

        let record = match date {
            None => self.provider.fetch_today()?,
            Some(date) => {
                debug!("Viewing {}", explore::format_date(date));
                self.provider.fetch_for_date(date)?
            }
        };

        let record = self.current.insert(record);
        Ok(&*record)
    }

    /// The record currently selected, if any.
    #[must_use]
    pub fn current(&self) -> Option<&ImageRecord> {
        self.current.as_ref()
    }

    /// The favorites store.
    #[must_use]
    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    /// Whether `date` is a favorite.
    #[must_use]
    pub fn is_favorite(&self, date: &str) -> bool {
        self.favorites.contains(date)
    }

    /// Add `record` to favorites.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if saving fails; the favorite is kept in
    /// memory for the rest of the session.
    pub fn add_favorite(&mut self, record: &ImageRecord) -> Result<()> {
        self.favorites
            .add(FavoriteRecord::from(record))
            .inspect_err(|err| warn!("Favorite kept in memory only: {err}"))
    }

    /// Remove the favorite for `date`, returning whether one existed.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if saving fails.
    pub fn remove_favorite(&mut self, date: &str) -> Result<bool> {
        Ok(self.favorites.remove(date)?.is_some())
    }

    /// Add the current record to favorites, or remove it if already there.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingSelected`] if no record is selected, or a
    /// persistence error if saving fails.
    pub fn toggle_current(&mut self) -> Result<Toggle> {
        let record = self.current.clone().ok_or(Error::NothingSelected)?;
        if self.favorites.contains(&record.date) {
            self.remove_favorite(&record.date)?;
            Ok(Toggle::Removed)
        } else {
            self.add_favorite(&record)?;
            Ok(Toggle::Added)
        }
    }

    /// Download the current record into `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is selected or the download fails.
    pub fn download_current(&self, dir: &Path) -> Result<PathBuf> {
        let record = self.current.as_ref().ok_or(Error::NothingSelected)?;
        self.provider.download_image(record, dir)
    }
}
