//! Favorites store for spacesnap.
//!
//! Holds the user's favorite records in memory, keyed by date, and writes
//! the whole mapping back to a JSON file after every mutation. The store is
//! single-writer: one process owns the file for the lifetime of a session.

mod file;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::record::FavoriteRecord;

pub use file::FAVORITES_VERSION;

/// Date-keyed favorites backed by a JSON file.
///
/// Every key equals the `date` of the record stored under it. Iteration is
/// in ascending date order.
#[derive(Debug)]
pub struct FavoritesStore {
    /// Path to the favorites file.
    path: PathBuf,
    /// All favorites by date.
    favorites: BTreeMap<String, FavoriteRecord>,
    /// The file on disk could not be parsed and must be moved aside before
    /// it is replaced.
    quarantine_pending: bool,
}

impl FavoritesStore {
    /// Read the favorites mapping stored at `path`.
    ///
    /// A missing or blank file yields an empty mapping.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the file exists but cannot be read or
    /// parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<BTreeMap<String, FavoriteRecord>> {
        let path = path.as_ref();
        let favorites = file::read(path)?.unwrap_or_default();
        debug!("Loaded {} favorites from {}", favorites.len(), path.display());
        Ok(favorites)
    }

    /// Open the store at `path`, failing if the file is corrupt.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the file exists but cannot be read or
    /// parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let favorites = Self::load(&path)?;
        Ok(Self {
            path,
            favorites,
            quarantine_pending: false,
        })
    }

    /// Open the store at `path`, starting empty if the file is unusable.
    ///
    /// The load error, if any, is handed back for the caller to report. The
    /// unreadable file is left untouched until the next [`save`], which first
    /// moves it aside to `<file>.corrupt-<timestamp>`.
    ///
    /// [`save`]: Self::save
    #[must_use]
    pub fn open_or_empty(path: impl AsRef<Path>) -> (Self, Option<Error>) {
        let path = path.as_ref().to_path_buf();
        match Self::load(&path) {
            Ok(favorites) => (
                Self {
                    path,
                    favorites,
                    quarantine_pending: false,
                },
                None,
            ),
            Err(err) => {
                warn!("Starting with no favorites: {err}");
                let quarantine_pending = matches!(
                    err,
                    Error::FavoritesParse { .. } | Error::FavoritesVersion { .. }
                );
                (
                    Self {
                        path,
                        favorites: BTreeMap::new(),
                        quarantine_pending,
                    },
                    Some(err),
                )
            }
        }
    }

    /// Get the path to the favorites file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add a favorite, replacing any entry for the same date, then save.
    ///
    /// The record stays in memory even if saving fails.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the file cannot be written.
    pub fn add(&mut self, record: FavoriteRecord) -> Result<()> {
        debug!("Adding favorite {}", record.date);
        self.favorites.insert(record.date.clone(), record);
        self.save()
    }

    /// Remove the favorite for `date`, then save.
    ///
    /// Removing an absent date changes nothing and writes nothing.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the file cannot be written. The entry
    /// is gone from memory regardless.
    pub fn remove(&mut self, date: &str) -> Result<Option<FavoriteRecord>> {
        let Some(removed) = self.favorites.remove(date) else {
            debug!("No favorite for {date}; nothing to remove");
            return Ok(None);
        };

        debug!("Removed favorite {date}");
        self.save()?;
        Ok(Some(removed))
    }

    /// Write the full mapping to the favorites file.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the file cannot be written.
    pub fn save(&mut self) -> Result<()> {
        if self.quarantine_pending {
            self.quarantine()?;
        }

        let content = file::encode(&self.favorites)?;
        file::write_atomic(&self.path, &content)?;
        info!(
            "Saved {} favorites to {}",
            self.favorites.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Move an unparseable favorites file out of the way.
    fn quarantine(&mut self) -> Result<()> {
        let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(format!(".corrupt-{stamp}"));
        let target = self.path.with_file_name(name);

        if self.path.exists() {
            std::fs::rename(&self.path, &target).map_err(|source| Error::FavoritesWrite {
                path: self.path.clone(),
                source,
            })?;
            warn!(
                "Moved unreadable favorites file to {}",
                target.display()
            );
        }

        self.quarantine_pending = false;
        Ok(())
    }

    /// Get the favorite for `date`.
    #[must_use]
    pub fn get(&self, date: &str) -> Option<&FavoriteRecord> {
        self.favorites.get(date)
    }

    /// Check if `date` is a favorite.
    #[must_use]
    pub fn contains(&self, date: &str) -> bool {
        self.favorites.contains_key(date)
    }

    /// Number of favorites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    /// Whether there are no favorites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    /// Iterate favorites in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = &FavoriteRecord> {
        self.favorites.values()
    }

    /// The underlying mapping.
    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<String, FavoriteRecord> {
        &self.favorites
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn record(date: &str) -> FavoriteRecord {
        FavoriteRecord::new(date, "T", "http://x/img.jpg", "E")
    }

    fn store_in(dir: &TempDir) -> FavoritesStore {
        FavoritesStore::open(dir.path().join("favorites.json")).unwrap()
    }

    fn quarantined(dir: &TempDir) -> Vec<String> {
        fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("favorites.json.corrupt-"))
            .collect()
    }

    /// Write `content` as the favorites file, fall back, add one record and
    /// check the original bytes were moved aside.
    fn assert_fallback_preserves(content: &[u8]) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("favorites.json");
        fs::write(&path, content).unwrap();

        let (mut store, err) = FavoritesStore::open_or_empty(&path);
        assert!(store.is_empty());
        assert!(err.unwrap().is_persistence_error());

        store.add(record("2024-01-01")).unwrap();

        let moved = quarantined(&dir);
        assert_eq!(moved.len(), 1);
        assert_eq!(fs::read(dir.path().join(&moved[0])).unwrap(), content);
        assert_eq!(FavoritesStore::load(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let favorites = FavoritesStore::load(dir.path().join("absent.json")).unwrap();
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_add_to_empty_store() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.add(record("2024-01-01")).unwrap();

        let expected = BTreeMap::from([("2024-01-01".to_string(), record("2024-01-01"))]);
        assert_eq!(store.as_map(), &expected);
        assert_eq!(FavoritesStore::load(store.path()).unwrap(), expected);
    }

    #[test]
    fn test_add_twice_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.add(record("2024-01-01")).unwrap();
        store.add(record("2024-01-01")).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("2024-01-01"), Some(&record("2024-01-01")));
    }

    #[test]
    fn test_add_overwrites_same_date() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.add(record("2024-01-01")).unwrap();
        let mut updated = record("2024-01-01");
        updated.title = "Retitled".to_string();
        store.add(updated).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("2024-01-01").unwrap().title, "Retitled");
    }

    #[test]
    fn test_remove_after_add() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.add(record("2024-01-01")).unwrap();
        let removed = store.remove("2024-01-01").unwrap();

        assert_eq!(removed, Some(record("2024-01-01")));
        assert!(!store.contains("2024-01-01"));
        assert!(FavoritesStore::load(store.path()).unwrap().is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add(record("2024-01-01")).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        let removed = store.remove("2024-01-02").unwrap();

        assert!(removed.is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn test_remove_absent_does_not_create_file() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.remove("2024-01-02").unwrap();

        assert!(!store.path().exists());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add(record("2023-12-25")).unwrap();
        store.add(record("2024-01-01")).unwrap();
        store.add(record("1995-06-16")).unwrap();

        let reopened = FavoritesStore::open(store.path()).unwrap();
        assert_eq!(reopened.as_map(), store.as_map());
    }

    #[test]
    fn test_keys_match_record_dates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("favorites.json");
        fs::write(
            &path,
            r#"{"2001-02-03": {"title": "A", "url": "u", "explanation": "e"},
                "2004-05-06": {"title": "B", "url": "u", "explanation": "e"}}"#,
        )
        .unwrap();

        let store = FavoritesStore::open(&path).unwrap();
        for (key, value) in store.as_map() {
            assert_eq!(key, &value.date);
        }
    }

    #[test]
    fn test_iter_is_date_ordered() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add(record("2024-01-01")).unwrap();
        store.add(record("1999-09-09")).unwrap();
        store.add(record("2010-10-10")).unwrap();

        let dates: Vec<_> = store.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["1999-09-09", "2010-10-10", "2024-01-01"]);
    }

    #[test]
    fn test_legacy_file_is_rewritten_versioned() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("favorites.json");
        fs::write(
            &path,
            r#"{"2024-01-01": {"title": "T", "url": "http://x/img.jpg", "explanation": "E"}}"#,
        )
        .unwrap();

        let mut store = FavoritesStore::open(&path).unwrap();
        assert_eq!(store.get("2024-01-01"), Some(&record("2024-01-01")));

        store.add(record("2024-01-02")).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["version"], FAVORITES_VERSION);
        assert_eq!(value["favorites"].as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_open_malformed_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("favorites.json");
        fs::write(&path, "{ this is not json").unwrap();

        let err = FavoritesStore::open(&path).unwrap_err();
        assert!(err.is_persistence_error());
    }

    #[test]
    fn test_open_or_empty_falls_back_without_touching_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("favorites.json");
        fs::write(&path, "{ this is not json").unwrap();

        let (store, err) = FavoritesStore::open_or_empty(&path);

        assert!(store.is_empty());
        assert!(err.unwrap().is_persistence_error());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ this is not json");
    }

    #[test]
    fn test_save_after_fallback_moves_corrupt_file_aside() {
        assert_fallback_preserves(b"{ this is not json");
    }

    #[test]
    fn test_fallback_preserves_invalid_utf8_file() {
        assert_fallback_preserves(b"{\"2024-01-01\": \xff\xfe garbage");
    }

    #[test]
    fn test_fallback_preserves_future_version_file() {
        assert_fallback_preserves(br#"{"version": 2, "favorites": {}}"#);
    }

    #[test]
    fn test_fallback_preserves_bad_versioned_entry() {
        assert_fallback_preserves(br#"{"version": 1, "favorites": {"2024-01-01": {"title": 5}}}"#);
    }

    #[test]
    fn test_open_or_empty_healthy_file() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add(record("2024-01-01")).unwrap();

        let (reopened, err) = FavoritesStore::open_or_empty(store.path());
        assert!(err.is_none());
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn test_save_failure_keeps_memory_authoritative() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes the final rename fail.
        let path = dir.path().join("favorites.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), "x").unwrap();

        let mut store = FavoritesStore {
            path: path.clone(),
            favorites: BTreeMap::new(),
            quarantine_pending: false,
        };
        let err = store.add(record("2024-01-01")).unwrap_err();

        assert!(err.is_persistence_error());
        assert!(store.contains("2024-01-01"));
    }

    #[test]
    fn test_unusable_parent_directory_is_persistence_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("blocker"), "x").unwrap();
        let path = dir.path().join("blocker").join("sub").join("favorites.json");

        let mut store = FavoritesStore::open(&path).unwrap();
        let err = store.add(record("2024-01-01")).unwrap_err();

        assert!(matches!(err, Error::FavoritesWrite { .. }));
        assert!(err.is_persistence_error());
        assert!(store.contains("2024-01-01"));
    }
}
