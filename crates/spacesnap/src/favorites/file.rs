//! On-disk layout of the favorites file.
//!
//! Current layout (version 1):
//!
//! ```json
//! {
//!   "version": 1,
//!   "favorites": {
//!     "2024-01-01": { "title": "...", "url": "...", "explanation": "..." }
//!   }
//! }
//! ```
//!
//! Files written before the version tag existed hold only the inner
//! `favorites` map. Both are accepted on read; only the versioned form is
//! written.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::record::FavoriteRecord;

/// Current favorites file version.
pub const FAVORITES_VERSION: u32 = 1;

/// One entry as stored; the date lives in the map key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredEntry {
    title: String,
    url: String,
    explanation: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct VersionedFile {
    version: u32,
    favorites: BTreeMap<String, StoredEntry>,
}

/// Read and decode the favorites file.
///
/// Returns `None` when the file is missing or blank.
pub(crate) fn read(path: &Path) -> Result<Option<BTreeMap<String, FavoriteRecord>>> {
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(Error::FavoritesRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if content.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    decode(&content, path).map(Some)
}

/// Decode file bytes in either layout.
///
/// A top-level `version` key selects the versioned layout; anything else is
/// read as a legacy map. Invalid UTF-8 is a parse error like any other.
fn decode(content: &[u8], path: &Path) -> Result<BTreeMap<String, FavoriteRecord>> {
    let parse_err = |source| Error::FavoritesParse {
        path: path.to_path_buf(),
        source,
    };

    let value: serde_json::Value = serde_json::from_slice(content).map_err(parse_err)?;

    let declared = value.get("version").map(serde_json::Value::as_u64);
    let entries: BTreeMap<String, StoredEntry> = match declared {
        Some(version) => {
            if let Some(found) = version.filter(|v| *v > u64::from(FAVORITES_VERSION)) {
                return Err(Error::FavoritesVersion {
                    path: path.to_path_buf(),
                    found: u32::try_from(found).unwrap_or(u32::MAX),
                    supported: FAVORITES_VERSION,
                });
            }
            let file: VersionedFile = serde_json::from_value(value).map_err(parse_err)?;
            file.favorites
        }
        None => {
            debug!("Reading unversioned favorites file {}", path.display());
            serde_json::from_value(value).map_err(parse_err)?
        }
    };

    Ok(entries
        .into_iter()
        .map(|(date, entry)| {
            let record = FavoriteRecord {
                date: date.clone(),
                title: entry.title,
                url: entry.url,
                explanation: entry.explanation,
            };
            (date, record)
        })
        .collect())
}

/// Encode the favorites map in the current layout.
pub(crate) fn encode(favorites: &BTreeMap<String, FavoriteRecord>) -> Result<String> {
    let file = VersionedFile {
        version: FAVORITES_VERSION,
        favorites: favorites
            .iter()
            .map(|(date, record)| {
                let entry = StoredEntry {
                    title: record.title.clone(),
                    url: record.url.clone(),
                    explanation: record.explanation.clone(),
                };
                (date.clone(), entry)
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Replace `path` with `content`.
///
/// The content goes to a temporary file in the same directory first and is
/// renamed over the target, so a failed write leaves the old file intact.
pub(crate) fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let write_err = |source| Error::FavoritesWrite {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    if !parent.exists() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    temp.write_all(content.as_bytes()).map_err(write_err)?;
    temp.write_all(b"\n").map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;
    temp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
