//! Error types for spacesnap.
//!
//! Every failure in spacesnap falls into one of two user-facing kinds:
//! reaching the image provider ([`Error::is_fetch_error`]) or reading and
//! writing the favorites file ([`Error::is_persistence_error`]). The
//! remaining variants cover configuration and argument problems.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for spacesnap operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Fetch Errors ===
    /// The request to the image provider failed (network, TLS, decoding).
    #[error("failed to fetch from image provider: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The image provider answered with a non-success status.
    #[error("image provider returned HTTP {status}: {message}")]
    FetchStatus {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body, or the status reason.
        message: String,
    },

    /// The record is not an image and cannot be downloaded as one.
    #[error("record for {date} is a {media_type}, not an image")]
    UnsupportedMedia {
        /// Date of the record.
        date: String,
        /// Media type reported by the provider.
        media_type: String,
    },

    // === Persistence Errors ===
    /// The favorites file exists but could not be read.
    #[error("failed to read favorites from {path}: {source}")]
    FavoritesRead {
        /// Path to the favorites file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The favorites file exists but is not valid favorites JSON.
    #[error("favorites file {path} is malformed: {source}")]
    FavoritesParse {
        /// Path to the favorites file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The favorites file could not be written.
    #[error("failed to write favorites to {path}: {source}")]
    FavoritesWrite {
        /// Path to the favorites file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The favorites file was written by a newer version of spacesnap.
    #[error("favorites file {path} has version {found}, newest supported is {supported}")]
    FavoritesVersion {
        /// Path to the favorites file.
        path: PathBuf,
        /// Version found in the file.
        found: u32,
        /// Newest version this build understands.
        supported: u32,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// No API key is configured.
    #[error("no API key configured; set NASA_API_KEY or api.key in {config_hint}")]
    MissingApiKey {
        /// Where the user can put the key.
        config_hint: String,
    },

    // === Input Errors ===
    /// A date argument could not be used.
    #[error("invalid date '{input}': {reason}")]
    InvalidDate {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An action needs a picture on screen and none is.
    #[error("no picture is selected; view one first")]
    NothingSelected,

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for spacesnap operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid date error.
    #[must_use]
    pub fn invalid_date(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDate {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a non-success status error.
    #[must_use]
    pub fn fetch_status(status: u16, message: impl Into<String>) -> Self {
        Self::FetchStatus {
            status,
            message: message.into(),
        }
    }

    /// Check if this error came from talking to the image provider.
    #[must_use]
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Self::Fetch(_) | Self::FetchStatus { .. } | Self::UnsupportedMedia { .. }
        )
    }

    /// Check if this error came from the favorites file.
    #[must_use]
    pub fn is_persistence_error(&self) -> bool {
        matches!(
            self,
            Self::FavoritesRead { .. }
                | Self::FavoritesParse { .. }
                | Self::FavoritesWrite { .. }
                | Self::FavoritesVersion { .. }
        )
    }
}
