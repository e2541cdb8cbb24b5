//! Core record types for spacesnap.
//!
//! [`ImageRecord`] is what the image provider returns for a date;
//! [`FavoriteRecord`] is the subset of it that the favorites store keeps.

use serde::{Deserialize, Serialize};

/// Media type the provider uses for plain images.
pub const MEDIA_TYPE_IMAGE: &str = "image";

/// One day's entry as returned by the image provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Calendar date in `YYYY-MM-DD` form.
    pub date: String,

    /// Title of the picture.
    pub title: String,

    /// Locator for the standard-resolution image (or video page).
    pub url: String,

    /// Descriptive text written for the picture.
    pub explanation: String,

    /// Credit line, absent for public-domain images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,

    /// `image` or `video`, when the provider reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    /// High-resolution image locator, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hdurl: Option<String>,
}

impl ImageRecord {
    /// Whether this record can be saved as an image file.
    ///
    /// Records without a media type are assumed to be images.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.media_type
            .as_deref()
            .map_or(true, |media| media == MEDIA_TYPE_IMAGE)
    }

    /// Credit line trimmed of the stray newlines the provider sometimes adds.
    #[must_use]
    pub fn credit(&self) -> Option<&str> {
        self.copyright
            .as_deref()
            .map(str::trim)
            .filter(|credit| !credit.is_empty())
    }
}

/// A record the user chose to keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteRecord {
    /// Calendar date in `YYYY-MM-DD` form; the store key.
    pub date: String,
    /// Title of the picture.
    pub title: String,
    /// Locator for the image.
    pub url: String,
    /// Descriptive text.
    pub explanation: String,
}

impl FavoriteRecord {
    /// Create a favorite from its parts.
    #[must_use]
    pub fn new(
        date: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            title: title.into(),
            url: url.into(),
            explanation: explanation.into(),
        }
    }
}

impl From<&ImageRecord> for FavoriteRecord {
    fn from(record: &ImageRecord) -> Self {
        Self {
            date: record.date.clone(),
            title: record.title.clone(),
            url: record.url.clone(),
            explanation: record.explanation.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_record(date: &str) -> ImageRecord {
    ImageRecord {
        date: date.to_string(),
        title: format!("Picture for {date}"),
        url: format!("https://apod.nasa.gov/apod/image/{date}.jpg"),
        explanation: "A galaxy far away.".to_string(),
        copyright: None,
        media_type: Some(MEDIA_TYPE_IMAGE.to_string()),
        hdurl: None,
    }
}
