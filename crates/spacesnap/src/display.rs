//! Plain-text rendering of pictures and favorites.

use std::io::{self, Write};

use crate::favorites::FavoritesStore;
use crate::record::ImageRecord;

/// Column width explanations are wrapped to.
const WRAP_WIDTH: usize = 76;

/// Write one picture with its metadata and explanation.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn render_record<W: Write>(
    out: &mut W,
    record: &ImageRecord,
    favorite: bool,
) -> io::Result<()> {
    let marker = if favorite { "★" } else { "☆" };
    writeln!(out, "{marker} {}", record.title)?;
    writeln!(out, "  Date:   {}", record.date)?;
    if let Some(credit) = record.credit() {
        writeln!(out, "  Credit: {credit}")?;
    }
    match record.media_type.as_deref() {
        Some(media) if !record.is_image() => writeln!(out, "  {media}: {}", record.url)?,
        _ => writeln!(out, "  Image:  {}", record.url)?,
    }
    if let Some(hd) = &record.hdurl {
        writeln!(out, "  HD:     {hd}")?;
    }
    writeln!(out)?;
    for line in wrap(&record.explanation, WRAP_WIDTH) {
        writeln!(out, "  {line}")?;
    }
    Ok(())
}

/// Write the favorites list, oldest first.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn render_favorites<W: Write>(out: &mut W, favorites: &FavoritesStore) -> io::Result<()> {
    if favorites.is_empty() {
        writeln!(
            out,
            "No favorites yet! Add one with `favorites add <DATE>` or `fav` while browsing."
        )?;
        return Ok(());
    }

    writeln!(out, "Your favorite pictures ({}):", favorites.len())?;
    for favorite in favorites.iter() {
        writeln!(out, "  {}  {}", favorite.date, favorite.title)?;
        writeln!(out, "              {}", favorite.url)?;
    }
    Ok(())
}

/// Greedy word wrap; words longer than `width` get a line of their own.
#[must_use]
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
