//! Metadata verification and repair backed by `lofty`.

use std::path::Path;

use lofty::config::WriteOptions;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::prelude::Accessor;
use lofty::read_from_path;
use lofty::tag::Tag;

use crate::error::Result;

/// Returns true when the file carries the expected album tag and at least
/// one embedded picture.
///
/// An unreadable or untagged file is simply "not complete"; read errors
/// are not escalated because the caller treats them as a re-tag signal.
#[must_use]
pub fn is_tagged(path: &Path, album: &str) -> bool {
    let Ok(tagged_file) = read_from_path(path) else {
        return false;
    };
    let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
        return false;
    };
    tag.album().as_deref() == Some(album) && !tag.pictures().is_empty()
}

/// Writes the album tag and attaches the cover as the front-cover picture.
///
/// Idempotent: any existing front cover is replaced, not accumulated, so
/// applying this twice leaves exactly one cover in place.
///
/// # Errors
///
/// Returns an error if the audio container cannot be parsed, the cover
/// file cannot be read, or the tag cannot be persisted.
pub fn apply(path: &Path, cover_path: &Path, album: &str) -> Result<()> {
    let mut tagged_file = read_from_path(path)?;
    let tag_type = tagged_file.primary_tag_type();
    if tagged_file.tag(tag_type).is_none() {
        tagged_file.insert_tag(Tag::new(tag_type));
    }
    let Some(tag) = tagged_file.tag_mut(tag_type) else {
        return Err(crate::Error::Io(std::io::Error::other(
            "no writable tag in audio container",
        )));
    };

    tag.set_album(album.to_string());

    let cover = std::fs::read(cover_path)?;
    let _ = tag.remove_picture_type(PictureType::CoverFront);
    tag.push_picture(
        Picture::unchecked(cover)
            .pic_type(PictureType::CoverFront)
            .mime_type(MimeType::Jpeg)
            .description("Cover")
            .build(),
    );

    tagged_file.save_to_path(path, WriteOptions::default())?;
    Ok(())
}
