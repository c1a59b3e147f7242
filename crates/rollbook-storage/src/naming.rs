//! Storage key naming
//!
//! All storage keys are built here so backends and the duplicate detector
//! agree on the layout. An object name is `<base>_<suffix>.<ext>`: the
//! user-supplied stem (slugged for avatars, verbatim for documents), a
//! 4-character random alphanumeric suffix, and the original extension.
//! The suffix keeps re-uploads of the same filename from colliding while
//! leaving the base name recoverable for duplicate comparison.

use rand::distr::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

pub const SUFFIX_LEN: usize = 4;
const AVATAR_SLUG_MAX: usize = 50;

pub const DOCUMENT_PREFIX: &str = "student_files";
pub const AVATAR_PREFIX: &str = "avatar_images";

/// The supplied filename has no usable base name.
#[derive(Debug, thiserror::Error)]
#[error("no extractable base name in '{0}'")]
pub struct InvalidFilename(pub String);

impl From<InvalidFilename> for rollbook_core::AppError {
    fn from(err: InvalidFilename) -> Self {
        rollbook_core::AppError::InvalidFilename(err.to_string())
    }
}

fn random_suffix() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect()
}

fn split_filename(filename: &str) -> Result<(&str, Option<&str>), InvalidFilename> {
    let (stem, ext) = match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (filename, None),
    };
    if stem.trim().is_empty() {
        return Err(InvalidFilename(filename.to_string()));
    }
    Ok((stem, ext))
}

fn object_name(stem: &str, ext: Option<&str>) -> String {
    match ext {
        Some(ext) => format!("{stem}_{}.{ext}", random_suffix()),
        None => format!("{stem}_{}", random_suffix()),
    }
}

/// Lower-case, URL/path-safe slug: alphanumeric runs joined by `-`,
/// truncated to 50 characters.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug.truncate(AVATAR_SLUG_MAX);
    slug
}

/// Storage key for a student document: `student_files/<stem>_<sfx>.<ext>`.
/// The stem is kept verbatim so the duplicate detector can recover it.
pub fn document_key(original_filename: &str) -> Result<String, InvalidFilename> {
    let (stem, ext) = split_filename(original_filename)?;
    Ok(format!("{DOCUMENT_PREFIX}/{}", object_name(stem, ext)))
}

/// Storage key for a student avatar, namespaced per student:
/// `avatar_images/{student_id}/<slug>_<sfx>.<ext>`. The stem is slugged and
/// the extension lower-cased.
pub fn avatar_key(student_id: Uuid, original_filename: &str) -> Result<String, InvalidFilename> {
    let (stem, ext) = split_filename(original_filename)?;
    let slug = slugify(stem);
    if slug.is_empty() {
        return Err(InvalidFilename(original_filename.to_string()));
    }
    let ext = ext.map(|e| e.to_ascii_lowercase());
    Ok(format!(
        "{AVATAR_PREFIX}/{student_id}/{}",
        object_name(&slug, ext.as_deref())
    ))
}
