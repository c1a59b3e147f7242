//! Duplicate upload detection
//!
//! A re-upload of the same logical file is recognized by comparing base
//! names: the filename stem with any trailing `_<4 alphanumeric>` uniqueness
//! suffix removed, case-insensitively. This reverses the suffixing applied
//! when files are named for storage, so two uploads of `report.pdf` match
//! even though they were stored as `report_a1B2.pdf` and `report_Xy9z.pdf`.
//!
//! This is a deliberately weak heuristic: renamed files slip through and
//! coincidentally named unrelated files collide. No content hashing.

use crate::models::Document;

const SUFFIX_LEN: usize = 4;

/// The filename stem: everything before the final `.`, or the whole name
/// when there is no extension.
pub fn file_stem(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => filename,
    }
}

/// Remove a single trailing `_<4 alphanumeric>` uniqueness suffix from a
/// stem, if present. Applied once, not repeatedly, so a stem that
/// legitimately ends in such a pattern only loses the generated suffix.
pub fn strip_unique_suffix(stem: &str) -> &str {
    let bytes = stem.as_bytes();
    if bytes.len() > SUFFIX_LEN + 1 {
        let split = bytes.len() - SUFFIX_LEN - 1;
        if bytes[split] == b'_'
            && bytes[split + 1..].iter().all(|b| b.is_ascii_alphanumeric())
        {
            return &stem[..split];
        }
    }
    stem
}

/// The normalized base name used for duplicate comparison.
pub fn base_name(filename: &str) -> String {
    strip_unique_suffix(file_stem(filename)).to_lowercase()
}

/// Find an existing document that is a duplicate of `candidate_filename`.
///
/// Returns the first match in `existing` order; read-only, no side effects.
pub fn find_duplicate<'a>(
    existing: &'a [Document],
    candidate_filename: &str,
) -> Option<&'a Document> {
    let candidate = base_name(candidate_filename);
    existing
        .iter()
        .find(|doc| base_name(&doc.original_filename) == candidate)
}
