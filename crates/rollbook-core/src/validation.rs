//! Upload constraint validation
//!
//! Per-file checks applied before any storage or metadata mutation. The
//! allowed types and the 2 MiB cap match the legacy upload rules.

use crate::error::AppError;

/// Default per-file size cap (2 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

pub const DOCUMENT_ALLOWED_EXTENSIONS: &[&str] =
    &["pdf", "docx", "xlsx", "pptx", "jpeg", "jpg", "png"];

pub const DOCUMENT_ALLOWED_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "image/jpeg",
    "image/png",
];

pub const AVATAR_ALLOWED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif"];

pub const AVATAR_ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif"];

fn extension_of(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

fn validate_file(
    filename: &str,
    content_type: &str,
    size: usize,
    max_bytes: usize,
    allowed_extensions: &[&str],
    allowed_content_types: &[&str],
    kind: &str,
) -> Result<(), AppError> {
    if size == 0 {
        return Err(AppError::Validation(format!("{filename} is empty.")));
    }
    if size > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "File size should not exceed {} MB.",
            max_bytes / (1024 * 1024)
        )));
    }

    let ext = extension_of(filename).ok_or_else(|| {
        AppError::Validation(format!("{filename} has no file extension."))
    })?;
    if !allowed_extensions.contains(&ext.as_str()) {
        return Err(AppError::Validation(format!(
            "Only {} files are allowed for {kind}s.",
            allowed_extensions.join(", ")
        )));
    }

    // Content type as declared by the client; the extension check above is
    // the primary gate, this catches obviously mislabeled uploads.
    let ct = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase();
    if !ct.is_empty() && !allowed_content_types.contains(&ct.as_str()) {
        return Err(AppError::Validation(format!(
            "Content type {ct} is not allowed for {kind}s."
        )));
    }

    Ok(())
}

/// Validate a document upload against the legacy constraints.
pub fn validate_document_file(
    filename: &str,
    content_type: &str,
    size: usize,
    max_bytes: usize,
) -> Result<(), AppError> {
    validate_file(
        filename,
        content_type,
        size,
        max_bytes,
        DOCUMENT_ALLOWED_EXTENSIONS,
        DOCUMENT_ALLOWED_CONTENT_TYPES,
        "document",
    )
}

/// Validate an avatar upload. Avatars must be images.
pub fn validate_avatar_file(
    filename: &str,
    content_type: &str,
    size: usize,
    max_bytes: usize,
) -> Result<(), AppError> {
    validate_file(
        filename,
        content_type,
        size,
        max_bytes,
        AVATAR_ALLOWED_EXTENSIONS,
        AVATAR_ALLOWED_CONTENT_TYPES,
        "avatar",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_accepts_allowed_types() {
        for (name, ct) in [
            ("report.pdf", "application/pdf"),
            ("notes.DOCX", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
            ("scan.jpeg", "image/jpeg"),
            ("chart.png", "image/png"),
        ] {
            validate_document_file(name, ct, 1024, DEFAULT_MAX_UPLOAD_BYTES).unwrap();
        }
    }

    #[test]
    fn test_document_rejects_disallowed_extension() {
        let err =
            validate_document_file("malware.exe", "application/pdf", 10, DEFAULT_MAX_UPLOAD_BYTES)
                .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_document_rejects_oversize_and_empty() {
        let err = validate_document_file(
            "big.pdf",
            "application/pdf",
            DEFAULT_MAX_UPLOAD_BYTES + 1,
            DEFAULT_MAX_UPLOAD_BYTES,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(msg) if msg.contains("2 MB")));

        let err =
            validate_document_file("empty.pdf", "application/pdf", 0, DEFAULT_MAX_UPLOAD_BYTES)
                .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_document_rejects_missing_extension() {
        assert!(
            validate_document_file("README", "application/pdf", 10, DEFAULT_MAX_UPLOAD_BYTES)
                .is_err()
        );
    }

    #[test]
    fn test_avatar_rejects_pdf() {
        assert!(
            validate_avatar_file("cv.pdf", "application/pdf", 10, DEFAULT_MAX_UPLOAD_BYTES)
                .is_err()
        );
    }

    #[test]
    fn test_avatar_accepts_images_with_charset_suffix() {
        validate_avatar_file("me.jpg", "image/jpeg; charset=binary", 10, DEFAULT_MAX_UPLOAD_BYTES)
            .unwrap();
        validate_avatar_file("me.gif", "image/gif", 10, DEFAULT_MAX_UPLOAD_BYTES).unwrap();
    }

    #[test]
    fn test_mismatched_content_type_rejected() {
        assert!(
            validate_avatar_file("me.png", "application/pdf", 10, DEFAULT_MAX_UPLOAD_BYTES)
                .is_err()
        );
    }
}
