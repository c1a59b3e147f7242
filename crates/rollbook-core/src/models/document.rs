use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A stored document belonging to a student.
///
/// `file_path` is the object-storage key. `original_filename` is the name
/// the uploader supplied, preserved verbatim for duplicate comparison and
/// display; the storage key is randomized independently of it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Document {
    pub id: Uuid,
    pub student_id: Uuid,
    pub file_path: String,
    pub original_filename: String,
    pub file_size: i64,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Human-readable file size, e.g. "1.25 MB".
    pub fn formatted_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Fields required to record a freshly stored document.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub student_id: Uuid,
    pub file_path: String,
    pub original_filename: String,
    pub file_size: i64,
    pub mime_type: String,
}

/// Document as presented to API clients.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub original_filename: String,
    pub file_size: i64,
    pub formatted_size: String,
    pub mime_type: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl DocumentResponse {
    pub fn from_document(document: Document, url: String) -> Self {
        Self {
            id: document.id,
            student_id: document.student_id,
            formatted_size: document.formatted_size(),
            original_filename: document.original_filename,
            file_size: document.file_size,
            mime_type: document.mime_type,
            url,
            created_at: document.created_at,
        }
    }
}

/// Format a byte count the way the legacy clients expect it.
pub fn format_file_size(bytes: i64) -> String {
    const KB: i64 = 1024;
    const MB: i64 = 1024 * KB;
    const GB: i64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else if bytes > 1 {
        format!("{bytes} bytes")
    } else if bytes == 1 {
        "1 byte".to_string()
    } else {
        "0 bytes".to_string()
    }
}
