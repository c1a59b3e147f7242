//! Multipart form extraction
//!
//! The legacy clients submit `multipart/form-data` with text fields for the
//! student record, an optional `avatar` file, and repeated `student_files[]`
//! entries. Parsing is collected here so handlers only see typed values.

use axum::extract::multipart::{Field, Multipart};
use bytes::Bytes;
use rollbook_core::models::NewStudent;
use rollbook_core::AppError;

/// One file lifted out of a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Everything the create-student form can carry.
#[derive(Debug)]
pub struct StudentForm {
    pub student: NewStudent,
    pub avatar: Option<UploadedFile>,
    pub files: Vec<UploadedFile>,
}

fn read_error(e: impl std::fmt::Display) -> AppError {
    AppError::Validation(format!("Failed to read upload: {e}"))
}

async fn read_file(field: Field<'_>) -> Result<UploadedFile, AppError> {
    let filename = field
        .file_name()
        .map(str::to_string)
        .ok_or_else(|| AppError::Validation("Uploaded file has no filename.".to_string()))?;
    let content_type = field.content_type().map(str::to_string).unwrap_or_default();
    let data = field.bytes().await.map_err(read_error)?;

    Ok(UploadedFile {
        filename,
        content_type,
        data,
    })
}

fn is_document_field(name: &str) -> bool {
    matches!(name, "student_files" | "student_files[]" | "files" | "files[]")
}

/// Parse the create-student multipart form. Missing or malformed record
/// fields are validation errors; per-file constraint checks happen later in
/// the workflow so one bad file cannot reject the whole form.
pub async fn parse_student_form(mut multipart: Multipart) -> Result<StudentForm, AppError> {
    let mut name = None;
    let mut age = None;
    let mut address = None;
    let mut email = None;
    let mut course = None;
    let mut avatar = None;
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(read_error)? {
        let Some(field_name) = field.name().map(str::to_string) else {
            continue;
        };

        match field_name.as_str() {
            "name" => name = Some(field.text().await.map_err(read_error)?),
            "age" => {
                let raw = field.text().await.map_err(read_error)?;
                let parsed: i32 = raw
                    .trim()
                    .parse()
                    .map_err(|_| AppError::Validation("The age must be a number.".to_string()))?;
                age = Some(parsed);
            }
            "address" => address = Some(field.text().await.map_err(read_error)?),
            "email" => email = Some(field.text().await.map_err(read_error)?),
            "course" => course = Some(field.text().await.map_err(read_error)?),
            "avatar" => avatar = Some(read_file(field).await?),
            other if is_document_field(other) => files.push(read_file(field).await?),
            other => {
                tracing::debug!(field = other, "Ignoring unknown multipart field");
            }
        }
    }

    let missing = |field: &str| AppError::Validation(format!("The {field} field is required."));

    let student = NewStudent {
        name: name.ok_or_else(|| missing("name"))?,
        age: age.ok_or_else(|| missing("age"))?,
        address: address.ok_or_else(|| missing("address"))?,
        email: email.ok_or_else(|| missing("email"))?,
        course: course.ok_or_else(|| missing("course"))?,
    };

    Ok(StudentForm {
        student,
        avatar,
        files,
    })
}

/// Collect every file field from an add-files request.
pub async fn parse_files(mut multipart: Multipart) -> Result<Vec<UploadedFile>, AppError> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(read_error)? {
        if field.file_name().is_some() {
            files.push(read_file(field).await?);
        }
    }
    if files.is_empty() {
        return Err(AppError::Validation(
            "No files were provided for upload.".to_string(),
        ));
    }
    Ok(files)
}

/// Extract exactly one file from a single-file request (replace-file,
/// replace-avatar). The first file field wins; extras are ignored.
pub async fn parse_single_file(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(read_error)? {
        if field.file_name().is_some() {
            return read_file(field).await;
        }
    }
    Err(AppError::Validation(
        "No file was provided for upload.".to_string(),
    ))
}
