//! Document ingestion routes

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rollbook_core::models::{DocumentResponse, StudentResponse};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::{ErrorEnvelope, HttpAppError};
use crate::extract::{parse_files, parse_single_file};
use crate::handlers::Envelope;
use crate::services::ingestion::{DuplicateUpload, FailedUpload};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AddFilesData {
    pub uploaded: Vec<DocumentResponse>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub duplicates: Vec<DuplicateUpload>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<FailedUpload>,
}

/// Add files to a student. 201 when at least one file was stored; 409 when
/// everything was a duplicate or failed.
pub async fn add_files(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let files = parse_files(multipart).await?;
    let outcome = state.ingestion.add_files(id, files).await?;

    if outcome.uploaded.is_empty() {
        let message = if outcome.failed.is_empty() {
            "All files are duplicates of existing documents"
        } else {
            "No files could be uploaded"
        };
        return Ok((
            StatusCode::CONFLICT,
            Json(ErrorEnvelope::with_errors(
                message,
                json!({
                    "duplicates": outcome.duplicates,
                    "failed": outcome.failed,
                }),
            )),
        )
            .into_response());
    }

    let message = format!("{} file(s) uploaded successfully", outcome.uploaded.len());
    let body = Envelope::success(
        message,
        AddFilesData {
            uploaded: outcome.uploaded,
            duplicates: outcome.duplicates,
            failed: outcome.failed,
        },
    );
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

pub async fn replace_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Envelope<DocumentResponse>>, HttpAppError> {
    let file = parse_single_file(multipart).await?;
    let document = state.ingestion.replace_document_file(id, file).await?;
    Ok(Json(Envelope::success(
        "File replaced successfully",
        document,
    )))
}

pub async fn delete_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<StudentResponse>>, HttpAppError> {
    let student = state.ingestion.delete_file(id).await?;
    Ok(Json(Envelope::success("File deleted successfully", student)))
}
