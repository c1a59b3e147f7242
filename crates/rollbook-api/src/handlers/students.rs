//! Student CRUD and create-with-files

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rollbook_core::models::{StudentResponse, UpdateStudent};
use serde::Serialize;
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::extract::parse_student_form;
use crate::handlers::Envelope;
use crate::services::ingestion::{CreateStudentOutcome, FailedUpload};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreatedStudentData {
    pub student: StudentResponse,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_files: Vec<FailedUpload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_quality: Option<rollbook_vision::QualityReport>,
}

pub async fn list_students(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<StudentResponse>>>, HttpAppError> {
    let rows = state.students.list_with_documents().await?;
    let students = rows
        .into_iter()
        .map(|(student, documents)| state.ingestion.student_response(student, documents))
        .collect::<Vec<_>>();

    Ok(Json(Envelope::success(
        "Students retrieved successfully",
        students,
    )))
}

pub async fn create_student(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let form = parse_student_form(multipart).await?;
    let outcome = state
        .ingestion
        .create_student(form.student, form.avatar, form.files)
        .await?;

    match outcome {
        CreateStudentOutcome::Created {
            student,
            failed,
            avatar_quality,
        } => {
            let message = if failed.is_empty() {
                "Student created successfully".to_string()
            } else {
                format!(
                    "Student created; {} file(s) could not be uploaded",
                    failed.len()
                )
            };
            let body = Envelope::success(
                message,
                CreatedStudentData {
                    student,
                    failed_files: failed,
                    avatar_quality,
                },
            );
            Ok((StatusCode::CREATED, Json(body)).into_response())
        }
        CreateStudentOutcome::AvatarRejected(verdict) => {
            Ok(super::avatar_rejection(verdict))
        }
    }
}

pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<UpdateStudent>,
) -> Result<Json<Envelope<StudentResponse>>, HttpAppError> {
    let student = state.ingestion.update_student(id, update).await?;
    Ok(Json(Envelope::success(
        "Student updated successfully",
        student,
    )))
}

pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<()>>, HttpAppError> {
    state.ingestion.delete_student(id).await?;
    Ok(Json(Envelope::message_only("Student deleted successfully")))
}
