//! Avatar replacement route

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rollbook_core::models::StudentResponse;
use serde::Serialize;
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::extract::parse_single_file;
use crate::handlers::Envelope;
use crate::services::ingestion::ReplaceAvatarOutcome;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AvatarData {
    pub student: StudentResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_quality: Option<rollbook_vision::QualityReport>,
}

pub async fn replace_avatar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let file = parse_single_file(multipart).await?;
    let outcome = state.ingestion.replace_avatar(id, file).await?;

    match outcome {
        ReplaceAvatarOutcome::Replaced {
            student,
            avatar_quality,
        } => {
            let body = Envelope::success(
                "Avatar updated successfully",
                AvatarData {
                    student,
                    avatar_quality,
                },
            );
            Ok((StatusCode::OK, Json(body)).into_response())
        }
        ReplaceAvatarOutcome::Rejected(verdict) => Ok(super::avatar_rejection(verdict)),
    }
}
