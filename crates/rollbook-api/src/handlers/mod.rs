//! HTTP handlers
//!
//! Every success response is wrapped in the `{status, message, data}`
//! envelope; errors go through [`crate::error::HttpAppError`].

pub mod avatar;
pub mod documents;
pub mod students;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rollbook_core::{AppError, ErrorMetadata};
use rollbook_vision::{FaceValidation, RejectionReason};
use serde::Serialize;
use serde_json::json;

use crate::error::ErrorEnvelope;

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success",
            message: message.into(),
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
            data: None,
        }
    }
}

/// Render a rejected avatar verdict. The status code and message come from
/// the error taxonomy entry matching the rejection reason; the envelope
/// carries the issue list and the quality report when one was produced.
pub(crate) fn avatar_rejection(verdict: FaceValidation) -> Response {
    let error = match verdict.reason {
        Some(RejectionReason::NoFaceDetected) => AppError::NoFaceDetected,
        Some(RejectionReason::ProcessingFailed) => AppError::ImageProcessing(
            verdict
                .issues
                .first()
                .cloned()
                .unwrap_or_else(|| verdict.message.clone()),
        ),
        _ => AppError::QualityRejected(verdict.message.clone()),
    };
    let status = StatusCode::from_u16(error.http_status_code())
        .unwrap_or(StatusCode::UNPROCESSABLE_ENTITY);

    (
        status,
        Json(ErrorEnvelope::with_errors(
            error.client_message(),
            json!({
                "avatar": verdict.issues,
                "quality": verdict.quality,
            }),
        )),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_serialization() {
        let value =
            serde_json::to_value(Envelope::success("Student created successfully", 42)).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["data"], 42);

        let value = serde_json::to_value(Envelope::message_only("Student deleted")).unwrap();
        assert!(value.get("data").is_none());
    }

    fn verdict(message: &str, reason: RejectionReason, issue: &str) -> FaceValidation {
        FaceValidation {
            valid: false,
            message: message.to_string(),
            issues: vec![issue.to_string()],
            quality: None,
            reason: Some(reason),
        }
    }

    #[test]
    fn test_no_face_rejection_is_422() {
        let response = avatar_rejection(verdict(
            "No human face detected in the image",
            RejectionReason::NoFaceDetected,
            "No face detected in the uploaded image",
        ));
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_quality_rejection_is_422() {
        let response = avatar_rejection(verdict(
            "Image quality does not meet minimum requirements",
            RejectionReason::QualityBelowMinimum,
            "Image is extremely dark (brightness: 10%)",
        ));
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_analysis_fault_is_400() {
        let response = avatar_rejection(verdict(
            "Error processing image",
            RejectionReason::ProcessingFailed,
            "Failed to process image: connection reset",
        ));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
