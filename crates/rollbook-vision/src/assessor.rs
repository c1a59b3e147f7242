//! Avatar quality gate
//!
//! Drives the [`FaceAnalyzer`] and turns raw metrics into a pass/fail
//! verdict. This module never propagates analyzer faults: a transport or
//! service error becomes a structured invalid verdict, so one flaky
//! detection call cannot fail a whole upload request with a 5xx.

use std::sync::Arc;

use serde::Serialize;

use crate::analyzer::FaceAnalyzer;
use crate::quality::{classify_brightness, classify_sharpness, MetricFlag, QualityReport};

/// Why an image failed the gate. Lets callers pick the right error
/// taxonomy entry without parsing the human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    NoFaceDetected,
    QualityBelowMinimum,
    ProcessingFailed,
}

/// Verdict for one avatar image.
#[derive(Debug, Clone, Serialize)]
pub struct FaceValidation {
    pub valid: bool,
    pub message: String,
    /// Blocking problems. Non-empty exactly when `valid` is false.
    pub issues: Vec<String>,
    /// Present whenever metrics were obtained, even for rejected images.
    pub quality: Option<QualityReport>,
    /// `None` exactly when `valid` is true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectionReason>,
}

impl FaceValidation {
    fn rejected(
        message: &str,
        reason: RejectionReason,
        issues: Vec<String>,
        quality: Option<QualityReport>,
    ) -> Self {
        Self {
            valid: false,
            message: message.to_string(),
            issues,
            quality,
            reason: Some(reason),
        }
    }
}

pub struct FaceQualityAssessor {
    analyzer: Arc<dyn FaceAnalyzer>,
}

impl FaceQualityAssessor {
    pub fn new(analyzer: Arc<dyn FaceAnalyzer>) -> Self {
        Self { analyzer }
    }

    /// Assess an avatar image. Infallible by contract: analyzer faults and
    /// face-less images both come back as invalid verdicts.
    pub async fn assess(&self, image: &[u8]) -> FaceValidation {
        let faces = match self.analyzer.detect_faces(image).await {
            Ok(faces) => faces,
            Err(e) => {
                tracing::error!(error = %e, "Face analysis failed");
                return FaceValidation::rejected(
                    "Error processing image",
                    RejectionReason::ProcessingFailed,
                    vec![format!("Failed to process image: {e}")],
                    None,
                );
            }
        };

        let Some(face) = faces.first() else {
            return FaceValidation::rejected(
                "No human face detected in the image",
                RejectionReason::NoFaceDetected,
                vec!["No face detected in the uploaded image".to_string()],
                None,
            );
        };

        let mut issues = Vec::new();
        let mut warnings = Vec::new();
        for flag in [
            classify_brightness(face.quality.brightness),
            classify_sharpness(face.quality.sharpness),
        ]
        .into_iter()
        .flatten()
        {
            match flag {
                MetricFlag::Issue(msg) => issues.push(msg),
                MetricFlag::Warning(msg) => warnings.push(msg),
            }
        }

        let quality = QualityReport::from_metrics(&face.quality, warnings);

        if issues.is_empty() {
            FaceValidation {
                valid: true,
                message: "Image quality meets requirements".to_string(),
                issues,
                quality: Some(quality),
                reason: None,
            }
        } else {
            tracing::warn!(
                issues = issues.len(),
                brightness = face.quality.brightness,
                sharpness = face.quality.sharpness,
                "Avatar rejected on quality"
            );
            FaceValidation::rejected(
                "Image quality does not meet minimum requirements",
                RejectionReason::QualityBelowMinimum,
                issues,
                Some(quality),
            )
        }
    }
}
