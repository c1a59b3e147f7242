//! Rollbook vision library
//!
//! Face-detection-based avatar quality gating. The [`FaceAnalyzer`] trait
//! abstracts the external face-analysis service (AWS Rekognition in
//! production); [`FaceQualityAssessor`] turns its raw brightness/sharpness
//! metrics into a pass/fail verdict with a structured report.

pub mod analyzer;
pub mod assessor;
pub mod quality;
pub mod rekognition;

pub use analyzer::{DetectedFace, FaceAnalyzer, FaceQuality};
pub use assessor::{FaceQualityAssessor, FaceValidation, RejectionReason};
pub use quality::{QualityReport, QualityTier};
pub use rekognition::RekognitionAnalyzer;
