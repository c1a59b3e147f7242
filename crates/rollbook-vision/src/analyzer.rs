//! Face-analysis service boundary

use async_trait::async_trait;
use serde::Serialize;

/// Raw quality metrics for one detected face, each scaled 0-100.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FaceQuality {
    pub brightness: f32,
    pub sharpness: f32,
}

/// One face found in an image. Only the quality metrics are consumed here;
/// no identity or landmark data crosses this boundary.
#[derive(Debug, Clone, Copy)]
pub struct DetectedFace {
    pub quality: FaceQuality,
}

/// External face-analysis collaborator.
///
/// Implementations may fail on transport errors; the assessor converts any
/// failure into a structured invalid result, so callers never see a raw
/// fault from this trait.
#[async_trait]
pub trait FaceAnalyzer: Send + Sync {
    async fn detect_faces(&self, image: &[u8]) -> anyhow::Result<Vec<DetectedFace>>;
}
