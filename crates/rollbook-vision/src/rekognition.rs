//! AWS Rekognition face analyzer

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_rekognition::primitives::Blob;
use aws_sdk_rekognition::types::{Attribute, Image};
use aws_sdk_rekognition::Client as RekognitionClient;

use crate::analyzer::{DetectedFace, FaceAnalyzer, FaceQuality};

pub struct RekognitionAnalyzer {
    client: RekognitionClient,
}

impl RekognitionAnalyzer {
    /// Create an analyzer using the ambient AWS credential chain. The region
    /// falls back to the environment when not given explicitly.
    pub async fn new(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let config = loader.load().await;

        Self {
            client: RekognitionClient::new(&config),
        }
    }
}

#[async_trait]
impl FaceAnalyzer for RekognitionAnalyzer {
    async fn detect_faces(&self, image: &[u8]) -> Result<Vec<DetectedFace>> {
        let rekognition_image = Image::builder()
            .bytes(Blob::new(image.to_vec()))
            .build();

        let response = self
            .client
            .detect_faces()
            .image(rekognition_image)
            .attributes(Attribute::All)
            .send()
            .await
            .context("Failed to detect faces")?;

        let faces = response
            .face_details()
            .iter()
            .map(|detail| {
                let quality = detail.quality();
                DetectedFace {
                    quality: FaceQuality {
                        brightness: quality
                            .and_then(|q| q.brightness())
                            .unwrap_or(0.0),
                        sharpness: quality
                            .and_then(|q| q.sharpness())
                            .unwrap_or(0.0),
                    },
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            image_size = image.len(),
            faces = faces.len(),
            "Rekognition face detection completed"
        );

        Ok(faces)
    }
}
