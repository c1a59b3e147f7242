//! Avatar quality thresholds
//!
//! Pure classification of raw brightness/sharpness metrics (0-100) into
//! hard issues, advisory warnings, status tiers and recommendations. Hard
//! issues block acceptance; warnings do not. Band boundaries resolve to the
//! lower band: a brightness of exactly 30 is "too dark", not merely low.

use serde::Serialize;

use crate::analyzer::FaceQuality;

/// Status tier for a 0-100 quality metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum QualityTier {
    Unacceptable,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl QualityTier {
    pub fn from_score(value: f32) -> Self {
        if value >= 80.0 {
            QualityTier::Excellent
        } else if value >= 60.0 {
            QualityTier::Good
        } else if value >= 40.0 {
            QualityTier::Fair
        } else if value >= 30.0 {
            QualityTier::Poor
        } else {
            QualityTier::Unacceptable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Unacceptable => "Unacceptable",
            QualityTier::Poor => "Poor",
            QualityTier::Fair => "Fair",
            QualityTier::Good => "Good",
            QualityTier::Excellent => "Excellent",
        }
    }
}

/// Classification of a single metric value: blocking issue, advisory
/// warning, or acceptable.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricFlag {
    Issue(String),
    Warning(String),
}

fn pct(value: f32) -> i64 {
    value.round() as i64
}

pub fn classify_brightness(value: f32) -> Option<MetricFlag> {
    if value <= 20.0 {
        Some(MetricFlag::Issue(format!(
            "Image is extremely dark (brightness: {}%)",
            pct(value)
        )))
    } else if value <= 30.0 {
        Some(MetricFlag::Issue(format!(
            "Image is too dark (brightness: {}%)",
            pct(value)
        )))
    } else if value <= 40.0 {
        Some(MetricFlag::Warning(format!(
            "Image brightness is low (brightness: {}%)",
            pct(value)
        )))
    } else if value > 90.0 {
        Some(MetricFlag::Issue(format!(
            "Image is too bright (brightness: {}%)",
            pct(value)
        )))
    } else {
        None
    }
}

pub fn classify_sharpness(value: f32) -> Option<MetricFlag> {
    if value <= 20.0 {
        Some(MetricFlag::Issue(format!(
            "Image is extremely blurry (sharpness: {}%)",
            pct(value)
        )))
    } else if value <= 30.0 {
        Some(MetricFlag::Issue(format!(
            "Image is too blurry (sharpness: {}%)",
            pct(value)
        )))
    } else if value <= 40.0 {
        Some(MetricFlag::Warning(format!(
            "Image could be clearer (sharpness: {}%)",
            pct(value)
        )))
    } else {
        None
    }
}

pub fn brightness_recommendation(value: f32) -> &'static str {
    if value <= 20.0 {
        "Try taking the photo in a well-lit area or add more lighting"
    } else if value <= 30.0 {
        "Increase the lighting in your environment"
    } else if value <= 40.0 {
        "Consider using slightly better lighting"
    } else if value > 90.0 {
        "Reduce the lighting or avoid direct bright light"
    } else {
        "Lighting is acceptable"
    }
}

pub fn sharpness_recommendation(value: f32) -> &'static str {
    if value <= 20.0 {
        "Image is too blurry. Keep the camera steady and ensure proper focus"
    } else if value <= 30.0 {
        "Make sure the camera is focused on your face"
    } else if value <= 40.0 {
        "Try to keep the camera more steady"
    } else {
        "Image clarity is acceptable"
    }
}

/// Assessment of one metric: rounded value, tier, recommendation.
#[derive(Debug, Clone, Serialize)]
pub struct MetricAssessment {
    pub value: f32,
    pub status: QualityTier,
    pub recommendation: String,
}

/// Per-assessment quality report. Ephemeral; exists only for the duration
/// of one avatar validation.
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub brightness: MetricAssessment,
    pub sharpness: MetricAssessment,
    pub overall_quality: QualityTier,
    pub warnings: Vec<String>,
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

impl QualityReport {
    pub fn from_metrics(quality: &FaceQuality, warnings: Vec<String>) -> Self {
        Self {
            brightness: MetricAssessment {
                value: round2(quality.brightness),
                status: QualityTier::from_score(quality.brightness),
                recommendation: brightness_recommendation(quality.brightness).to_string(),
            },
            sharpness: MetricAssessment {
                value: round2(quality.sharpness),
                status: QualityTier::from_score(quality.sharpness),
                recommendation: sharpness_recommendation(quality.sharpness).to_string(),
            },
            overall_quality: QualityTier::from_score(
                (quality.brightness + quality.sharpness) / 2.0,
            ),
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_partitions_whole_range() {
        // every integer in [0,100] lands in exactly one tier, monotonically
        let mut last = QualityTier::Unacceptable;
        for v in 0..=100 {
            let tier = QualityTier::from_score(v as f32);
            assert!(tier >= last, "tier regressed at {v}");
            last = tier;
        }
        assert_eq!(QualityTier::from_score(0.0), QualityTier::Unacceptable);
        assert_eq!(QualityTier::from_score(29.9), QualityTier::Unacceptable);
        assert_eq!(QualityTier::from_score(30.0), QualityTier::Poor);
        assert_eq!(QualityTier::from_score(40.0), QualityTier::Fair);
        assert_eq!(QualityTier::from_score(60.0), QualityTier::Good);
        assert_eq!(QualityTier::from_score(80.0), QualityTier::Excellent);
        assert_eq!(QualityTier::from_score(100.0), QualityTier::Excellent);
    }

    #[test]
    fn test_brightness_bands() {
        assert!(matches!(
            classify_brightness(15.0),
            Some(MetricFlag::Issue(m)) if m.contains("extremely dark")
        ));
        assert!(matches!(
            classify_brightness(25.0),
            Some(MetricFlag::Issue(m)) if m.contains("too dark")
        ));
        assert!(matches!(
            classify_brightness(35.0),
            Some(MetricFlag::Warning(m)) if m.contains("brightness is low")
        ));
        assert_eq!(classify_brightness(65.0), None);
        assert!(matches!(
            classify_brightness(95.0),
            Some(MetricFlag::Issue(m)) if m.contains("too bright")
        ));
    }

    #[test]
    fn test_brightness_boundaries_resolve_to_lower_band() {
        assert!(matches!(
            classify_brightness(20.0),
            Some(MetricFlag::Issue(m)) if m.contains("extremely dark")
        ));
        assert!(matches!(
            classify_brightness(30.0),
            Some(MetricFlag::Issue(m)) if m.contains("too dark")
        ));
        assert!(matches!(
            classify_brightness(40.0),
            Some(MetricFlag::Warning(_))
        ));
        // 90 itself is acceptable; only above is too bright
        assert_eq!(classify_brightness(90.0), None);
    }

    #[test]
    fn test_sharpness_bands() {
        assert!(matches!(
            classify_sharpness(10.0),
            Some(MetricFlag::Issue(m)) if m.contains("extremely blurry")
        ));
        assert!(matches!(
            classify_sharpness(30.0),
            Some(MetricFlag::Issue(m)) if m.contains("too blurry")
        ));
        assert!(matches!(
            classify_sharpness(40.0),
            Some(MetricFlag::Warning(m)) if m.contains("could be clearer")
        ));
        assert_eq!(classify_sharpness(41.0), None);
        assert_eq!(classify_sharpness(100.0), None);
    }

    #[test]
    fn test_messages_carry_rounded_percentages() {
        match classify_brightness(15.4) {
            Some(MetricFlag::Issue(m)) => assert!(m.contains("15%"), "{m}"),
            other => panic!("unexpected: {other:?}"),
        }
        match classify_sharpness(35.6) {
            Some(MetricFlag::Warning(m)) => assert!(m.contains("36%"), "{m}"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_recommendations_follow_bands() {
        assert!(brightness_recommendation(10.0).contains("well-lit"));
        assert!(brightness_recommendation(25.0).contains("Increase the lighting"));
        assert!(brightness_recommendation(35.0).contains("slightly better lighting"));
        assert!(brightness_recommendation(95.0).contains("Reduce the lighting"));
        assert_eq!(brightness_recommendation(50.0), "Lighting is acceptable");

        assert!(sharpness_recommendation(10.0).contains("Keep the camera steady"));
        assert!(sharpness_recommendation(25.0).contains("focused on your face"));
        assert!(sharpness_recommendation(35.0).contains("more steady"));
        assert_eq!(sharpness_recommendation(50.0), "Image clarity is acceptable");
    }

    #[test]
    fn test_overall_quality_uses_mean() {
        let report = QualityReport::from_metrics(
            &FaceQuality {
                brightness: 90.0,
                sharpness: 70.0,
            },
            vec![],
        );
        // mean 80 -> Excellent
        assert_eq!(report.overall_quality, QualityTier::Excellent);
        assert_eq!(report.brightness.status, QualityTier::Excellent);
        assert_eq!(report.sharpness.status, QualityTier::Good);
    }

    #[test]
    fn test_report_rounds_values() {
        let report = QualityReport::from_metrics(
            &FaceQuality {
                brightness: 33.333,
                sharpness: 66.666,
            },
            vec![],
        );
        assert_eq!(report.brightness.value, 33.33);
        assert_eq!(report.sharpness.value, 66.67);
    }
}
