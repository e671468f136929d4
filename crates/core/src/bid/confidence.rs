use crate::domain::recommendation::{ArvConfidence, ConfidenceFactors};

const DATA_QUALITY_WEIGHT: f64 = 0.4;

/// Used for factors that would otherwise come from a missing data-quality score.
const DEFAULT_FACTOR: f64 = 0.7;

/// No staleness signal reaches the engine, so this is a fixed stand-in rather
/// than a measurement.
pub const MARKET_DATA_FRESHNESS: f64 = 0.85;

fn base_confidence(arv_confidence: ArvConfidence) -> f64 {
    match arv_confidence {
        ArvConfidence::Low => 0.4,
        ArvConfidence::Medium => 0.65,
        ArvConfidence::High => 0.85,
    }
}

fn base_comparables_quality(arv_confidence: ArvConfidence) -> f64 {
    match arv_confidence {
        ArvConfidence::Low => 0.3,
        ArvConfidence::Medium => 0.6,
        ArvConfidence::High => 0.85,
    }
}

/// Headline confidence in `[0, 1]`.
///
/// Starts from the ARV confidence tier, blends in the data-quality score at
/// 40% weight when known, then adjusts for how many comparables backed the
/// ARV: +0.05 at 5 or more, another +0.05 at 10 or more, -0.10 under 3.
pub fn calculate_confidence_level(
    arv_confidence: ArvConfidence,
    data_quality_score: Option<f64>,
    comparables_count: Option<u32>,
) -> f64 {
    let mut confidence = base_confidence(arv_confidence);

    if let Some(quality) = data_quality_score {
        confidence = confidence * (1.0 - DATA_QUALITY_WEIGHT) + quality * DATA_QUALITY_WEIGHT;
    }

    if let Some(count) = comparables_count {
        if count >= 5 {
            confidence += 0.05;
        }
        if count >= 10 {
            confidence += 0.05;
        }
        if count < 3 {
            confidence -= 0.10;
        }
    }

    confidence.clamp(0.0, 1.0)
}

pub fn calculate_confidence_factors(
    arv_confidence: ArvConfidence,
    data_quality_score: Option<f64>,
    comparables_count: Option<u32>,
) -> ConfidenceFactors {
    let mut comparables_quality = base_comparables_quality(arv_confidence);
    if comparables_count.is_some_and(|n| n >= 5) {
        comparables_quality = (comparables_quality + 0.1).min(1.0);
    }

    ConfidenceFactors {
        comparables_quality,
        cost_estimate_accuracy: data_quality_score
            .map(|q| q * 0.5 + 0.4)
            .unwrap_or(DEFAULT_FACTOR),
        property_data_completeness: data_quality_score.unwrap_or(DEFAULT_FACTOR),
        market_data_freshness: MARKET_DATA_FRESHNESS,
    }
}
