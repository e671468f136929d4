use serde::{Deserialize, Serialize};

/// Target ROI (percent) assumed when the caller doesn't supply one.
pub const DEFAULT_TARGET_ROI: f64 = 25.0;

/// How much the ARV estimate itself should be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArvConfidence {
    Low,
    Medium,
    High,
}

impl ArvConfidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArvConfidence::Low => "low",
            ArvConfidence::Medium => "medium",
            ArvConfidence::High => "high",
        }
    }
}

impl std::fmt::Display for ArvConfidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationInput {
    pub property_id: String,
    pub arv: f64,
    pub arv_confidence: ArvConfidence,
    pub rehab_cost: f64,
    pub closing_costs: f64,
    pub holding_costs: f64,
    #[serde(default)]
    pub target_roi: Option<f64>,
    #[serde(default)]
    pub opening_bid: Option<f64>,
    #[serde(default)]
    pub market_value: Option<f64>,
    #[serde(default)]
    pub assessed_value: Option<f64>,
    #[serde(default)]
    pub comparables_count: Option<u32>,
    /// 0..=1
    #[serde(default)]
    pub data_quality_score: Option<f64>,
    /// 0..=25, higher is safer.
    #[serde(default)]
    pub risk_score: Option<f64>,
}

impl RecommendationInput {
    pub fn effective_target_roi(&self) -> f64 {
        self.target_roi.unwrap_or(DEFAULT_TARGET_ROI)
    }
}

/// Bid ceilings per risk tier, rounded to the nearest 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BidRange {
    pub conservative: f64,
    pub moderate: f64,
    pub aggressive: f64,
}

/// Diagnostic breakdown of confidence. Not re-aggregated into the headline
/// confidence level and not expected to reconcile with it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceFactors {
    pub comparables_quality: f64,
    pub cost_estimate_accuracy: f64,
    pub property_data_completeness: f64,
    pub market_data_freshness: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskSeverity::Low => "low",
            RiskSeverity::Medium => "medium",
            RiskSeverity::High => "high",
            RiskSeverity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskWarningType {
    OpeningBidExceedsMax,
    ThinMargin,
    NarrowBidRange,
    HighRehabCost,
    HighRiskProperty,
    DataQuality,
}

impl RiskWarningType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskWarningType::OpeningBidExceedsMax => "opening_bid_exceeds_max",
            RiskWarningType::ThinMargin => "thin_margin",
            RiskWarningType::NarrowBidRange => "narrow_bid_range",
            RiskWarningType::HighRehabCost => "high_rehab_cost",
            RiskWarningType::HighRiskProperty => "high_risk_property",
            RiskWarningType::DataQuality => "data_quality",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskWarning {
    #[serde(rename = "type")]
    pub warning_type: RiskWarningType,
    pub severity: RiskSeverity,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    ArvBased,
    Hybrid,
    MarketValueBased,
    AssessedValueBased,
}

impl CalculationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationMethod::ArvBased => "arv_based",
            CalculationMethod::Hybrid => "hybrid",
            CalculationMethod::MarketValueBased => "market_value_based",
            CalculationMethod::AssessedValueBased => "assessed_value_based",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArvMultipliers {
    pub conservative: f64,
    pub moderate: f64,
    pub aggressive: f64,
}

/// Every input and derived total that went into a recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationBasis {
    pub arv: f64,
    pub arv_confidence: ArvConfidence,
    pub rehab_cost: f64,
    pub closing_costs: f64,
    pub holding_costs: f64,
    pub selling_costs: f64,
    pub total_costs: f64,
    pub confidence_adjustment: f64,
    pub arv_multipliers: ArvMultipliers,
    pub target_roi: f64,
    pub market_value: Option<f64>,
    pub assessed_value: Option<f64>,
    pub comparables_count: Option<u32>,
    pub data_quality_score: Option<f64>,
    pub risk_score: Option<f64>,
    pub total_investment: f64,
    pub net_profit: f64,
    pub calculation_method: CalculationMethod,
}

/// Engine output. Identifiers and timestamps are assigned by storage
/// (see `storage::recommendations::StoredBidRecommendation`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidRecommendation {
    pub property_id: String,
    pub arv: f64,
    pub arv_confidence: ArvConfidence,
    pub opening_bid: Option<f64>,
    pub rehab_cost: f64,
    pub closing_costs: f64,
    pub holding_costs: f64,
    pub target_roi: f64,
    pub bid_range: BidRange,
    pub recommended_bid: f64,
    pub max_bid: f64,
    pub exceeds_max_bid: bool,
    pub confidence_level: f64,
    pub confidence_factors: ConfidenceFactors,
    /// Percent; negative when the moderate scenario loses money.
    pub roi_projection: f64,
    pub projected_profit: f64,
    pub risk_warnings: Vec<RiskWarning>,
    pub calculation_basis: CalculationBasis,
    pub recommendation_version: String,
}

impl BidRecommendation {
    pub fn highest_severity(&self) -> Option<RiskSeverity> {
        self.risk_warnings.iter().map(|w| w.severity).max()
    }

    pub fn has_warning(&self, warning_type: RiskWarningType) -> bool {
        self.risk_warnings
            .iter()
            .any(|w| w.warning_type == warning_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn input_accepts_missing_optional_keys() {
        let input: RecommendationInput = serde_json::from_value(json!({
            "property_id": "prop-1",
            "arv": 150000.0,
            "arv_confidence": "medium",
            "rehab_cost": 30000.0,
            "closing_costs": 3000.0,
            "holding_costs": 2000.0,
        }))
        .unwrap();

        assert_eq!(input.arv_confidence, ArvConfidence::Medium);
        assert_eq!(input.opening_bid, None);
        assert_eq!(input.comparables_count, None);
        assert_eq!(input.effective_target_roi(), DEFAULT_TARGET_ROI);
    }

    #[test]
    fn input_rejects_unknown_confidence_tier() {
        let res = serde_json::from_value::<RecommendationInput>(json!({
            "property_id": "prop-1",
            "arv": 150000.0,
            "arv_confidence": "certain",
            "rehab_cost": 0.0,
            "closing_costs": 0.0,
            "holding_costs": 0.0,
        }));
        assert!(res.is_err());
    }

    #[test]
    fn warning_serializes_with_wire_tags() {
        let w = RiskWarning {
            warning_type: RiskWarningType::OpeningBidExceedsMax,
            severity: RiskSeverity::Critical,
            message: "m".to_string(),
        };
        let v = serde_json::to_value(&w).unwrap();
        assert_eq!(v["type"], "opening_bid_exceeds_max");
        assert_eq!(v["severity"], "critical");
        assert_eq!(
            serde_json::to_value(RiskWarningType::DataQuality).unwrap(),
            RiskWarningType::DataQuality.as_str()
        );
    }

    fn wire_tag<T: Serialize>(value: T) -> String {
        serde_json::to_value(value)
            .unwrap()
            .as_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn as_str_matches_wire_tags() {
        for tier in [ArvConfidence::Low, ArvConfidence::Medium, ArvConfidence::High] {
            assert_eq!(wire_tag(tier), tier.as_str());
            assert_eq!(tier.to_string(), tier.as_str());
        }
        for severity in [
            RiskSeverity::Low,
            RiskSeverity::Medium,
            RiskSeverity::High,
            RiskSeverity::Critical,
        ] {
            assert_eq!(wire_tag(severity), severity.as_str());
        }
        for method in [
            CalculationMethod::ArvBased,
            CalculationMethod::Hybrid,
            CalculationMethod::MarketValueBased,
            CalculationMethod::AssessedValueBased,
        ] {
            assert_eq!(wire_tag(method), method.as_str());
        }
        for warning_type in [
            RiskWarningType::OpeningBidExceedsMax,
            RiskWarningType::ThinMargin,
            RiskWarningType::NarrowBidRange,
            RiskWarningType::HighRehabCost,
            RiskWarningType::HighRiskProperty,
            RiskWarningType::DataQuality,
        ] {
            assert_eq!(wire_tag(warning_type), warning_type.as_str());
        }
    }

    #[test]
    fn severities_are_ordered() {
        assert!(RiskSeverity::Low < RiskSeverity::Medium);
        assert!(RiskSeverity::Medium < RiskSeverity::High);
        assert!(RiskSeverity::High < RiskSeverity::Critical);
    }
}
