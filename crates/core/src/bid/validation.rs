use crate::bid::format_currency;
use crate::domain::recommendation::RecommendationInput;

/// Upper bound for ARV and each cost. Keeps every derived total (costs,
/// investment, profit, ROI) finite.
pub const MAX_CURRENCY_AMOUNT: f64 = 1_000_000_000_000.0;

/// Every problem found in a [`RecommendationInput`], reported together.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid bid recommendation input: {}", .errors.join("; "))]
pub struct ValidationError {
    pub errors: Vec<String>,
}

/// Pre-flight check. Returns every violation at once; an empty list means the
/// input is safe to feed to the engine.
pub fn validate_bid_recommendation_input(input: &RecommendationInput) -> Vec<String> {
    let mut errors = Vec::new();

    if !(input.arv.is_finite() && input.arv > 0.0) {
        errors.push("ARV must be greater than 0".to_string());
    } else if input.arv > MAX_CURRENCY_AMOUNT {
        errors.push(too_large("ARV"));
    }

    for (label, value) in [
        ("Rehab cost", input.rehab_cost),
        ("Closing costs", input.closing_costs),
        ("Holding costs", input.holding_costs),
    ] {
        if !is_non_negative(value) {
            errors.push(format!("{label} cannot be negative"));
        } else if value > MAX_CURRENCY_AMOUNT {
            errors.push(too_large(label));
        }
    }

    if let Some(target_roi) = input.target_roi {
        if !is_non_negative(target_roi) {
            errors.push("Target ROI cannot be negative".to_string());
        }
    }

    if let Some(opening_bid) = input.opening_bid {
        if !is_non_negative(opening_bid) {
            errors.push("Opening bid cannot be negative".to_string());
        }
    }

    if let Some(score) = input.data_quality_score {
        if !(0.0..=1.0).contains(&score) {
            errors.push("Data quality score must be between 0 and 1".to_string());
        }
    }

    if let Some(score) = input.risk_score {
        if !(0.0..=25.0).contains(&score) {
            errors.push("Risk score must be between 0 and 25".to_string());
        }
    }

    errors
}

pub(crate) fn ensure_valid(input: &RecommendationInput) -> Result<(), ValidationError> {
    let errors = validate_bid_recommendation_input(input);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { errors })
    }
}

fn too_large(label: &str) -> String {
    format!("{label} cannot exceed {}", format_currency(MAX_CURRENCY_AMOUNT))
}

// NaN and infinities are rejected along with negatives.
fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recommendation::ArvConfidence;

    fn valid_input() -> RecommendationInput {
        RecommendationInput {
            property_id: "prop-1".to_string(),
            arv: 150_000.0,
            arv_confidence: ArvConfidence::Medium,
            rehab_cost: 30_000.0,
            closing_costs: 3_000.0,
            holding_costs: 2_000.0,
            target_roi: None,
            opening_bid: None,
            market_value: None,
            assessed_value: None,
            comparables_count: None,
            data_quality_score: None,
            risk_score: None,
        }
    }

    #[test]
    fn accepts_minimal_input() {
        assert!(validate_bid_recommendation_input(&valid_input()).is_empty());
    }

    #[test]
    fn accepts_boundary_scores() {
        let input = RecommendationInput {
            data_quality_score: Some(1.0),
            risk_score: Some(0.0),
            target_roi: Some(0.0),
            opening_bid: Some(0.0),
            ..valid_input()
        };
        assert!(validate_bid_recommendation_input(&input).is_empty());
    }

    #[test]
    fn reports_every_problem_at_once() {
        let input = RecommendationInput {
            arv: 0.0,
            rehab_cost: -1.0,
            closing_costs: -1.0,
            holding_costs: -1.0,
            target_roi: Some(-5.0),
            data_quality_score: Some(1.5),
            risk_score: Some(26.0),
            ..valid_input()
        };
        let errors = validate_bid_recommendation_input(&input);
        assert_eq!(
            errors,
            vec![
                "ARV must be greater than 0",
                "Rehab cost cannot be negative",
                "Closing costs cannot be negative",
                "Holding costs cannot be negative",
                "Target ROI cannot be negative",
                "Data quality score must be between 0 and 1",
                "Risk score must be between 0 and 25",
            ]
        );
    }

    #[test]
    fn rejects_nan_and_negative_opening_bid() {
        let input = RecommendationInput {
            arv: f64::NAN,
            opening_bid: Some(-100.0),
            data_quality_score: Some(f64::NAN),
            ..valid_input()
        };
        let errors = validate_bid_recommendation_input(&input);
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(errors.contains(&"Opening bid cannot be negative".to_string()));
    }

    #[test]
    fn rejects_amounts_whose_totals_would_overflow() {
        let input = RecommendationInput {
            arv: 1e308,
            rehab_cost: 1e308,
            closing_costs: 1e308,
            ..valid_input()
        };
        assert_eq!(
            validate_bid_recommendation_input(&input),
            vec![
                "ARV cannot exceed $1,000,000,000,000",
                "Rehab cost cannot exceed $1,000,000,000,000",
                "Closing costs cannot exceed $1,000,000,000,000",
            ]
        );
    }

    #[test]
    fn accepts_amounts_at_the_ceiling() {
        let input = RecommendationInput {
            arv: MAX_CURRENCY_AMOUNT,
            rehab_cost: MAX_CURRENCY_AMOUNT,
            holding_costs: MAX_CURRENCY_AMOUNT,
            ..valid_input()
        };
        assert!(validate_bid_recommendation_input(&input).is_empty());
    }

    #[test]
    fn ensure_valid_wraps_messages() {
        let err = ensure_valid(&RecommendationInput {
            arv: -1.0,
            ..valid_input()
        })
        .unwrap_err();
        assert_eq!(err.errors, vec!["ARV must be greater than 0".to_string()]);
        assert!(err.to_string().contains("ARV must be greater than 0"));
    }
}
