use crate::bid::confidence::{calculate_confidence_factors, calculate_confidence_level};
use crate::bid::ranges::{calculate_bid_ranges, confidence_adjustment, ARV_MULTIPLIERS};
use crate::bid::validation::{ensure_valid, ValidationError};
use crate::bid::warnings::generate_risk_warnings;
use crate::bid::{ALGORITHM_VERSION, SELLING_COST_RATE};
use crate::domain::recommendation::{
    BidRecommendation, CalculationBasis, CalculationMethod, RecommendationInput,
};

/// Comparable count from which the ARV is trusted as the primary basis.
const MIN_COMPARABLES_FOR_ARV_BASIS: u32 = 3;

/// Full recommendation for one property.
///
/// Input is validated first; any violation comes back as a [`ValidationError`]
/// carrying every message, and no numbers are produced. The moderate tier is
/// the reference scenario for investment, profit and ROI.
pub fn calculate_bid_recommendation(
    input: &RecommendationInput,
) -> Result<BidRecommendation, ValidationError> {
    ensure_valid(input)?;

    let adjustment = confidence_adjustment(input.arv_confidence);
    let bid_range = calculate_bid_ranges(
        input.arv,
        input.rehab_cost,
        input.closing_costs,
        input.holding_costs,
        adjustment,
    );

    let confidence_level = calculate_confidence_level(
        input.arv_confidence,
        input.data_quality_score,
        input.comparables_count,
    );

    let risk_warnings = generate_risk_warnings(
        &bid_range,
        input.opening_bid,
        input.arv,
        input.rehab_cost,
        input.risk_score,
    );

    let exceeds_max_bid = input
        .opening_bid
        .is_some_and(|bid| bid > bid_range.aggressive);

    let total_investment =
        bid_range.moderate + input.rehab_cost + input.closing_costs + input.holding_costs;
    let selling_costs = input.arv * SELLING_COST_RATE;
    let net_profit = input.arv - total_investment - selling_costs;
    // A tiny ARV can round every tier to 0 and leave nothing invested; ROI is
    // reported as 0 there rather than as an infinite or undefined ratio.
    let roi_projection = if total_investment > 0.0 {
        net_profit / total_investment * 100.0
    } else {
        0.0
    };

    let target_roi = input.effective_target_roi();
    let method = calculation_method(input);
    let calculation_basis = CalculationBasis {
        arv: input.arv,
        arv_confidence: input.arv_confidence,
        rehab_cost: input.rehab_cost,
        closing_costs: input.closing_costs,
        holding_costs: input.holding_costs,
        selling_costs,
        total_costs: input.rehab_cost + input.closing_costs + input.holding_costs + selling_costs,
        confidence_adjustment: adjustment,
        arv_multipliers: ARV_MULTIPLIERS,
        target_roi,
        market_value: input.market_value,
        assessed_value: input.assessed_value,
        comparables_count: input.comparables_count,
        data_quality_score: input.data_quality_score,
        risk_score: input.risk_score,
        total_investment,
        net_profit,
        calculation_method: method,
    };

    let confidence_factors = calculate_confidence_factors(
        input.arv_confidence,
        input.data_quality_score,
        input.comparables_count,
    );

    tracing::debug!(
        property_id = %input.property_id,
        arv_confidence = %input.arv_confidence,
        method = method.as_str(),
        moderate_bid = bid_range.moderate,
        confidence_level,
        warnings = risk_warnings.len(),
        exceeds_max_bid,
        "bid recommendation calculated"
    );

    Ok(BidRecommendation {
        property_id: input.property_id.clone(),
        arv: input.arv,
        arv_confidence: input.arv_confidence,
        opening_bid: input.opening_bid,
        rehab_cost: input.rehab_cost,
        closing_costs: input.closing_costs,
        holding_costs: input.holding_costs,
        target_roi,
        bid_range,
        recommended_bid: bid_range.moderate,
        max_bid: bid_range.aggressive,
        exceeds_max_bid,
        confidence_level,
        confidence_factors,
        roi_projection,
        projected_profit: net_profit,
        risk_warnings,
        calculation_basis,
        recommendation_version: ALGORITHM_VERSION.to_string(),
    })
}

fn calculation_method(input: &RecommendationInput) -> CalculationMethod {
    if input
        .comparables_count
        .is_some_and(|n| n >= MIN_COMPARABLES_FOR_ARV_BASIS)
    {
        return CalculationMethod::ArvBased;
    }

    match (input.market_value, input.assessed_value) {
        (Some(_), Some(_)) => CalculationMethod::Hybrid,
        (Some(_), None) => CalculationMethod::MarketValueBased,
        (None, Some(_)) => CalculationMethod::AssessedValueBased,
        (None, None) => CalculationMethod::Hybrid,
    }
}
