use crate::bid::SELLING_COST_RATE;
use crate::domain::recommendation::{ArvConfidence, ArvMultipliers, BidRange};

/// Fraction of ARV each tier is willing to pay before costs. The ordering
/// conservative < moderate < aggressive is what keeps the tiers ordered.
pub const ARV_MULTIPLIERS: ArvMultipliers = ArvMultipliers {
    conservative: 0.65,
    moderate: 0.70,
    aggressive: 0.75,
};

const ROUND_TO: f64 = 100.0;

/// Multiplier that discounts the ceiling when the ARV estimate is shaky.
/// Distinct from the base values in `confidence`.
pub fn confidence_adjustment(arv_confidence: ArvConfidence) -> f64 {
    match arv_confidence {
        ArvConfidence::Low => 0.90,
        ArvConfidence::Medium => 0.95,
        ArvConfidence::High => 1.0,
    }
}

/// Three-tier bid ceilings from ARV and costs.
///
/// Expects `arv > 0`, non-negative costs and `confidence_adjustment` in
/// `(0, 1]`. Each tier is floored at zero and rounded to the nearest 100.
pub fn calculate_bid_ranges(
    arv: f64,
    rehab_cost: f64,
    closing_costs: f64,
    holding_costs: f64,
    confidence_adjustment: f64,
) -> BidRange {
    let selling_costs = arv * SELLING_COST_RATE;
    let costs = rehab_cost + selling_costs + holding_costs + closing_costs;

    let tier = |multiplier: f64| round_bid(arv * multiplier * confidence_adjustment - costs);

    BidRange {
        conservative: tier(ARV_MULTIPLIERS.conservative),
        moderate: tier(ARV_MULTIPLIERS.moderate),
        aggressive: tier(ARV_MULTIPLIERS.aggressive),
    }
}

fn round_bid(raw: f64) -> f64 {
    (raw.max(0.0) / ROUND_TO).round() * ROUND_TO
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn applies_seventy_percent_rule_per_tier() {
        // costs = 30k rehab + 12k selling + 2k holding + 3k closing = 47k
        let r = calculate_bid_ranges(150_000.0, 30_000.0, 3_000.0, 2_000.0, 1.0);
        assert_eq!(r.conservative, 50_500.0);
        assert_eq!(r.moderate, 58_000.0);
        assert_eq!(r.aggressive, 65_500.0);
    }

    #[test]
    fn confidence_adjustment_discounts_every_tier() {
        let full = calculate_bid_ranges(200_000.0, 20_000.0, 2_000.0, 1_000.0, 1.0);
        let low = calculate_bid_ranges(
            200_000.0,
            20_000.0,
            2_000.0,
            1_000.0,
            confidence_adjustment(ArvConfidence::Low),
        );
        assert!(low.conservative < full.conservative);
        assert!(low.moderate < full.moderate);
        assert!(low.aggressive < full.aggressive);
        // 200k * 0.70 * 0.90 - (20k + 16k + 1k + 2k) = 87k
        assert_eq!(low.moderate, 87_000.0);
    }

    #[test]
    fn floors_negative_tiers_at_zero() {
        let r = calculate_bid_ranges(50_000.0, 60_000.0, 1_000.0, 1_000.0, 1.0);
        assert_eq!(r.conservative, 0.0);
        assert_eq!(r.moderate, 0.0);
        assert_eq!(r.aggressive, 0.0);
    }

    #[test]
    fn rounds_to_nearest_hundred() {
        // 100k * 0.70 - 8k - 12_345 = 49_655 -> 49_700
        let r = calculate_bid_ranges(100_000.0, 12_345.0, 0.0, 0.0, 1.0);
        assert_eq!(r.moderate, 49_700.0);
        // 100k * 0.65 - 8k - 12_345 = 44_655 -> 44_700
        assert_eq!(r.conservative, 44_700.0);
    }

    #[test]
    fn adjustment_table_is_monotonic() {
        assert!(
            confidence_adjustment(ArvConfidence::Low)
                < confidence_adjustment(ArvConfidence::Medium)
        );
        assert!(
            confidence_adjustment(ArvConfidence::Medium)
                < confidence_adjustment(ArvConfidence::High)
        );
        assert_eq!(confidence_adjustment(ArvConfidence::High), 1.0);
    }

    proptest! {
        #[test]
        fn prop_tiers_are_ordered_and_non_negative(
            arv in 1.0f64..5_000_000.0,
            rehab in 0.0f64..2_000_000.0,
            closing in 0.0f64..100_000.0,
            holding in 0.0f64..100_000.0,
            adjustment in 0.01f64..=1.0,
        ) {
            let r = calculate_bid_ranges(arv, rehab, closing, holding, adjustment);
            prop_assert!(r.conservative >= 0.0);
            prop_assert!(r.conservative <= r.moderate, "{:?}", r);
            prop_assert!(r.moderate <= r.aggressive, "{:?}", r);
            prop_assert_eq!(r.moderate % 100.0, 0.0);
        }
    }
}
