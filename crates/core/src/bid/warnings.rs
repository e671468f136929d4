use crate::bid::format_currency;
use crate::domain::recommendation::{BidRange, RiskSeverity, RiskWarning, RiskWarningType};

/// Spread between conservative and aggressive, relative to conservative,
/// below which the tiers stop being meaningfully different.
const NARROW_RANGE_RATIO: f64 = 0.10;

/// Rehab cost as a share of ARV above which the deal is rehab-heavy.
const HIGH_REHAB_RATIO: f64 = 0.40;

/// Risk scores run 0..=25 with higher meaning safer.
const RISK_SCORE_WARN_BELOW: f64 = 12.0;
const RISK_SCORE_HIGH_BELOW: f64 = 8.0;
const RISK_SCORE_CRITICAL_BELOW: f64 = 5.0;

/// A conservative ceiling this small usually means bad inputs.
const MIN_PLAUSIBLE_CONSERVATIVE_BID: f64 = 1_000.0;

/// Rule-based warnings for a computed bid range.
///
/// Every rule is evaluated independently and none suppresses another. Rules
/// that need `opening_bid` or `risk_score` are skipped when those are absent.
/// Output order is fixed: exceeds-max, thin margin, narrow range, high rehab,
/// risk score, data quality.
pub fn generate_risk_warnings(
    bid_range: &BidRange,
    opening_bid: Option<f64>,
    arv: f64,
    rehab_cost: f64,
    risk_score: Option<f64>,
) -> Vec<RiskWarning> {
    let mut warnings = Vec::new();

    if let Some(opening_bid) = opening_bid {
        if opening_bid > bid_range.aggressive {
            let excess = opening_bid - bid_range.aggressive;
            let message = if bid_range.aggressive > 0.0 {
                let pct = excess / bid_range.aggressive * 100.0;
                format!(
                    "Opening bid {} exceeds the maximum recommended bid {} by {} ({pct:.1}%)",
                    format_currency(opening_bid),
                    format_currency(bid_range.aggressive),
                    format_currency(excess),
                )
            } else {
                format!(
                    "Opening bid {} exceeds the maximum recommended bid {} by {}",
                    format_currency(opening_bid),
                    format_currency(bid_range.aggressive),
                    format_currency(excess),
                )
            };
            warnings.push(RiskWarning {
                warning_type: RiskWarningType::OpeningBidExceedsMax,
                severity: RiskSeverity::Critical,
                message,
            });
        } else if opening_bid > bid_range.moderate {
            warnings.push(RiskWarning {
                warning_type: RiskWarningType::ThinMargin,
                severity: RiskSeverity::Medium,
                message: format!(
                    "Opening bid {} is above the moderate bid {}; only the aggressive strategy clears it",
                    format_currency(opening_bid),
                    format_currency(bid_range.moderate),
                ),
            });
        }
    }

    if bid_range.conservative > 0.0 {
        let spread = (bid_range.aggressive - bid_range.conservative) / bid_range.conservative;
        if spread < NARROW_RANGE_RATIO {
            warnings.push(RiskWarning {
                warning_type: RiskWarningType::NarrowBidRange,
                severity: RiskSeverity::Medium,
                message: format!(
                    "Bid range is narrow ({:.1}% spread between conservative and aggressive)",
                    spread * 100.0
                ),
            });
        }
    }

    if arv > 0.0 {
        let rehab_ratio = rehab_cost / arv;
        if rehab_ratio > HIGH_REHAB_RATIO {
            warnings.push(RiskWarning {
                warning_type: RiskWarningType::HighRehabCost,
                severity: RiskSeverity::High,
                message: format!(
                    "Rehab cost {} is {:.0}% of ARV; estimates this large carry significant overrun risk",
                    format_currency(rehab_cost),
                    rehab_ratio * 100.0
                ),
            });
        }
    }

    if let Some(score) = risk_score.filter(|s| *s < RISK_SCORE_WARN_BELOW) {
        let severity = if score < RISK_SCORE_CRITICAL_BELOW {
            RiskSeverity::Critical
        } else if score < RISK_SCORE_HIGH_BELOW {
            RiskSeverity::High
        } else {
            RiskSeverity::Medium
        };
        warnings.push(RiskWarning {
            warning_type: RiskWarningType::HighRiskProperty,
            severity,
            message: format!(
                "Property risk score is {score:.1}/25; review title, environmental and location risks"
            ),
        });
    }

    if bid_range.conservative < MIN_PLAUSIBLE_CONSERVATIVE_BID {
        warnings.push(RiskWarning {
            warning_type: RiskWarningType::DataQuality,
            severity: RiskSeverity::High,
            message: format!(
                "Conservative bid {} is implausibly low; verify ARV and cost inputs",
                format_currency(bid_range.conservative)
            ),
        });
    }

    warnings
}
