//! Bid recommendation engine.
//!
//! Pure, synchronous arithmetic over a handful of scalars. Nothing here does
//! I/O or holds state, so callers can fan recommendations out across threads
//! freely.

use num_format::{Locale, ToFormattedString};

pub mod confidence;
pub mod engine;
pub mod ranges;
pub mod validation;
pub mod warnings;

pub use confidence::{calculate_confidence_factors, calculate_confidence_level};
pub use engine::calculate_bid_recommendation;
pub use ranges::calculate_bid_ranges;
pub use validation::{validate_bid_recommendation_input, ValidationError};
pub use warnings::generate_risk_warnings;

/// Stamped on every recommendation so stored rows can be told apart when the
/// model changes.
pub const ALGORITHM_VERSION: &str = "1.0.0";

/// Selling costs (commission, transfer, staging) as a fraction of ARV.
pub const SELLING_COST_RATE: f64 = 0.08;

pub(crate) fn format_currency(amount: f64) -> String {
    // `as` saturates on out-of-range amounts.
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_formatted_string(&Locale::en);

    if rounded < 0 {
        format!("-${digits}")
    } else {
        format!("${digits}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_currency_with_thousands_separators() {
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(999.0), "$999");
        assert_eq!(format_currency(1000.0), "$1,000");
        assert_eq!(format_currency(54500.4), "$54,500");
        assert_eq!(format_currency(1234567.0), "$1,234,567");
        assert_eq!(format_currency(-2500.0), "-$2,500");
        assert_eq!(format_currency(-0.4), "$0");
    }
}
