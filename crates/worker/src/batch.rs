use anyhow::Context;
use taxdeed_core::bid::calculate_bid_recommendation;
use taxdeed_core::domain::recommendation::{BidRecommendation, RecommendationInput};

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Upper bound on entries accepted from one input file (1..=100_000).
    pub max_inputs: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { max_inputs: 5000 }
    }
}

impl BatchOptions {
    pub fn from_env() -> anyhow::Result<Self> {
        let mut out = Self::default();

        if let Ok(s) = std::env::var("BID_BATCH_MAX_INPUTS") {
            out.max_inputs = s
                .trim()
                .parse::<usize>()
                .with_context(|| format!("BID_BATCH_MAX_INPUTS is not a number: {s}"))?;
        }

        anyhow::ensure!(
            (1..=100_000).contains(&out.max_inputs),
            "BID_BATCH_MAX_INPUTS must be 1..=100000 (got {})",
            out.max_inputs
        );
        Ok(out)
    }
}

#[derive(Debug, Clone)]
pub struct InvalidEntry {
    pub index: usize,
    pub property_id: String,
    pub errors: Vec<String>,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub recommendations: Vec<BidRecommendation>,
    pub invalid: Vec<InvalidEntry>,
}

impl BatchOutcome {
    pub fn exceeded_max_bid(&self) -> usize {
        self.recommendations
            .iter()
            .filter(|r| r.exceeds_max_bid)
            .count()
    }

    pub fn ensure_all_valid(&self) -> anyhow::Result<()> {
        if self.invalid.is_empty() {
            return Ok(());
        }
        let lines: Vec<String> = self
            .invalid
            .iter()
            .map(|e| format!("#{} ({}): {}", e.index, e.property_id, e.errors.join("; ")))
            .collect();
        anyhow::bail!(
            "{} invalid input(s):\n{}",
            self.invalid.len(),
            lines.join("\n")
        )
    }
}

pub fn parse_inputs(text: &str, opts: &BatchOptions) -> anyhow::Result<Vec<RecommendationInput>> {
    let inputs = serde_json::from_str::<Vec<RecommendationInput>>(text)
        .context("input must be a JSON array of recommendation inputs")?;

    anyhow::ensure!(!inputs.is_empty(), "input must contain at least one entry");
    anyhow::ensure!(
        inputs.len() <= opts.max_inputs,
        "input has {} entries; limit is {}",
        inputs.len(),
        opts.max_inputs
    );

    Ok(inputs)
}

pub fn evaluate_batch(inputs: &[RecommendationInput]) -> BatchOutcome {
    let mut out = BatchOutcome::default();

    for (index, input) in inputs.iter().enumerate() {
        match calculate_bid_recommendation(input) {
            Ok(rec) => out.recommendations.push(rec),
            Err(err) => {
                tracing::warn!(
                    index,
                    property_id = %input.property_id,
                    errors = ?err.errors,
                    "skipping invalid input"
                );
                out.invalid.push(InvalidEntry {
                    index,
                    property_id: input.property_id.clone(),
                    errors: err.errors,
                });
            }
        }
    }

    out
}
