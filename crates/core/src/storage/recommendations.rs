use crate::domain::recommendation::BidRecommendation;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recommendation as stored: the engine output plus the identifiers and
/// timestamps storage owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredBidRecommendation {
    pub id: Uuid,
    pub property_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub recommendation: BidRecommendation,
}

impl StoredBidRecommendation {
    pub fn new(recommendation: BidRecommendation, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            property_id: recommendation.property_id.clone(),
            created_at: now,
            updated_at: now,
            recommendation,
        }
    }
}

type StoredRow = (Uuid, String, DateTime<Utc>, DateTime<Utc>, serde_json::Value);

pub async fn persist_recommendation(
    pool: &sqlx::PgPool,
    recommendation: &BidRecommendation,
) -> anyhow::Result<StoredBidRecommendation> {
    let stored = StoredBidRecommendation::new(recommendation.clone(), Utc::now());
    let body = serde_json::to_value(&stored.recommendation)
        .context("serialize bid recommendation failed")?;

    sqlx::query(
        "INSERT INTO bid_recommendations \
         (id, property_id, recommendation_version, conservative_bid, moderate_bid, aggressive_bid, \
          confidence_level, roi_projection, exceeds_max_bid, recommendation, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .persistent(false)
    .bind(stored.id)
    .bind(&stored.property_id)
    .bind(&recommendation.recommendation_version)
    .bind(recommendation.bid_range.conservative)
    .bind(recommendation.bid_range.moderate)
    .bind(recommendation.bid_range.aggressive)
    .bind(recommendation.confidence_level)
    .bind(recommendation.roi_projection)
    .bind(recommendation.exceeds_max_bid)
    .bind(body)
    .bind(stored.created_at)
    .bind(stored.updated_at)
    .execute(pool)
    .await
    .context("insert bid_recommendations failed")?;

    tracing::debug!(
        id = %stored.id,
        property_id = %stored.property_id,
        "persisted bid recommendation"
    );

    Ok(stored)
}

pub async fn fetch_by_id(
    pool: &sqlx::PgPool,
    id: Uuid,
) -> anyhow::Result<Option<StoredBidRecommendation>> {
    let row = sqlx::query_as::<_, StoredRow>(
        "SELECT id, property_id, created_at, updated_at, recommendation \
         FROM bid_recommendations \
         WHERE id = $1",
    )
    .persistent(false)
    .bind(id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("select bid_recommendations failed (id={id})"))?;

    row.map(from_row).transpose()
}

pub async fn fetch_latest_for_property(
    pool: &sqlx::PgPool,
    property_id: &str,
) -> anyhow::Result<Option<StoredBidRecommendation>> {
    let row = sqlx::query_as::<_, StoredRow>(
        "SELECT id, property_id, created_at, updated_at, recommendation \
         FROM bid_recommendations \
         WHERE property_id = $1 \
         ORDER BY created_at DESC \
         LIMIT 1",
    )
    .persistent(false)
    .bind(property_id)
    .fetch_optional(pool)
    .await
    .with_context(|| {
        format!("select latest bid_recommendations failed (property_id={property_id})")
    })?;

    row.map(from_row).transpose()
}

fn from_row(row: StoredRow) -> anyhow::Result<StoredBidRecommendation> {
    let (id, property_id, created_at, updated_at, body) = row;
    let recommendation = serde_json::from_value::<BidRecommendation>(body)
        .with_context(|| format!("invalid recommendation JSON in DB for id={id}"))?;
    Ok(StoredBidRecommendation {
        id,
        property_id,
        created_at,
        updated_at,
        recommendation,
    })
}
