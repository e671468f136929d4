use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use taxdeed_core::bid::{
    calculate_bid_recommendation, validate_bid_recommendation_input, ValidationError,
};
use taxdeed_core::domain::recommendation::{BidRecommendation, RecommendationInput};
use taxdeed_core::storage::recommendations::{self, StoredBidRecommendation};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = taxdeed_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    // The engine routes never touch the database, so a missing or broken DB
    // only takes the storage routes down.
    let pool: Option<PgPool> = match settings.require_database_url() {
        Ok(db_url) => match sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await
        {
            Ok(pool) => match taxdeed_core::storage::migrate(&pool).await {
                Ok(()) => Some(pool),
                Err(e) => {
                    sentry_anyhow::capture_anyhow(&e);
                    tracing::error!(error = %e, "db migrations failed; starting API in degraded mode");
                    None
                }
            },
            Err(e) => {
                let err = anyhow::Error::new(e);
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %err, "db connect failed; starting API in degraded mode");
                None
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "DATABASE_URL missing; starting API in degraded mode");
            None
        }
    };

    let app = router(AppState { pool });

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/bid-recommendations/validate", post(validate_input))
        .route("/bid-recommendations/calculate", post(calculate))
        .route("/bid-recommendations", post(create_recommendation))
        .route("/bid-recommendations/:id", get(get_recommendation))
        .route(
            "/properties/:property_id/bid-recommendation",
            get(get_latest_for_property),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Clone)]
struct AppState {
    pool: Option<PgPool>,
}

#[derive(Debug, Serialize)]
struct ValidationReport {
    valid: bool,
    errors: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    errors: Vec<String>,
}

fn unprocessable(err: ValidationError) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorBody { errors: err.errors }),
    )
}

fn internal_error(err: anyhow::Error) -> StatusCode {
    sentry_anyhow::capture_anyhow(&err);
    tracing::error!(error = %err, "storage request failed");
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn validate_input(Json(input): Json<RecommendationInput>) -> Json<ValidationReport> {
    let errors = validate_bid_recommendation_input(&input);
    Json(ValidationReport {
        valid: errors.is_empty(),
        errors,
    })
}

async fn calculate(
    Json(input): Json<RecommendationInput>,
) -> Result<Json<BidRecommendation>, (StatusCode, Json<ErrorBody>)> {
    let recommendation = calculate_bid_recommendation(&input).map_err(unprocessable)?;
    Ok(Json(recommendation))
}

async fn create_recommendation(
    State(state): State<AppState>,
    Json(input): Json<RecommendationInput>,
) -> Result<(StatusCode, Json<StoredBidRecommendation>), Response> {
    let Some(pool) = &state.pool else {
        return Err(StatusCode::SERVICE_UNAVAILABLE.into_response());
    };

    let recommendation =
        calculate_bid_recommendation(&input).map_err(|e| unprocessable(e).into_response())?;

    let stored = recommendations::persist_recommendation(pool, &recommendation)
        .await
        .map_err(|e| internal_error(e).into_response())?;

    tracing::info!(
        id = %stored.id,
        property_id = %stored.property_id,
        moderate_bid = recommendation.bid_range.moderate,
        exceeds_max_bid = recommendation.exceeds_max_bid,
        highest_severity = recommendation.highest_severity().map_or("none", |s| s.as_str()),
        "stored bid recommendation"
    );

    Ok((StatusCode::CREATED, Json(stored)))
}

async fn get_recommendation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredBidRecommendation>, StatusCode> {
    let Some(pool) = &state.pool else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let id = Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;

    let stored = recommendations::fetch_by_id(pool, id)
        .await
        .map_err(internal_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(stored))
}

async fn get_latest_for_property(
    State(state): State<AppState>,
    Path(property_id): Path<String>,
) -> Result<Json<StoredBidRecommendation>, StatusCode> {
    let Some(pool) = &state.pool else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let stored = recommendations::fetch_latest_for_property(pool, &property_id)
        .await
        .map_err(internal_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(stored))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &taxdeed_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
