//! System endpoints: health check and pricing info.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Current pricing.
#[derive(Debug, Serialize, ToSchema)]
struct PricingResponse {
    rate_per_second: i64,
    currency_unit: &'static str,
}

/// `GET /config/pricing` — Current metering rate.
#[utoipa::path(
    get,
    path = "/config/pricing",
    tag = "System",
    summary = "Get the metering rate",
    description = "Returns the cost of one second of playback in smallest currency units.",
    responses(
        (status = 200, description = "Current pricing", body = PricingResponse),
    )
)]
pub async fn pricing_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(PricingResponse {
            rate_per_second: state.rate_per_second,
            currency_unit: "IDR",
        }),
    )
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/pricing", get(pricing_handler))
}
