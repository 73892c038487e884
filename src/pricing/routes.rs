//! Pricing API route handlers

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::cache::CacheStats;
use crate::error::Result;
use crate::AppState;

use super::ids::UuidIds;
use super::requests::PriceBatchRequest;
use super::responses::PriceBatchResponse;
use super::services;

/// Router for pricing endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/pricing/estimate", post(estimate))
        .route("/api/pricing/cache/stats", get(cache_stats))
        .route("/health", get(health))
}

/// Price a batch of bookings against the current catalog snapshot.
async fn estimate(
    State(state): State<AppState>,
    Json(request): Json<PriceBatchRequest>,
) -> Result<Json<PriceBatchResponse>> {
    let catalog = state.cache.catalog_snapshot(&state.catalog_store).await?;
    let batch = services::price_batch(&request, &catalog, &UuidIds);
    Ok(Json(batch.into()))
}

/// Cache statistics for monitoring
async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

async fn health() -> &'static str {
    "ok"
}
