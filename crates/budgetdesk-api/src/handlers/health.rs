//! Health check handler.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use budgetdesk_core::traits::CacheProvider;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = match state.cache.health_check().await {
        Ok(true) => "connected",
        Ok(false) => "unavailable",
        Err(e) => {
            warn!(error = %e, "Cache health check failed");
            "unavailable"
        }
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        cache: cache.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
