use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Whether all bundled migrations have been applied.
    pub schema_current: bool,
}

/// GET /health -- returns service, database and schema health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = surveyor_db::health_check(&state.pool).await.is_ok();
    let schema_current = match surveyor_db::schema_up_to_date(&state.pool).await {
        Ok(current) => current,
        Err(e) => {
            tracing::warn!(error = %e, "Could not read migration history");
            false
        }
    };

    let status = if db_healthy && schema_current {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        schema_current,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
