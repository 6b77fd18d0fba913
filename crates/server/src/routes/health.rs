use axum::{extract::State, response::Json as ResponseJson};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check(State(state): State<AppState>) -> ResponseJson<HealthResponse> {
    // A cheap query keeps the health check honest about pool availability.
    let status = match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(state.pool())
        .await
    {
        Ok(_) => "healthy",
        Err(_) => "degraded",
    };

    ResponseJson(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
    })
}
