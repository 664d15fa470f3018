/*
 * Responsibility
 * - GET /health: liveness, no dependencies
 * - GET /health/ready: can we check out a db session right now
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::db::DbSession;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

pub async fn ready(mut session: DbSession) -> impl IntoResponse {
    match session.connection().await {
        Ok(_) => (StatusCode::OK, Json(json!({"status": "ok", "database": "up"}))),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "unavailable", "database": "down"})),
            )
        }
    }
}
