use axum::response::IntoResponse;
use axum::Json;

/// `GET /health` -- liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
