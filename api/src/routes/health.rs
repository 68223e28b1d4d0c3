use axum::{Json, Router, response::IntoResponse, routing::get};
use serde_json::json;

use crate::state::AppState;

/// Builds the `/health` route group.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// GET /health
///
/// ### Response
/// - `200 OK` with `{ "status": "ok" }`
async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
