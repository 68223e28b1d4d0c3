//! Public QR image route and the latest-token lookup.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;

use crate::response::ErrorBody;
use crate::state::AppState;

/// GET /static/qr_codes/{token}.png
///
/// Serves the PNG of an active session. Expired or unknown tokens get 404.
pub async fn qr_image(State(state): State<AppState>, Path(file): Path<String>) -> impl IntoResponse {
    let Some(token) = file.strip_suffix(".png") else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match state.sessions().qr_png(token, Utc::now()) {
        Some(png) => (
            [
                (header::CONTENT_TYPE, "image/png"),
                (header::CACHE_CONTROL, "no-store"),
            ],
            png,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// GET /get-qr-code
///
/// Token of the most recently issued session that is still active.
///
/// ### Responses
/// - `200 OK` `{ "qr_data": "..." }`
/// - `404 Not Found` `{ "error": "No active QR code" }`
pub async fn latest_qr_code(State(state): State<AppState>) -> impl IntoResponse {
    match state.sessions().latest_active(Utc::now()) {
        Some(session) => Json(json!({ "qr_data": session.token })).into_response(),
        None => (StatusCode::NOT_FOUND, Json(ErrorBody::new("No active QR code"))).into_response(),
    }
}
