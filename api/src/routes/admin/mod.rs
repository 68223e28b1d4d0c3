//! `/api/admin` route group. Every route here sits behind `allow_admin`.

pub mod get;
pub mod post;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;
use get::{attendance_records, qr_status, recent_activity, stats};
use post::generate_qr;

/// - `POST /generate-qr` → `generate_qr`
/// - `GET /qr-status/{token}` → `qr_status`
/// - `GET /stats` → `stats`
/// - `GET /recent-activity` → `recent_activity`
/// - `GET /attendance-records` → `attendance_records`
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/generate-qr", post(generate_qr))
        .route("/qr-status/{token}", get(qr_status))
        .route("/stats", get(stats))
        .route("/recent-activity", get(recent_activity))
        .route("/attendance-records", get(attendance_records))
}
