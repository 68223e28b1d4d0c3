//! `/api/student` route group. Every route here sits behind `allow_student`.

pub mod get;
pub mod post;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;
use get::{attendance_history, stats};
use post::mark_attendance;

/// - `POST /mark-attendance` → `mark_attendance`
/// - `GET /stats` → `stats`
/// - `GET /attendance-history` → `attendance_history`
pub fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/mark-attendance", post(mark_attendance))
        .route("/stats", get(stats))
        .route("/attendance-history", get(attendance_history))
}
