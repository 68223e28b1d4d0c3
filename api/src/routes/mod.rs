//! HTTP route entry point.
//!
//! Route groups:
//! - `/health` → liveness probe (public)
//! - `/auth` → login (public)
//! - `/static/qr_codes/{token}.png` → QR image of an active session (public)
//! - `/get-qr-code` → latest active token (admin)
//! - `/api/admin` → session issuance, liveness, dashboards (admin)
//! - `/api/student` → redemption, personal stats and history (student)

use crate::auth::guards::{allow_admin, allow_student};
use crate::routes::{
    admin::admin_routes, auth::auth_routes, health::health_routes, qr::latest_qr_code,
    qr::qr_image, student::student_routes,
};
use crate::state::AppState;
use axum::{Router, middleware::from_fn_with_state, routing::get};

pub mod admin;
pub mod auth;
pub mod common;
pub mod health;
pub mod qr;
pub mod student;

/// Builds the complete application router with `state` applied.
///
/// Request logging needs peer addresses, so `main` layers it on top of this
/// router rather than here.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest("/auth", auth_routes())
        .route("/static/qr_codes/{file}", get(qr_image))
        .route(
            "/get-qr-code",
            get(latest_qr_code).route_layer(from_fn_with_state(state.clone(), allow_admin)),
        )
        .nest(
            "/api/admin",
            admin_routes().route_layer(from_fn_with_state(state.clone(), allow_admin)),
        )
        .nest(
            "/api/student",
            student_routes().route_layer(from_fn_with_state(state.clone(), allow_student)),
        )
        .with_state(state)
}
