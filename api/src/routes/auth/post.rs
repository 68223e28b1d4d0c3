use axum::{Json, extract::State, http::StatusCode};
use db::models::user::{Model as User, Role};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use validator::Validate;

use crate::auth::generate_jwt;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Account email.
    #[serde(default)]
    #[validate(length(min = 1))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub password: String,
    /// Role the user is signing in as: `admin` or `student`.
    #[serde(default)]
    #[validate(length(min = 1))]
    pub role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl LoginResponse {
    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
            role: None,
            token: None,
            expires_at: None,
        }
    }
}

/// POST /auth/login
///
/// Authenticates by email and password and checks that the account holds the
/// requested role.
///
/// ### Request Body
/// ```json
/// { "username": "student@example.com", "password": "secret", "role": "student" }
/// ```
///
/// ### Responses
/// - `200 OK` with `{status: "success", message, role, token, expiresAt}`
/// - `400 Bad Request` `Missing required fields`
/// - `401 Unauthorized` `Invalid email or password`
/// - `403 Forbidden` when the account does not hold the requested role
/// - `500 Internal Server Error`
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> (StatusCode, Json<LoginResponse>) {
    if req.validate().is_err() {
        return (
            StatusCode::BAD_REQUEST,
            Json(LoginResponse::error("Missing required fields")),
        );
    }

    let user = match User::verify_credentials(state.db(), &req.username, &req.password).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!(username = %req.username, "Failed login attempt");
            return (
                StatusCode::UNAUTHORIZED,
                Json(LoginResponse::error("Invalid email or password")),
            );
        }
        Err(e) => {
            error!(error = %e, "Login lookup failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(LoginResponse::error("An error occurred during login")),
            );
        }
    };

    if req.role.parse::<Role>().ok() != Some(user.role) {
        return (
            StatusCode::FORBIDDEN,
            Json(LoginResponse::error(format!(
                "Invalid role. You are not authorized as a {}",
                req.role
            ))),
        );
    }

    let (token, expires_at) = match generate_jwt(&state, &user) {
        Ok(pair) => pair,
        Err(e) => {
            error!(error = %e, "Failed to sign JWT");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(LoginResponse::error("An error occurred during login")),
            );
        }
    };

    info!(user = user.id, role = %user.role, "Login successful");
    (
        StatusCode::OK,
        Json(LoginResponse {
            status: "success",
            message: "Login successful".into(),
            role: Some(user.role),
            token: Some(token),
            expires_at: Some(expires_at),
        }),
    )
}
