use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use common::{catalog, format_validation_errors};
use serde::{Deserialize, Serialize};
use services::{SessionError, SessionKey};
use tracing::error;
use validator::Validate;

use crate::auth::AuthUser;
use crate::response::ErrorBody;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateQrRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "department is required"))]
    pub department: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "year is required"))]
    pub year: String,
    /// Older clients do not send a semester.
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "subject is required"))]
    pub subject: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQrResponse {
    pub qr_data: String,
    pub qr_code_url: String,
    pub expires_in: u64,
}

/// POST /api/admin/generate-qr
///
/// Issues a new attendance session for a class and returns its token.
///
/// ### Request Body
/// ```json
/// { "department": "CSE", "year": "SY", "semester": "SEM3", "subject": "Data Structures" }
/// ```
///
/// ### Responses
/// - `200 OK` with `{qrData, qrCodeUrl, expiresIn}`
/// - `400 Bad Request` for a missing field or a class not in the catalog
/// - `429 Too Many Requests` when single-active issuance is enabled and the
///   class already has a live session
/// - `500 Internal Server Error` if the QR image cannot be rendered
pub async fn generate_qr(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<GenerateQrRequest>,
) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new(format_validation_errors(&e))),
        )
            .into_response();
    }

    let semester = req.semester.filter(|s| !s.is_empty());
    if let Err(e) = catalog::check(&req.department, &req.year, semester.as_deref(), &req.subject) {
        return (StatusCode::BAD_REQUEST, Json(ErrorBody::new(e.to_string()))).into_response();
    }

    let key = SessionKey {
        department: req.department,
        year: req.year,
        semester,
        subject: req.subject,
    };

    match state.sessions().issue(key, claims.sub, Utc::now()) {
        Ok(session) => (
            StatusCode::OK,
            Json(GenerateQrResponse {
                qr_code_url: session.qr_code_url(),
                expires_in: session.expires_in_secs(),
                qr_data: session.token,
            }),
        )
            .into_response(),
        Err(e @ SessionError::ActiveSessionExists) => {
            (StatusCode::TOO_MANY_REQUESTS, Json(ErrorBody::new(e.to_string()))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to issue attendance session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Failed to generate QR code")),
            )
                .into_response()
        }
    }
}
