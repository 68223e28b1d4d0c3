use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;
use db::models::attendance_record::{MarkError, Model as AttendanceRecord, NewRecord};
use db::models::user;
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceRequest {
    #[serde(default)]
    pub qr_data: String,
}

#[derive(Debug, Serialize)]
pub struct MarkedDetails {
    pub subject: String,
    pub department: String,
    pub year: String,
}

type MarkResponse = (StatusCode, Json<ApiResponse<MarkedDetails>>);

fn fail(status: StatusCode, message: impl Into<String>) -> MarkResponse {
    (status, Json(ApiResponse::error(message)))
}

/// POST /api/student/mark-attendance
///
/// Redeems a scanned session token for the calling student.
///
/// ### Request Body
/// ```json
/// { "qrData": "5f0c..." }
/// ```
///
/// ### Responses
/// - `200 OK` `{success: true, message, details: {subject, department, year}}`
/// - `400 Bad Request` `Invalid QR code data` / `Invalid or expired QR code` /
///   `Attendance already marked`
/// - `403 Forbidden` when the student's enrollment does not match the class
/// - `500 Internal Server Error` `Error marking attendance`
pub async fn mark_attendance(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<MarkAttendanceRequest>,
) -> MarkResponse {
    let token = req.qr_data.as_str();
    if token.is_empty() {
        return fail(StatusCode::BAD_REQUEST, "Invalid QR code data");
    }

    let now = Utc::now();
    let Some(session) = state.sessions().active(token, now) else {
        return fail(StatusCode::BAD_REQUEST, "Invalid or expired QR code");
    };

    let db = state.db();
    let student = match user::Entity::find_by_id(claims.sub).one(db).await {
        Ok(Some(u)) => u,
        Ok(None) => return fail(StatusCode::UNAUTHORIZED, "Unauthorized"),
        Err(e) => {
            error!(error = %e, "Failed to load student");
            return fail(StatusCode::INTERNAL_SERVER_ERROR, "Error marking attendance");
        }
    };

    let key = &session.key;
    if !student.is_enrolled_in(&key.department, &key.year) {
        return fail(
            StatusCode::FORBIDDEN,
            format!("You are not enrolled in {} {}", key.department, key.year),
        );
    }

    let new = NewRecord {
        student_id: student.id,
        student_email: &student.email,
        session_token: &session.token,
        subject: &key.subject,
        department: &key.department,
        year: &key.year,
        semester: key.semester.as_deref(),
    };

    match AttendanceRecord::mark(db, new, now).await {
        Ok(rec) => {
            info!(student = student.id, token = %session.token, "Attendance marked");
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    MarkedDetails {
                        subject: rec.subject,
                        department: rec.department,
                        year: rec.year,
                    },
                    "Attendance marked successfully",
                )),
            )
        }
        Err(MarkError::AlreadyMarked) => {
            fail(StatusCode::BAD_REQUEST, MarkError::AlreadyMarked.to_string())
        }
        Err(MarkError::Db(e)) => {
            error!(error = %e, "Failed to mark attendance");
            fail(StatusCode::INTERNAL_SERVER_ERROR, "Error marking attendance")
        }
    }
}
