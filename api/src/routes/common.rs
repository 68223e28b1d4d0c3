use axum::{Json, http::StatusCode};
use db::models::attendance_record::Model as AttendanceRecord;
use sea_orm::DbErr;
use serde::Serialize;
use tracing::error;

use crate::response::ErrorBody;

/// One attendance record as listed on the admin dashboard.
#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub id: i64,
    pub student_email: String,
    pub subject: String,
    pub department: String,
    pub year: String,
    /// Milliseconds since the epoch.
    pub timestamp: i64,
}

impl From<AttendanceRecord> for RecordResponse {
    fn from(r: AttendanceRecord) -> Self {
        Self {
            timestamp: r.timestamp_millis(),
            id: r.id,
            student_email: r.student_email,
            subject: r.subject,
            department: r.department,
            year: r.year,
        }
    }
}

/// Logs a database failure and maps it to `500 {error: message}`.
pub fn internal_error(context: &str, err: DbErr) -> (StatusCode, Json<ErrorBody>) {
    error!(error = %err, "{context}");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody::new(context)))
}
