use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use db::models::attendance_record::{Model as AttendanceRecord, RecordFilter};
use db::models::user::{Model as User, Role};
use serde::{Deserialize, Serialize};
use serde_json::json;
use services::Liveness;

use crate::response::ErrorBody;
use crate::routes::common::{RecordResponse, internal_error};
use crate::state::AppState;

const RECENT_ACTIVITY_LIMIT: u64 = 10;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrStatusResponse {
    pub active: bool,
    pub time_remaining: u64,
    pub message: &'static str,
}

impl From<Liveness> for QrStatusResponse {
    fn from(l: Liveness) -> Self {
        match l {
            Liveness::Active { remaining_secs } => Self {
                active: true,
                time_remaining: remaining_secs,
                message: "QR code active",
            },
            Liveness::Expired => Self {
                active: false,
                time_remaining: 0,
                message: "QR code expired",
            },
        }
    }
}

/// GET /api/admin/qr-status/{token}
///
/// Liveness of an issued session. Unknown and swept tokens report as expired,
/// so pollers never see a 404.
pub async fn qr_status(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Json<QrStatusResponse> {
    Json(state.sessions().liveness(&token, Utc::now()).into())
}

/// GET /api/admin/stats
///
/// `{totalStudents, todayAttendance, activeSessions}`. "Today" starts at
/// midnight UTC.
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    let db = state.db();
    let now = Utc::now();
    let midnight = now.date_naive().and_hms_opt(0, 0, 0).map(|t| t.and_utc()).unwrap_or(now);

    let total_students = match User::count_by_role(db, Role::Student).await {
        Ok(n) => n,
        Err(e) => return internal_error("Error fetching stats", e).into_response(),
    };
    let today_attendance = match AttendanceRecord::count_since(db, midnight).await {
        Ok(n) => n,
        Err(e) => return internal_error("Error fetching stats", e).into_response(),
    };

    Json(json!({
        "totalStudents": total_students,
        "todayAttendance": today_attendance,
        "activeSessions": state.sessions().active_count(now),
    }))
    .into_response()
}

/// GET /api/admin/recent-activity
///
/// The latest attendance records across all classes.
pub async fn recent_activity(State(state): State<AppState>) -> impl IntoResponse {
    match AttendanceRecord::recent(state.db(), RECENT_ACTIVITY_LIMIT).await {
        Ok(rows) => {
            let activities: Vec<RecordResponse> = rows.into_iter().map(Into::into).collect();
            Json(json!({ "activities": activities })).into_response()
        }
        Err(e) => internal_error("Error fetching recent activity", e).into_response(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RecordsQuery {
    pub department: Option<String>,
    pub year: Option<String>,
    pub subject: Option<String>,
    /// `YYYY-MM-DD`
    pub date: Option<String>,
}

/// GET /api/admin/attendance-records?department&year&subject&date
///
/// Filtered listing, newest first. Empty filters are ignored.
///
/// ### Responses
/// - `200 OK` with `{records: [{id, student_email, subject, department, year, timestamp}]}`
/// - `400 Bad Request` if `date` is not `YYYY-MM-DD`
pub async fn attendance_records(
    State(state): State<AppState>,
    Query(q): Query<RecordsQuery>,
) -> impl IntoResponse {
    let date = match q.date.as_deref().filter(|d| !d.is_empty()) {
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(d) => Some(d),
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorBody::new("Invalid date, expected YYYY-MM-DD")),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let filter = RecordFilter {
        department: q.department,
        year: q.year,
        subject: q.subject,
        date,
    };

    match AttendanceRecord::filtered(state.db(), &filter).await {
        Ok(rows) => {
            let records: Vec<RecordResponse> = rows.into_iter().map(Into::into).collect();
            Json(json!({ "records": records })).into_response()
        }
        Err(e) => internal_error("Error fetching attendance records", e).into_response(),
    }
}
