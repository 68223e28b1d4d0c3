use axum::{Extension, Json, extract::State, response::IntoResponse};
use db::models::attendance_record::Model as AttendanceRecord;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

use crate::auth::AuthUser;
use crate::routes::common::internal_error;
use crate::state::AppState;

const HISTORY_LIMIT: u64 = 10;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentStats {
    /// Distinct subjects attended at least once.
    pub total_classes: usize,
    pub classes_attended: u64,
    pub subject_wise: BTreeMap<String, u64>,
}

impl From<BTreeMap<String, u64>> for StudentStats {
    fn from(subject_wise: BTreeMap<String, u64>) -> Self {
        Self {
            total_classes: subject_wise.len(),
            classes_attended: subject_wise.values().sum(),
            subject_wise,
        }
    }
}

/// GET /api/student/stats
pub async fn stats(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> impl IntoResponse {
    match AttendanceRecord::subject_counts_for_student(state.db(), claims.sub).await {
        Ok(counts) => Json(StudentStats::from(counts)).into_response(),
        Err(e) => internal_error("Error fetching stats", e).into_response(),
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub subject: String,
    pub department: String,
    pub year: String,
    pub timestamp: i64,
}

/// GET /api/student/attendance-history
///
/// The caller's ten most recent records, newest first.
pub async fn attendance_history(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> impl IntoResponse {
    match AttendanceRecord::history_for_student(state.db(), claims.sub, HISTORY_LIMIT).await {
        Ok(rows) => {
            let history: Vec<HistoryEntry> = rows
                .into_iter()
                .map(|r| HistoryEntry {
                    timestamp: r.timestamp_millis(),
                    subject: r.subject,
                    department: r.department,
                    year: r.year,
                })
                .collect();
            Json(json!({ "history": history })).into_response()
        }
        Err(e) => internal_error("Error fetching attendance history", e).into_response(),
    }
}
