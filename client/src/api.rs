//! Typed HTTP calls against the attendance API.

use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use std::collections::BTreeMap;

use crate::error::{ClientError, Failure};
use crate::session::IssueRequest;

/// Issuer response to a successful generate request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedSession {
    /// The session token encoded in the QR image.
    pub qr_data: String,
    pub qr_code_url: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrStatus {
    pub active: bool,
    #[serde(default)]
    pub time_remaining: u64,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RedemptionDetails {
    pub subject: String,
    pub department: String,
    pub year: String,
}

/// A successful redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redemption {
    pub message: String,
    pub details: Option<RedemptionDetails>,
}

#[derive(Debug, Deserialize)]
struct MarkResponse {
    success: bool,
    message: String,
    #[serde(default)]
    details: Option<RedemptionDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_students: u64,
    pub today_attendance: u64,
    pub active_sessions: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub student_email: String,
    pub subject: String,
    pub department: String,
    pub year: String,
    /// Milliseconds since the epoch.
    pub timestamp: i64,
}

/// Filters for [`ApiClient::attendance_records`]; `None` fields are not sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentStats {
    pub total_classes: u64,
    pub classes_attended: u64,
    pub subject_wise: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    pub subject: String,
    pub department: String,
    pub year: String,
    pub timestamp: i64,
}

#[derive(Deserialize)]
struct Records {
    records: Vec<AttendanceRecord>,
}

#[derive(Deserialize)]
struct Activities {
    activities: Vec<AttendanceRecord>,
}

#[derive(Deserialize)]
struct History {
    history: Vec<HistoryEntry>,
}

/// A 2xx body is either the expected payload or a failure the server chose
/// to answer with a success status.
#[derive(Deserialize)]
#[serde(untagged)]
enum Reply<T> {
    Failed(Failure),
    Ok(T),
}

/// Reads a JSON body on success, classifies the failure body otherwise.
async fn read<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return match resp.json::<Reply<T>>().await? {
            Reply::Ok(value) => Ok(value),
            Reply::Failed(Failure(message)) => Err(ClientError::Domain(message)),
        };
    }
    let body = resp.bytes().await?;
    Err(ClientError::from_failure(status.as_u16(), &body))
}

/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token: None,
        }
    }

    /// Same client, authenticated with an existing bearer token.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(t) => builder.bearer_auth(t),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self.authed(self.http.get(self.url(path))).send().await?;
        read(resp).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self
            .authed(self.http.post(self.url(path)))
            .json(body)
            .send()
            .await?;
        read(resp).await
    }

    /// Signs in and returns a client carrying the issued token.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        role: &str,
    ) -> Result<ApiClient, ClientError> {
        if username.is_empty() || password.is_empty() || role.is_empty() {
            return Err(ClientError::Validation("Missing required fields".into()));
        }
        let body = json!({ "username": username, "password": password, "role": role });
        let login: LoginResponse = self.post("/auth/login", &body).await?;
        Ok(self.with_token(login.token))
    }

    /// Validates `req` locally, then asks the issuer for a new session.
    pub async fn generate_qr(&self, req: &IssueRequest) -> Result<IssuedSession, ClientError> {
        req.validate()?;
        self.post("/api/admin/generate-qr", req).await
    }

    pub async fn qr_status(&self, token: &str) -> Result<QrStatus, ClientError> {
        self.get(&format!("/api/admin/qr-status/{token}")).await
    }

    /// Submits an already normalised token. `{success: false}` bodies become
    /// [`ClientError::Domain`] whatever the HTTP status.
    pub async fn mark_attendance(&self, token: &str) -> Result<Redemption, ClientError> {
        let resp: MarkResponse = self
            .post("/api/student/mark-attendance", &json!({ "qrData": token }))
            .await?;
        if !resp.success {
            return Err(ClientError::Domain(resp.message));
        }
        Ok(Redemption {
            message: resp.message,
            details: resp.details,
        })
    }

    pub async fn admin_stats(&self) -> Result<AdminStats, ClientError> {
        self.get("/api/admin/stats").await
    }

    pub async fn recent_activity(&self) -> Result<Vec<AttendanceRecord>, ClientError> {
        let a: Activities = self.get("/api/admin/recent-activity").await?;
        Ok(a.activities)
    }

    pub async fn attendance_records(
        &self,
        query: &RecordQuery,
    ) -> Result<Vec<AttendanceRecord>, ClientError> {
        let resp = self
            .authed(self.http.get(self.url("/api/admin/attendance-records")))
            .query(query)
            .send()
            .await?;
        let r: Records = read(resp).await?;
        Ok(r.records)
    }

    pub async fn student_stats(&self) -> Result<StudentStats, ClientError> {
        self.get("/api/student/stats").await
    }

    pub async fn attendance_history(&self) -> Result<Vec<HistoryEntry>, ClientError> {
        let h: History = self.get("/api/student/attendance-history").await?;
        Ok(h.history)
    }
}
