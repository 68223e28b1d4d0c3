//! Issuer side of the QR attendance protocol.
//!
//! Sessions are short-lived and only ever exist in memory: a
//! [`SessionRegistry`] hands out opaque tokens, answers liveness queries, and a
//! background sweeper drops sessions once their validity window has elapsed.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use image::{ImageFormat, Luma};
use qrcode::QrCode;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

/// Pixel size of one QR module in the rendered PNG.
const MODULE_PIXELS: u32 = 10;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("An active QR code already exists for this class")]
    ActiveSessionExists,
    #[error("Failed to encode QR code: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("Failed to render QR image: {0}")]
    Render(#[from] image::ImageError),
}

/// The class an attendance session is issued for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub department: String,
    pub year: String,
    pub semester: Option<String>,
    pub subject: String,
}

/// One issued attendance window.
#[derive(Debug, Clone)]
pub struct AttendanceSession {
    pub token: String,
    pub key: SessionKey,
    pub created_by: i64,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    qr_png: Bytes,
}

/// Liveness of a token as reported to polling clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// Whole seconds left, rounded to nearest.
    Active { remaining_secs: u64 },
    Expired,
}

impl AttendanceSession {
    fn remaining_millis(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_milliseconds()
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.remaining_millis(now) > 0
    }

    pub fn liveness(&self, now: DateTime<Utc>) -> Liveness {
        let ms = self.remaining_millis(now);
        if ms > 0 {
            Liveness::Active {
                remaining_secs: ((ms + 500) / 1000) as u64,
            }
        } else {
            Liveness::Expired
        }
    }

    /// Validity window length in whole seconds.
    pub fn expires_in_secs(&self) -> u64 {
        (self.expires_at - self.issued_at).num_seconds().max(0) as u64
    }

    pub fn qr_png(&self) -> Bytes {
        self.qr_png.clone()
    }

    /// Path the PNG is served from.
    pub fn qr_code_url(&self) -> String {
        format!("/static/qr_codes/{}.png", self.token)
    }
}

/// Renders `payload` as a black-on-white PNG QR code.
pub fn render_qr_png(payload: &str) -> Result<Bytes, SessionError> {
    let code = QrCode::new(payload.as_bytes())?;
    let img = code
        .render::<Luma<u8>>()
        .quiet_zone(true)
        .module_dimensions(MODULE_PIXELS, MODULE_PIXELS)
        .build();

    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(Bytes::from(buf))
}

/// Thread-safe store of issued sessions.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<String, AttendanceSession>>>,
    validity: Duration,
    single_active_per_key: bool,
}

impl SessionRegistry {
    pub fn new(validity: Duration, single_active_per_key: bool) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            validity,
            single_active_per_key,
        }
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, AttendanceSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issues a new session for `key` with a fresh random token.
    pub fn issue(
        &self,
        key: SessionKey,
        created_by: i64,
        now: DateTime<Utc>,
    ) -> Result<AttendanceSession, SessionError> {
        let token = Uuid::new_v4().simple().to_string();
        let qr_png = render_qr_png(&token)?;
        let validity = chrono::Duration::from_std(self.validity)
            .unwrap_or_else(|_| chrono::Duration::seconds(15));

        let session = AttendanceSession {
            token: token.clone(),
            key,
            created_by,
            issued_at: now,
            expires_at: now + validity,
            qr_png,
        };

        let mut sessions = self.lock();
        if self.single_active_per_key
            && sessions
                .values()
                .any(|s| s.key == session.key && s.is_active(now))
        {
            return Err(SessionError::ActiveSessionExists);
        }
        sessions.insert(token, session.clone());
        drop(sessions);

        info!(
            token = %session.token,
            department = %session.key.department,
            year = %session.key.year,
            subject = %session.key.subject,
            expires_at = %session.expires_at.to_rfc3339(),
            "Issued attendance session"
        );
        Ok(session)
    }

    /// Unknown tokens report as expired; an expired session is never revived.
    pub fn liveness(&self, token: &str, now: DateTime<Utc>) -> Liveness {
        self.lock()
            .get(token)
            .map_or(Liveness::Expired, |s| s.liveness(now))
    }

    /// The session behind `token` if it is still within its window.
    pub fn active(&self, token: &str, now: DateTime<Utc>) -> Option<AttendanceSession> {
        self.lock()
            .get(token)
            .filter(|s| s.is_active(now))
            .cloned()
    }

    /// QR image of an active session.
    pub fn qr_png(&self, token: &str, now: DateTime<Utc>) -> Option<Bytes> {
        self.lock()
            .get(token)
            .filter(|s| s.is_active(now))
            .map(AttendanceSession::qr_png)
    }

    /// Most recently issued session that is still active.
    pub fn latest_active(&self, now: DateTime<Utc>) -> Option<AttendanceSession> {
        self.lock()
            .values()
            .filter(|s| s.is_active(now))
            .max_by_key(|s| s.issued_at)
            .cloned()
    }

    pub fn active_count(&self, now: DateTime<Utc>) -> usize {
        self.lock().values().filter(|s| s.is_active(now)).count()
    }

    /// Drops expired sessions; returns how many were removed.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| s.is_active(now));
        before - sessions.len()
    }

    /// Starts the background sweeper. Cancel the returned token to stop it.
    pub fn spawn_sweeper(&self, interval: Duration) -> CancellationToken {
        let cancel = CancellationToken::new();
        let registry = self.clone();
        let stop = cancel.clone();

        tokio::spawn(async move {
            info!("QR session sweeper started (interval={interval:?})");
            loop {
                tokio::select! {
                    _ = stop.cancelled() => {
                        info!("QR session sweeper stopped");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        let removed = registry.sweep(Utc::now());
                        if removed > 0 {
                            debug!("sweeper removed {removed} expired sessions");
                        }
                    }
                }
            }
        });

        cancel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn key(subject: &str) -> SessionKey {
        SessionKey {
            department: "CSE".into(),
            year: "SY".into(),
            semester: Some("SEM3".into()),
            subject: subject.into(),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 8, 10, 0, 0).unwrap()
    }

    #[test]
    fn issued_session_is_active_until_expiry() {
        let reg = SessionRegistry::new(Duration::from_secs(15), false);
        let s = reg.issue(key("Data Structures"), 1, t0()).unwrap();

        assert_eq!(s.token.len(), 32);
        assert_eq!(s.expires_in_secs(), 15);
        assert_eq!(
            reg.liveness(&s.token, t0()),
            Liveness::Active { remaining_secs: 15 }
        );
        assert_eq!(
            reg.liveness(&s.token, t0() + chrono::Duration::milliseconds(9_400)),
            Liveness::Active { remaining_secs: 6 }
        );
        assert_eq!(
            reg.liveness(&s.token, t0() + chrono::Duration::seconds(15)),
            Liveness::Expired
        );
        assert!(reg.active(&s.token, t0() + chrono::Duration::seconds(16)).is_none());
    }

    #[test]
    fn unknown_token_is_expired() {
        let reg = SessionRegistry::new(Duration::from_secs(15), false);
        assert_eq!(reg.liveness("nope", t0()), Liveness::Expired);
    }

    #[test]
    fn sweep_removes_only_expired_sessions() {
        let reg = SessionRegistry::new(Duration::from_secs(10), false);
        let old = reg.issue(key("Data Structures"), 1, t0()).unwrap();
        let fresh = reg
            .issue(key("Data Structures"), 1, t0() + chrono::Duration::seconds(8))
            .unwrap();

        let now = t0() + chrono::Duration::seconds(12);
        assert_eq!(reg.sweep(now), 1);
        assert_eq!(reg.liveness(&old.token, now), Liveness::Expired);
        assert!(matches!(reg.liveness(&fresh.token, now), Liveness::Active { .. }));
        assert_eq!(reg.active_count(now), 1);
    }

    #[test]
    fn latest_active_picks_newest() {
        let reg = SessionRegistry::new(Duration::from_secs(30), false);
        reg.issue(key("Data Structures"), 1, t0()).unwrap();
        let newer = reg
            .issue(key("Discrete Mathematics"), 1, t0() + chrono::Duration::seconds(5))
            .unwrap();

        let latest = reg.latest_active(t0() + chrono::Duration::seconds(6)).unwrap();
        assert_eq!(latest.token, newer.token);
        assert!(reg.latest_active(t0() + chrono::Duration::seconds(60)).is_none());
    }

    #[test]
    fn single_active_policy_rejects_duplicates_for_same_key() {
        let reg = SessionRegistry::new(Duration::from_secs(15), true);
        reg.issue(key("Data Structures"), 1, t0()).unwrap();

        let dup = reg.issue(key("Data Structures"), 1, t0() + chrono::Duration::seconds(1));
        assert!(matches!(dup, Err(SessionError::ActiveSessionExists)));

        // Other classes are unaffected, and the key frees up after expiry.
        reg.issue(key("Discrete Mathematics"), 1, t0()).unwrap();
        reg.issue(key("Data Structures"), 1, t0() + chrono::Duration::seconds(20))
            .unwrap();
    }

    #[test]
    fn duplicates_allowed_by_default() {
        let reg = SessionRegistry::new(Duration::from_secs(15), false);
        let a = reg.issue(key("Data Structures"), 1, t0()).unwrap();
        let b = reg.issue(key("Data Structures"), 1, t0()).unwrap();
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn qr_png_is_a_png_and_served_only_while_active() {
        let reg = SessionRegistry::new(Duration::from_secs(15), false);
        let s = reg.issue(key("Data Structures"), 1, t0()).unwrap();

        let png = reg.qr_png(&s.token, t0()).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
        assert_eq!(s.qr_code_url(), format!("/static/qr_codes/{}.png", s.token));
        assert!(reg.qr_png(&s.token, t0() + chrono::Duration::seconds(15)).is_none());
    }

    #[tokio::test]
    async fn sweeper_stops_on_cancel() {
        let reg = SessionRegistry::new(Duration::from_millis(50), false);
        reg.issue(key("Data Structures"), 1, Utc::now()).unwrap();

        let cancel = reg.spawn_sweeper(Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(reg.lock().len(), 0);
        cancel.cancel();
    }
}
