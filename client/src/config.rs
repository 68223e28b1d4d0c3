//! Client configuration from `.env` and environment variables.

use std::env;
use std::time::Duration;

use crate::poller::ExpiryPolicy;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the attendance API, without a trailing slash.
    pub backend_url: String,
    pub poll_interval: Duration,
    /// Remaining seconds at or below which a session is flagged as expiring soon.
    pub expiring_soon_secs: u64,
    pub expiry_policy: ExpiryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:5000".into(),
            poll_interval: Duration::from_secs(1),
            expiring_soon_secs: 5,
            expiry_policy: ExpiryPolicy::Stop,
        }
    }
}

impl ClientConfig {
    /// Reads `BACKEND_URL`, `POLL_INTERVAL_MS`, `EXPIRING_SOON_SECONDS` and
    /// `AUTO_REGENERATE_QR`. Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let backend_url = env::var("BACKEND_URL")
            .map(|u| u.trim_end_matches('/').to_owned())
            .unwrap_or(defaults.backend_url);
        let poll_interval = env::var("POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval);
        let expiring_soon_secs = env::var("EXPIRING_SOON_SECONDS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.expiring_soon_secs);
        let expiry_policy = match env::var("AUTO_REGENERATE_QR") {
            Ok(v) if matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes") => {
                ExpiryPolicy::Regenerate
            }
            _ => ExpiryPolicy::Stop,
        };

        Self {
            backend_url,
            poll_interval,
            expiring_soon_secs,
            expiry_policy,
        }
    }
}
