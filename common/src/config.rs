//! Server configuration loaded from `.env` and environment variables.
//!
//! The binary builds one `AppConfig` at startup and hands it to the
//! application state; tests construct it directly with [`AppConfig::for_tests`].

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Complete runtime configuration of the attendance API.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_duration_minutes: u64,
    /// Validity window of a freshly issued QR code.
    pub qr_code_expiry_seconds: u64,
    /// How often the issuer sweeps expired sessions out of memory.
    pub qr_sweep_interval_ms: u64,
    /// Reject issuance while another session for the same class is active.
    pub qr_single_active_per_key: bool,
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{key} has an invalid value: {raw}")),
        Err(_) => default,
    }
}

fn flag(key: &str) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// # Panics
    /// Panics if `JWT_SECRET` is missing or a numeric variable does not parse.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "attendmax".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "api=info,services=info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "api.log".into()),
            log_to_stdout: flag("LOG_TO_STDOUT"),
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/attendance.db".into()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: parsed("PORT", 5000),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET is required"),
            jwt_duration_minutes: parsed("JWT_DURATION_MINUTES", 60),
            qr_code_expiry_seconds: parsed("QR_CODE_EXPIRY_SECONDS", 15),
            qr_sweep_interval_ms: parsed("QR_SWEEP_INTERVAL_MS", 1000),
            qr_single_active_per_key: flag("QR_SINGLE_ACTIVE_PER_KEY"),
        }
    }

    /// Configuration for in-process tests: in-memory database, fixed secret.
    pub fn for_tests() -> Self {
        Self {
            env: "test".into(),
            project_name: "attendmax-test".into(),
            log_level: "api=debug".into(),
            log_file: "api-test.log".into(),
            log_to_stdout: false,
            database_path: "sqlite::memory:".into(),
            host: "127.0.0.1".into(),
            port: 0,
            jwt_secret: "test-secret".into(),
            jwt_duration_minutes: 60,
            qr_code_expiry_seconds: 15,
            qr_sweep_interval_ms: 1000,
            qr_single_active_per_key: false,
        }
    }

    pub fn qr_code_expiry(&self) -> Duration {
        Duration::from_secs(self.qr_code_expiry_seconds)
    }

    pub fn qr_sweep_interval(&self) -> Duration {
        Duration::from_millis(self.qr_sweep_interval_ms.max(1))
    }

    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}
