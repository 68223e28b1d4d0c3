//! Application state shared across axum handlers.

use common::config::AppConfig;
use jsonwebtoken::{DecodingKey, EncodingKey};
use sea_orm::DatabaseConnection;
use services::SessionRegistry;
use std::sync::Arc;

/// Central application state: database, in-memory QR sessions, config and
/// the JWT keys derived from it. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    sessions: SessionRegistry,
    config: Arc<AppConfig>,
    jwt_encoding_key: EncodingKey,
    jwt_decoding_key: DecodingKey,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        let sessions =
            SessionRegistry::new(config.qr_code_expiry(), config.qr_single_active_per_key);
        let secret = config.jwt_secret.as_bytes();

        Self {
            db,
            sessions,
            jwt_encoding_key: EncodingKey::from_secret(secret),
            jwt_decoding_key: DecodingKey::from_secret(secret),
            config: Arc::new(config),
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.jwt_encoding_key
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.jwt_decoding_key
    }

    pub fn jwt_duration_minutes(&self) -> i64 {
        self.config.jwt_duration_minutes as i64
    }
}
