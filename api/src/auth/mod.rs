pub mod claims;
pub mod extractors;
pub mod guards;
pub mod middleware;

pub use claims::{AuthUser, Claims};

use crate::state::AppState;
use chrono::{Duration, Utc};
use db::models::user::Model as User;
use jsonwebtoken::{Algorithm, Header, Validation, decode, encode};

/// Issues a JWT for `user`; returns the token and its RFC 3339 expiry.
pub fn generate_jwt(
    state: &AppState,
    user: &User,
) -> Result<(String, String), jsonwebtoken::errors::Error> {
    let expiry = Utc::now() + Duration::minutes(state.jwt_duration_minutes());

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        exp: expiry.timestamp() as usize,
    };

    let token = encode(&Header::default(), &claims, state.encoding_key())?;
    Ok((token, expiry.to_rfc3339()))
}

/// Verifies signature and expiry of a bearer token.
pub fn decode_jwt(state: &AppState, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(token, state.decoding_key(), &Validation::new(Algorithm::HS256))
        .map(|data| data.claims)
}
