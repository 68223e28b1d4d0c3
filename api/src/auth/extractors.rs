use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use axum_extra::extract::TypedHeader;
use headers::{Authorization, authorization::Bearer};

use crate::auth::{AuthUser, decode_jwt};
use crate::response::ErrorBody;
use crate::state::AppState;

/// Extracts `AuthUser` from a valid `Authorization: Bearer <jwt>` header.
///
/// # Errors
/// - `401 Unauthorized` if the header is missing, malformed, or the token is
///   invalid or expired.
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, Json<ErrorBody>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let unauthorized = || (StatusCode::UNAUTHORIZED, Json(ErrorBody::new("Unauthorized")));

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| unauthorized())?;

        let claims = decode_jwt(state, bearer.token()).map_err(|_| unauthorized())?;
        Ok(AuthUser(claims))
    }
}
