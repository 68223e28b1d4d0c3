use axum::{
    Json,
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use db::models::user::Role;

use crate::auth::AuthUser;
use crate::response::ErrorBody;
use crate::state::AppState;

type GuardRejection = (StatusCode, Json<ErrorBody>);

/// Authenticates the request and stores the `AuthUser` in its extensions.
async fn extract_and_insert_authuser(
    state: &AppState,
    req: Request<Body>,
) -> Result<(Request<Body>, AuthUser), GuardRejection> {
    let (mut parts, body) = req.into_parts();
    let user = AuthUser::from_request_parts(&mut parts, state).await?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(user.clone());
    Ok((req, user))
}

async fn allow_role(
    state: &AppState,
    req: Request<Body>,
    next: Next,
    role: Role,
) -> Result<Response, GuardRejection> {
    let (req, user) = extract_and_insert_authuser(state, req).await?;

    if user.0.role != role {
        return Err((StatusCode::FORBIDDEN, Json(ErrorBody::new("Forbidden"))));
    }

    Ok(next.run(req).await)
}

/// Admin-only guard.
pub async fn allow_admin(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, GuardRejection> {
    allow_role(&state, req, next, Role::Admin).await
}

/// Student-only guard.
pub async fn allow_student(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, GuardRejection> {
    allow_role(&state, req, next, Role::Student).await
}
