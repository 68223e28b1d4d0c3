use axum::{
    body::Body,
    extract::{ConnectInfo, FromRequestParts, State},
    http::{Method, Request, header},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::time::Instant;
use tracing::info;

use crate::auth::AuthUser;
use crate::state::AppState;

fn header_or_unknown(req: &Request<Body>, name: header::HeaderName) -> String {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_owned()
}

/// Logs one line per request once the response is ready: method, path,
/// peer IP, caller (id and role when a valid bearer token is present),
/// origin, user agent, status and latency. CORS preflights are not logged.
///
/// Needs `ConnectInfo<SocketAddr>`; serve with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub async fn log_request(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if req.method() == Method::OPTIONS {
        return next.run(req).await;
    }

    let (mut parts, body) = req.into_parts();
    let caller = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .ok()
        .map(|AuthUser(c)| (c.sub, c.role));
    let req = Request::from_parts(parts, body);

    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let origin = header_or_unknown(&req, header::ORIGIN);
    let user_agent = header_or_unknown(&req, header::USER_AGENT);

    let started = Instant::now();
    let response = next.run(req).await;

    info!(
        method = %method,
        path = %path,
        ip = %addr.ip(),
        user = caller.map_or(0, |(id, _)| id),
        role = %caller.map_or("anonymous".to_owned(), |(_, r)| r.to_string()),
        origin = %origin,
        user_agent = %user_agent,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );

    response
}
