use api::{auth::generate_jwt, routes::routes, state::AppState};
use axum::{
    Router,
    body::Body,
    http::{Request, header},
    response::Response,
};
use common::config::AppConfig;
use db::models::user::{Enrollment, Model as User, Role};
use db::test_utils::setup_test_db;
use serde_json::Value;
use services::SessionKey;

pub async fn make_test_app() -> (Router, AppState) {
    make_test_app_with(AppConfig::for_tests()).await
}

pub async fn make_test_app_with(config: AppConfig) -> (Router, AppState) {
    let db = setup_test_db().await;
    let state = AppState::new(db, config);
    (routes(state.clone()), state)
}

/// Creates a user with password `password123` and returns it with a bearer token.
pub async fn create_user(
    state: &AppState,
    email: &str,
    role: Role,
    enrollment: Enrollment,
) -> (User, String) {
    let user = User::create(state.db(), email, email, "password123", role, enrollment)
        .await
        .expect("create user");
    let (token, _) = generate_jwt(state, &user).expect("sign jwt");
    (user, token)
}

pub fn admin_key() -> SessionKey {
    SessionKey {
        department: "CSE".into(),
        year: "SY".into(),
        semester: Some("SEM3".into()),
        subject: "Data Structures".into(),
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
