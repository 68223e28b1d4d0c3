mod helpers;

use axum::http::{StatusCode, header};
use chrono::{Duration, Utc};
use db::models::user::{Enrollment, Role};
use helpers::{admin_key, body_json, create_user, get, make_test_app};
use tower::ServiceExt;

#[tokio::test]
async fn qr_image_is_served_while_active() {
    let (app, state) = make_test_app().await;
    let session = state.sessions().issue(admin_key(), 1, Utc::now()).unwrap();

    let response = app
        .clone()
        .oneshot(get(&session.qr_code_url(), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(body.starts_with(&[0x89, b'P', b'N', b'G']));

    let stale = state
        .sessions()
        .issue(admin_key(), 1, Utc::now() - Duration::seconds(60))
        .unwrap();
    let response = app
        .clone()
        .oneshot(get(&stale.qr_code_url(), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(get(&format!("/static/qr_codes/{}", session.token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_qr_code_returns_latest_active_token() {
    let (app, state) = make_test_app().await;
    let (admin, token) =
        create_user(&state, "a@college.edu", Role::Admin, Enrollment::default()).await;

    let response = app
        .clone()
        .oneshot(get("/get-qr-code", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "No active QR code");

    state
        .sessions()
        .issue(admin_key(), admin.id, Utc::now() - Duration::seconds(2))
        .unwrap();
    let newest = state.sessions().issue(admin_key(), admin.id, Utc::now()).unwrap();

    let response = app
        .oneshot(get("/get-qr-code", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["qr_data"], newest.token);
}
