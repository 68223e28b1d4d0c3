mod helpers;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use db::models::user::{Enrollment, Role};
use helpers::{admin_key, body_json, create_user, get, make_test_app, post_json};
use serde_json::json;
use tower::ServiceExt;

const MARK: &str = "/api/student/mark-attendance";

#[tokio::test]
async fn mark_attendance_once_then_already_marked() {
    let (app, state) = make_test_app().await;
    let (admin, _) = create_user(&state, "a@college.edu", Role::Admin, Enrollment::default()).await;
    let (_, student) =
        create_user(&state, "s@college.edu", Role::Student, Enrollment::default()).await;
    let session = state.sessions().issue(admin_key(), admin.id, Utc::now()).unwrap();

    let body = json!({ "qrData": session.token });
    let response = app.clone().oneshot(post_json(MARK, Some(&student), &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Attendance marked successfully");
    assert_eq!(json["details"]["subject"], "Data Structures");
    assert_eq!(json["details"]["department"], "CSE");
    assert_eq!(json["details"]["year"], "SY");

    let response = app.oneshot(post_json(MARK, Some(&student), &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Attendance already marked");
    assert!(json.get("details").is_none());
}

#[tokio::test]
async fn mark_attendance_rejects_empty_and_expired_tokens() {
    let (app, state) = make_test_app().await;
    let (admin, _) = create_user(&state, "a@college.edu", Role::Admin, Enrollment::default()).await;
    let (_, student) =
        create_user(&state, "s@college.edu", Role::Student, Enrollment::default()).await;

    let response = app
        .clone()
        .oneshot(post_json(MARK, Some(&student), &json!({ "qrData": "" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid QR code data");

    let stale = state
        .sessions()
        .issue(admin_key(), admin.id, Utc::now() - Duration::seconds(60))
        .unwrap();
    for token in [stale.token.as_str(), "unknown-token"] {
        let response = app
            .clone()
            .oneshot(post_json(MARK, Some(&student), &json!({ "qrData": token })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Invalid or expired QR code");
    }
}

#[tokio::test]
async fn mark_attendance_uses_qr_data_verbatim() {
    let (app, state) = make_test_app().await;
    let (admin, _) = create_user(&state, "a@college.edu", Role::Admin, Enrollment::default()).await;
    let (_, student) =
        create_user(&state, "s@college.edu", Role::Student, Enrollment::default()).await;
    let session = state.sessions().issue(admin_key(), admin.id, Utc::now()).unwrap();

    let padded = format!(" {} ", session.token);
    let response = app
        .clone()
        .oneshot(post_json(MARK, Some(&student), &json!({ "qrData": padded })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid or expired QR code");

    let response = app
        .oneshot(post_json(MARK, Some(&student), &json!({ "qrData": session.token })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn mark_attendance_checks_enrollment() {
    let (app, state) = make_test_app().await;
    let (admin, _) = create_user(&state, "a@college.edu", Role::Admin, Enrollment::default()).await;
    let (_, student) = create_user(
        &state,
        "ty@college.edu",
        Role::Student,
        Enrollment {
            department: Some("CSE".into()),
            year: Some("TY".into()),
        },
    )
    .await;
    let session = state.sessions().issue(admin_key(), admin.id, Utc::now()).unwrap();

    let response = app
        .oneshot(post_json(MARK, Some(&student), &json!({ "qrData": session.token })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "You are not enrolled in CSE SY");
}

#[tokio::test]
async fn stats_and_history_follow_marked_sessions() {
    let (app, state) = make_test_app().await;
    let (admin, _) = create_user(&state, "a@college.edu", Role::Admin, Enrollment::default()).await;
    let (_, student) =
        create_user(&state, "s@college.edu", Role::Student, Enrollment::default()).await;

    for _ in 0..2 {
        let session = state.sessions().issue(admin_key(), admin.id, Utc::now()).unwrap();
        let response = app
            .clone()
            .oneshot(post_json(MARK, Some(&student), &json!({ "qrData": session.token })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(get("/api/student/stats", Some(&student)))
        .await
        .unwrap();
    let stats = body_json(response).await;
    assert_eq!(stats["totalClasses"], 1);
    assert_eq!(stats["classesAttended"], 2);
    assert_eq!(stats["subjectWise"]["Data Structures"], 2);

    let response = app
        .oneshot(get("/api/student/attendance-history", Some(&student)))
        .await
        .unwrap();
    let history = body_json(response).await;
    let rows = history["history"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["subject"], "Data Structures");
    assert!(rows[0]["timestamp"].as_i64().is_some());
}
