use api::{auth::middleware::log_request, routes::routes, state::AppState};
use axum::middleware::from_fn_with_state;
use client::{
    ApiClient, ClientError, ExpiryPolicy, IssueRequest, PollerConfig, Redeemer, ScanState,
    SessionState, SessionView, api::RecordQuery,
};
use common::config::AppConfig;
use db::models::user::{Enrollment, Model as User, Role};
use db::test_utils::setup_test_db;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::time::timeout;

/// Serves the real API on an ephemeral port with two accounts:
/// `admin@college.edu` and `student@college.edu`, both `password123`.
async fn spawn_api(config: AppConfig) -> ApiClient {
    let db = setup_test_db().await;
    User::create(&db, "admin@college.edu", "Admin", "password123", Role::Admin, Enrollment::default())
        .await
        .unwrap();
    User::create(
        &db,
        "student@college.edu",
        "Student",
        "password123",
        Role::Student,
        Enrollment {
            department: Some("CSE".into()),
            year: Some("SY".into()),
        },
    )
    .await
    .unwrap();

    let state = AppState::new(db, config);
    let app = routes(state.clone()).layer(from_fn_with_state(state, log_request));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    ApiClient::new(format!("http://{addr}"))
}

fn data_structures() -> IssueRequest {
    IssueRequest::new("CSE", "SY", "SEM3", "Data Structures")
}

#[tokio::test]
async fn issue_poll_redeem_and_expire() {
    let config = AppConfig {
        qr_code_expiry_seconds: 1,
        ..AppConfig::for_tests()
    };
    let api = spawn_api(config).await;
    let admin = api.login("admin@college.edu", "password123", "admin").await.unwrap();
    let student = api
        .login("student@college.edu", "password123", "student")
        .await
        .unwrap();

    let mut view = SessionView::new(
        admin.clone(),
        PollerConfig {
            interval: Duration::from_millis(100),
            low_water_mark: 5,
            policy: ExpiryPolicy::Stop,
        },
    );
    let issued = view.generate(data_structures()).await.unwrap();
    assert_eq!(issued.expires_in, 1);

    let status = admin.qr_status(&issued.qr_data).await.unwrap();
    assert!(status.active);
    assert!(status.time_remaining <= issued.expires_in);

    // Scanned as a URL the first time, as the bare token the second.
    let mut redeemer = Redeemer::new(student.clone());
    let url = format!("{}{}", api.base_url(), issued.qr_code_url);
    let first = redeemer.redeem(&url).await.unwrap();
    assert_eq!(first.message, "Attendance marked successfully");
    let details = first.details.unwrap();
    assert_eq!(details.subject, "Data Structures");
    assert_eq!(details.year, "SY");
    assert_eq!(redeemer.state(), ScanState::Capturing);

    let second = redeemer.redeem(&issued.qr_data).await.unwrap_err();
    assert!(matches!(second, ClientError::Domain(ref m) if m == "Attendance already marked"));

    let mut rx = view.subscribe().unwrap();
    let last = timeout(Duration::from_secs(5), rx.wait_for(|s| s.is_expired()))
        .await
        .expect("session never expired")
        .unwrap()
        .clone();
    assert_eq!(last.state, SessionState::Expired);

    let late = redeemer.redeem(&issued.qr_data).await.unwrap_err();
    assert!(matches!(late, ClientError::Domain(ref m) if m == "Invalid or expired QR code"));

    let history = student.attendance_history().await.unwrap();
    assert_eq!(history.len(), 1);
    let stats = student.student_stats().await.unwrap();
    assert_eq!(stats.classes_attended, 1);

    let records = admin
        .attendance_records(&RecordQuery {
            department: Some("CSE".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].student_email, "student@college.edu");
    assert_eq!(admin.recent_activity().await.unwrap().len(), 1);
    assert_eq!(admin.admin_stats().await.unwrap().total_students, 1);
}

#[tokio::test]
async fn auth_failures_surface_as_domain_errors() {
    let api = spawn_api(AppConfig::for_tests()).await;

    let err = api
        .login("student@college.edu", "password123", "admin")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Domain(ref m) if m == "Invalid role. You are not authorized as a admin"
    ));

    let err = api.login("student@college.edu", "nope", "student").await.unwrap_err();
    assert!(matches!(err, ClientError::Domain(ref m) if m == "Invalid email or password"));

    let err = api.qr_status("anything").await.unwrap_err();
    assert!(matches!(err, ClientError::Domain(ref m) if m == "Unauthorized"));
}

#[tokio::test]
async fn single_active_policy_maps_to_rate_limited() {
    let config = AppConfig {
        qr_single_active_per_key: true,
        ..AppConfig::for_tests()
    };
    let api = spawn_api(config).await;
    let admin = api.login("admin@college.edu", "password123", "admin").await.unwrap();

    admin.generate_qr(&data_structures()).await.unwrap();
    let err = admin.generate_qr(&data_structures()).await.unwrap_err();
    assert!(matches!(err, ClientError::RateLimited(_)));
}
