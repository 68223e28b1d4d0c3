use api::auth::middleware::log_request;
use api::routes::routes;
use api::state::AppState;
use axum::middleware::from_fn_with_state;
use common::{config::AppConfig, logger::init_logging};
use migration::Migrator;
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tracing::info;

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env();
    let _log_guard = init_logging(&config.log_file, &config.log_level, config.log_to_stdout);

    let db = db::connect(&config.database_path)
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid address");
    let project_name = config.project_name.clone();
    let sweep_interval = config.qr_sweep_interval();

    let app_state = AppState::new(db, config);
    let sweeper = app_state.sessions().spawn_sweeper(sweep_interval);

    let app = routes(app_state.clone())
        .layer(from_fn_with_state(app_state, log_request))
        .layer(CorsLayer::very_permissive());

    info!("Starting {project_name} on http://{addr}");
    println!("Starting {project_name} on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server crashed");

    sweeper.cancel();
    info!("{project_name} stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
