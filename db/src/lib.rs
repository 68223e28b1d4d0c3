pub mod models;
pub mod test_utils;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::path::Path;

/// Opens the database at `path_or_url`.
///
/// Anything that already looks like a DSN is used as-is; otherwise the value
/// is treated as a SQLite file path and created on first use.
pub async fn connect(path_or_url: &str) -> Result<DatabaseConnection, DbErr> {
    let url = if path_or_url.starts_with("sqlite:")
        || path_or_url.starts_with("postgres://")
        || path_or_url.starts_with("mysql://")
    {
        path_or_url.to_owned()
    } else {
        // SQLite won't create intermediate dirs.
        if let Some(parent) = Path::new(path_or_url).parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        format!("sqlite://{path_or_url}?mode=rwc")
    };

    let mut opts = ConnectOptions::new(url.clone());
    if url.contains(":memory:") {
        // Every pooled connection would otherwise get its own empty database.
        opts.max_connections(1).min_connections(1);
    }
    opts.sqlx_logging(false);

    Database::connect(opts).await
}
