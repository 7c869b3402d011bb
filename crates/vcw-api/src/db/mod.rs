//! # Database Persistence Layer
//!
//! PostgreSQL persistence for users, credentials, and revocations via SQLx.
//!
//! The database is optional. When `DATABASE_URL` is set the service stores
//! everything in PostgreSQL through [`PgStore`]; when absent it runs on the
//! in-memory store and nothing survives a restart.
//!
//! `credentials` carries a unique `(holder_id, content_fingerprint)`
//! constraint. It is the authoritative duplicate guard: a racing insert that
//! passes the application-level pre-check fails here with SQLSTATE `23505`.

pub mod credentials;
pub mod store;
pub mod users;

pub use store::PgStore;

use sqlx::postgres::{PgPool, PgPoolOptions};
use vcw_lifecycle::StoreError;

/// Connect and run migrations.
///
/// Returns `None` if no URL is configured (in-memory mode).
pub async fn init_pool(database_url: Option<&str>) -> Result<Option<PgPool>, sqlx::Error> {
    let Some(url) = database_url else {
        tracing::warn!(
            "DATABASE_URL not set; running on the in-memory store. \
             State will not survive restarts."
        );
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Classify a driver error for the lifecycle core.
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            StoreError::UniqueViolation(db.message().to_string())
        }
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Corrupt(err.to_string())
        }
        _ => StoreError::Backend(err.to_string()),
    }
}
