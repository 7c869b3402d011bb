//! # vcw-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the credential wallet.
//! Binds to configurable port (default 8080).

use vcw_api::config::AppConfig;
use vcw_api::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    vcw_api::telemetry::init_tracing(vcw_api::telemetry::json_requested(), "info");

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuration error: {e}");
        e
    })?;
    tracing::info!(?config, "configuration loaded");

    // No DATABASE_URL means the in-memory store.
    let db_pool = vcw_api::db::init_pool(config.database_url.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("Database initialization failed: {e}");
            e
        })?;

    let port = config.port;
    let state = AppState::with_config(config, db_pool);
    let app = vcw_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("VCW API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
