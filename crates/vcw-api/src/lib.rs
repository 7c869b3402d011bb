//! # vcw-api — Axum API Service for the Credential Wallet
//!
//! A thin HTTP surface over [`vcw_lifecycle::CredentialLifecycle`]. Handlers
//! authenticate the caller, translate request DTOs, call exactly one
//! lifecycle operation, and map its result.
//!
//! ## API Surface
//!
//! | Path | Module | Auth |
//! |------|--------|------|
//! | `POST /api/register`, `POST /api/login` | [`routes::account`] | none (issuer sign-up gated) |
//! | `GET /api/me` | [`routes::account`] | bearer |
//! | `/api/issuer/*` | [`routes::issuer`] | bearer, role `issuer` |
//! | `/api/holder/*` | [`routes::holder`] | bearer, role `holder` |
//! | `POST /api/verifier/verify` | [`routes::verifier`] | none |
//! | `/health/liveness`, `/health/readiness` | here | none |
//! | `/openapi.json` | [`openapi`] | none |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! CorsLayer → TraceLayer → AuthMiddleware (protected routes only) → Handler
//! ```

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod password;
pub mod routes;
pub mod state;
pub mod telemetry;

use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors_allow_origin.as_deref());

    let protected = routes::protected_router()
        .layer(from_fn_with_state(state.clone(), auth::auth_middleware));

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new()
        .merge(health)
        .merge(openapi::router())
        .merge(routes::public_router())
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Permissive when no origin is configured; otherwise only that origin.
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let Some(origin) = origin else {
        return CorsLayer::permissive();
    };
    let allow = match HeaderValue::from_str(origin) {
        Ok(value) => AllowOrigin::exact(value),
        Err(_) => {
            tracing::warn!(%origin, "VCW_CORS_ALLOW_ORIGIN is not a valid header value; cross-origin requests disabled");
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };
    CorsLayer::new()
        .allow_origin(allow)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Liveness probe. Always 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe. 503 when a configured database does not answer.
async fn readiness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    let Some(pool) = &state.db_pool else {
        return (StatusCode::OK, "ready");
    };
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => (StatusCode::OK, "ready"),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
        }
    }
}
