//! # API Route Modules
//!
//! - `account` — registration, login, and the caller's profile.
//! - `issuer` — credential issuance, revocation, and the issuer dashboard.
//! - `holder` — import, listing, and selective-disclosure presentations.
//! - `verifier` — unauthenticated verification of credentials and
//!   presentations.
//!
//! `public_router` holds the endpoints reachable without a token;
//! `protected_router` is wrapped in the auth middleware by [`crate::app`].

pub mod account;
pub mod holder;
pub mod issuer;
pub mod verifier;

use axum::Router;

use crate::state::AppState;

/// Endpoints that do not require a bearer token.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .merge(account::public_router())
        .merge(verifier::router())
}

/// Endpoints that require a bearer token.
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .merge(account::protected_router())
        .merge(issuer::router())
        .merge(holder::router())
}
