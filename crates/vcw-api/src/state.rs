//! # Application State
//!
//! Shared state handed to every handler. The lifecycle core is assembled
//! here from the configured store (PostgreSQL when a pool is available,
//! in-memory otherwise) and the Ed25519 signer.

use std::sync::Arc;

use sqlx::PgPool;
use vcw_lifecycle::{CredentialLifecycle, CredentialStore, MemoryStore};
use vcw_vc::Ed25519Signer;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::db::PgStore;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Credential lifecycle core.
    pub lifecycle: CredentialLifecycle,
    /// Session token issuer and checker.
    pub tokens: Arc<TokenService>,
    /// Active configuration.
    pub config: Arc<AppConfig>,
    /// Database pool, when running against PostgreSQL.
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// In-memory state with default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    /// Build state from `config`, persisting through `db_pool` when given.
    pub fn with_config(config: AppConfig, db_pool: Option<PgPool>) -> Self {
        let store: Arc<dyn CredentialStore> = match &db_pool {
            Some(pool) => Arc::new(PgStore::new(pool.clone())),
            None => Arc::new(MemoryStore::new()),
        };
        Self::with_store(config, store, db_pool)
    }

    /// Build state over an explicit store.
    pub fn with_store(
        config: AppConfig,
        store: Arc<dyn CredentialStore>,
        db_pool: Option<PgPool>,
    ) -> Self {
        let lifecycle =
            CredentialLifecycle::new(store, Arc::new(Ed25519Signer), config.lifecycle());
        let tokens = Arc::new(TokenService::new(&config.jwt_secret, config.token_ttl));
        Self {
            lifecycle,
            tokens,
            config: Arc::new(config),
            db_pool,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
