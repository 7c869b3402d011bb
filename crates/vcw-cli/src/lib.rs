//! # vcw-cli — Operator CLI for the Credential Wallet
//!
//! ## Subcommands
//!
//! - `vcw backfill-keys` — generate signing keys for users that lack one.
//! - `vcw seed-users <file.yaml>` — create users listed in a YAML file.
//! - `vcw verify <file.json>` — verify a credential or presentation offline.
//!
//! `backfill-keys` and `seed-users` operate on the database named by
//! `DATABASE_URL`, using the same configuration variables as the API
//! server. `verify` needs no database.

pub mod keys;
pub mod seed;
pub mod verify;

use anyhow::{bail, Context, Result};
use vcw_api::config::AppConfig;
use vcw_api::state::AppState;
use vcw_lifecycle::CredentialLifecycle;

/// Build a lifecycle over the configured PostgreSQL database.
pub async fn database_lifecycle() -> Result<CredentialLifecycle> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    let Some(url) = config.database_url.clone() else {
        bail!("DATABASE_URL must be set for this command");
    };
    let pool = vcw_api::db::init_pool(Some(&url))
        .await
        .context("failed to connect to the database")?;
    Ok(AppState::with_config(config, pool).lifecycle)
}

/// Build a lifecycle that needs no database.
pub fn offline_lifecycle() -> Result<CredentialLifecycle> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    Ok(AppState::with_config(config, None).lifecycle)
}
