//! # User Seeding
//!
//! Creates the users listed in a YAML file:
//!
//! ```yaml
//! users:
//!   - email: registrar@ua.pt
//!     password: change-me
//!     role: issuer
//!   - email: student@ua.pt
//!     password: change-me
//! ```
//!
//! `role` defaults to `holder`. Users that already exist are left alone,
//! except that any missing signing keys are backfilled afterwards.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use vcw_api::password::hash_password;
use vcw_lifecycle::{CredentialLifecycle, LifecycleError, Role};

/// Top-level seed document.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    /// Users to create.
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

/// One user entry.
#[derive(Debug, Deserialize)]
pub struct SeedUser {
    /// Login email.
    pub email: String,
    /// Plain-text password, hashed before storage.
    pub password: String,
    /// Account role.
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Holder
}

/// What a seeding run did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Users created.
    pub created: usize,
    /// Entries skipped because the email was already registered.
    pub existing: usize,
    /// Keys generated for pre-existing keyless users.
    pub keys_backfilled: usize,
}

/// Parse a seed file.
pub fn load_seed_file(path: &Path) -> Result<SeedFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read seed file: {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse seed file: {}", path.display()))
}

/// Create every user in `seed` that does not exist yet.
pub async fn seed_users(lifecycle: &CredentialLifecycle, seed: SeedFile) -> Result<SeedReport> {
    let mut report = SeedReport::default();
    for user in seed.users {
        if lifecycle.user_by_email(&user.email).await?.is_some() {
            tracing::info!(email = %user.email, "user exists, skipping");
            report.existing += 1;
            continue;
        }
        let hash = hash_password(user.password)
            .await
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        match lifecycle.register_user(&user.email, hash, user.role).await {
            Ok(_) => report.created += 1,
            Err(LifecycleError::EmailTaken(_)) => report.existing += 1,
            Err(e) => {
                return Err(e).with_context(|| format!("failed to create user {}", user.email))
            }
        }
    }
    report.keys_backfilled = lifecycle.backfill_keys().await?;
    Ok(report)
}

/// Execute `vcw seed-users <file>`.
pub async fn run_seed(lifecycle: &CredentialLifecycle, path: &Path) -> Result<u8> {
    let seed = load_seed_file(path)?;
    let report = seed_users(lifecycle, seed).await?;
    println!(
        "OK: {} created, {} already present, {} key(s) backfilled",
        report.created, report.existing, report.keys_backfilled
    );
    Ok(0)
}
