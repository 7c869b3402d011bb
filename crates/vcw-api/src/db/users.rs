//! User persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `users` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use vcw_core::UserId;
use vcw_crypto::KeyMaterial;
use vcw_lifecycle::{Role, StoreError, UserRecord};

/// Insert a new user.
pub async fn insert(pool: &PgPool, user: &UserRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (user_id, email, password_hash, role, signing_key, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(user.user_id.as_uuid())
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role.as_str())
    .bind(user.signing_key.as_ref().map(KeyMaterial::expose_stored))
    .bind(user.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch a user by id.
pub async fn get_by_id(pool: &PgPool, id: UserId) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        "SELECT user_id, email, password_hash, role, signing_key, created_at
         FROM users WHERE user_id = $1",
    )
    .bind(id.as_uuid())
    .fetch_optional(pool)
    .await
}

/// Fetch a user by (normalized) email.
pub async fn get_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        "SELECT user_id, email, password_hash, role, signing_key, created_at
         FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

/// Ids of users without a signing key.
pub async fn without_key(pool: &PgPool) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        "SELECT user_id FROM users WHERE signing_key IS NULL ORDER BY created_at",
    )
    .fetch_all(pool)
    .await
}

/// Set the signing key unless one is already present.
pub async fn set_key_if_absent(
    pool: &PgPool,
    id: UserId,
    key: &KeyMaterial,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET signing_key = $1 WHERE user_id = $2 AND signing_key IS NULL",
    )
    .bind(key.expose_stored())
    .bind(id.as_uuid())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
pub struct UserRow {
    user_id: Uuid,
    email: String,
    password_hash: String,
    role: String,
    signing_key: Option<String>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert to the lifecycle record, rejecting unknown roles and
    /// undecodable keys.
    pub fn into_record(self) -> Result<UserRecord, StoreError> {
        let role = Role::parse(&self.role).ok_or_else(|| {
            tracing::error!(user_id = %self.user_id, role = %self.role, "unknown role in database");
            StoreError::Corrupt(format!("user {} has unknown role '{}'", self.user_id, self.role))
        })?;
        let signing_key = self
            .signing_key
            .map(KeyMaterial::from_stored)
            .transpose()
            .map_err(|e| {
                tracing::error!(user_id = %self.user_id, "undecodable signing key in database");
                StoreError::Corrupt(format!("user {} signing key: {e}", self.user_id))
            })?;
        Ok(UserRecord {
            user_id: UserId::from_uuid(self.user_id),
            email: self.email,
            password_hash: self.password_hash,
            role,
            signing_key,
            created_at: self.created_at,
        })
    }
}
