//! [`CredentialStore`] over PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;
use vcw_core::{CredentialId, UserId};
use vcw_crypto::KeyMaterial;
use vcw_lifecycle::{
    CredentialRecord, CredentialStore, IssuanceEvent, IssuerStats, RevocationRecord,
    RevokeOutcome, StoreError, UserRecord,
};

use super::{credentials, map_sqlx_error, users};

/// PostgreSQL-backed store. Each call checks a connection out of the pool
/// for its own duration only.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap a connected pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn insert_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        users::insert(&self.pool, user).await.map_err(map_sqlx_error)
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        users::get_by_id(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?
            .map(users::UserRow::into_record)
            .transpose()
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        users::get_by_email(&self.pool, email)
            .await
            .map_err(map_sqlx_error)?
            .map(users::UserRow::into_record)
            .transpose()
    }

    async fn users_without_key(&self) -> Result<Vec<UserId>, StoreError> {
        Ok(users::without_key(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .into_iter()
            .map(UserId::from_uuid)
            .collect())
    }

    async fn set_signing_key_if_absent(
        &self,
        id: UserId,
        key: &KeyMaterial,
    ) -> Result<bool, StoreError> {
        users::set_key_if_absent(&self.pool, id, key)
            .await
            .map_err(map_sqlx_error)
    }

    async fn insert_credential(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        credentials::insert(&self.pool, record)
            .await
            .map_err(map_sqlx_error)
    }

    async fn credential(&self, id: CredentialId) -> Result<Option<CredentialRecord>, StoreError> {
        credentials::get_by_id(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?
            .map(credentials::CredentialRow::into_record)
            .transpose()
    }

    async fn exists(&self, holder: UserId, fingerprint: &str) -> Result<bool, StoreError> {
        credentials::exists_for_holder(&self.pool, holder, fingerprint)
            .await
            .map_err(map_sqlx_error)
    }

    async fn fingerprint_exists(&self, fingerprint: &str) -> Result<bool, StoreError> {
        credentials::exists_anywhere(&self.pool, fingerprint)
            .await
            .map_err(map_sqlx_error)
    }

    async fn credentials_for_holder(
        &self,
        holder: UserId,
    ) -> Result<Vec<CredentialRecord>, StoreError> {
        credentials::list_for_holder(&self.pool, holder)
            .await
            .map_err(map_sqlx_error)?
            .into_iter()
            .map(credentials::CredentialRow::into_record)
            .collect()
    }

    async fn revoke(
        &self,
        issuer: UserId,
        revocation: &RevocationRecord,
    ) -> Result<RevokeOutcome, StoreError> {
        credentials::revoke(&self.pool, issuer, revocation)
            .await
            .map_err(map_sqlx_error)
    }

    async fn revocations_for(
        &self,
        cred_id: CredentialId,
    ) -> Result<Vec<RevocationRecord>, StoreError> {
        credentials::revocations_for(&self.pool, cred_id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn issuer_stats(&self, issuer: UserId) -> Result<IssuerStats, StoreError> {
        credentials::issuer_stats(&self.pool, issuer)
            .await
            .map_err(map_sqlx_error)
    }

    async fn recent_issuances(
        &self,
        issuer: UserId,
        limit: usize,
    ) -> Result<Vec<IssuanceEvent>, StoreError> {
        credentials::recent_issuances(&self.pool, issuer, limit)
            .await
            .map_err(map_sqlx_error)
    }
}
