//! # Relational Store Contract
//!
//! Implementations must enforce two constraints themselves, not rely on the
//! caller's pre-checks: email uniqueness for users and
//! `(holder_id, fingerprint)` uniqueness for credentials. A violated
//! constraint surfaces as [`StoreError::UniqueViolation`].
//!
//! [`CredentialStore::revoke`] must write the status flip and the
//! revocation row atomically.

use async_trait::async_trait;
use thiserror::Error;
use vcw_core::{CredentialId, UserId};
use vcw_crypto::KeyMaterial;

use crate::record::{
    CredentialRecord, IssuanceEvent, IssuerStats, RevocationRecord, RevokeOutcome, UserRecord,
};

/// Errors from a store implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The backing store could not be reached. Transient.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// Any other backend failure.
    #[error("store error: {0}")]
    Backend(String),
}

/// Persistence for users, credentials and revocations.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug {
    /// Insert a new user. Duplicate email is a `UniqueViolation`.
    async fn insert_user(&self, user: &UserRecord) -> Result<(), StoreError>;

    /// Fetch a user by id.
    async fn user_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError>;

    /// Fetch a user by email.
    async fn user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Ids of users with no signing key.
    async fn users_without_key(&self) -> Result<Vec<UserId>, StoreError>;

    /// Set the user's signing key only if none is set. Returns whether a key
    /// was written.
    async fn set_signing_key_if_absent(
        &self,
        id: UserId,
        key: &KeyMaterial,
    ) -> Result<bool, StoreError>;

    /// Insert a credential. A duplicate `(holder_id, fingerprint)` is a
    /// `UniqueViolation`.
    async fn insert_credential(&self, record: &CredentialRecord) -> Result<(), StoreError>;

    /// Fetch a credential by id.
    async fn credential(&self, id: CredentialId) -> Result<Option<CredentialRecord>, StoreError>;

    /// Whether `holder` already holds a credential with `fingerprint`.
    async fn exists(&self, holder: UserId, fingerprint: &str) -> Result<bool, StoreError>;

    /// Whether any holder holds a credential with `fingerprint`.
    async fn fingerprint_exists(&self, fingerprint: &str) -> Result<bool, StoreError>;

    /// A holder's credentials, newest first.
    async fn credentials_for_holder(
        &self,
        holder: UserId,
    ) -> Result<Vec<CredentialRecord>, StoreError>;

    /// Atomically revoke a credential issued by `issuer`.
    async fn revoke(
        &self,
        issuer: UserId,
        revocation: &RevocationRecord,
    ) -> Result<RevokeOutcome, StoreError>;

    /// Revocation rows for a credential.
    async fn revocations_for(
        &self,
        cred_id: CredentialId,
    ) -> Result<Vec<RevocationRecord>, StoreError>;

    /// Aggregate counts over the issuer's credentials.
    async fn issuer_stats(&self, issuer: UserId) -> Result<IssuerStats, StoreError>;

    /// The issuer's most recent issuances, newest first.
    async fn recent_issuances(
        &self,
        issuer: UserId,
        limit: usize,
    ) -> Result<Vec<IssuanceEvent>, StoreError>;
}
