//! # In-Memory Store
//!
//! [`CredentialStore`] over a single `parking_lot::RwLock`. Every trait
//! method takes the lock once and never across an `.await`, so each call
//! is atomic with respect to the others, including `revoke`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use vcw_core::{CredentialId, UserId};
use vcw_crypto::KeyMaterial;

use crate::record::{
    CredentialRecord, CredentialStatus, IssuanceEvent, IssuerRef, IssuerStats, RevocationRecord,
    RevokeOutcome, UserRecord,
};
use crate::store::{CredentialStore, StoreError};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, UserRecord>,
    credentials: HashMap<CredentialId, CredentialRecord>,
    revocations: Vec<RevocationRecord>,
}

/// Thread-safe, cloneable in-memory store. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored credentials.
    pub fn credential_count(&self) -> usize {
        self.tables.read().credentials.len()
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> chrono::DateTime<chrono::Utc>) {
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn insert_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        let mut t = self.tables.write();
        if t.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation(format!(
                "email '{}' already registered",
                user.email
            )));
        }
        t.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.tables.read().users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self
            .tables
            .read()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn users_without_key(&self) -> Result<Vec<UserId>, StoreError> {
        Ok(self
            .tables
            .read()
            .users
            .values()
            .filter(|u| u.signing_key.is_none())
            .map(|u| u.user_id)
            .collect())
    }

    async fn set_signing_key_if_absent(
        &self,
        id: UserId,
        key: &KeyMaterial,
    ) -> Result<bool, StoreError> {
        let mut t = self.tables.write();
        match t.users.get_mut(&id) {
            Some(user) if user.signing_key.is_none() => {
                user.signing_key = Some(key.clone());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_credential(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        let mut t = self.tables.write();
        let clash = t
            .credentials
            .values()
            .any(|c| c.holder_id == record.holder_id && c.fingerprint == record.fingerprint);
        if clash {
            return Err(StoreError::UniqueViolation(format!(
                "holder {} already holds fingerprint {}",
                record.holder_id, record.fingerprint
            )));
        }
        if t.credentials.contains_key(&record.cred_id) {
            return Err(StoreError::UniqueViolation(format!(
                "credential {} already exists",
                record.cred_id
            )));
        }
        t.credentials.insert(record.cred_id, record.clone());
        Ok(())
    }

    async fn credential(&self, id: CredentialId) -> Result<Option<CredentialRecord>, StoreError> {
        Ok(self.tables.read().credentials.get(&id).cloned())
    }

    async fn exists(&self, holder: UserId, fingerprint: &str) -> Result<bool, StoreError> {
        Ok(self
            .tables
            .read()
            .credentials
            .values()
            .any(|c| c.holder_id == holder && c.fingerprint == fingerprint))
    }

    async fn fingerprint_exists(&self, fingerprint: &str) -> Result<bool, StoreError> {
        Ok(self
            .tables
            .read()
            .credentials
            .values()
            .any(|c| c.fingerprint == fingerprint))
    }

    async fn credentials_for_holder(
        &self,
        holder: UserId,
    ) -> Result<Vec<CredentialRecord>, StoreError> {
        let mut out: Vec<CredentialRecord> = self
            .tables
            .read()
            .credentials
            .values()
            .filter(|c| c.holder_id == holder)
            .cloned()
            .collect();
        newest_first(&mut out, |c| c.issued_at);
        Ok(out)
    }

    async fn revoke(
        &self,
        issuer: UserId,
        revocation: &RevocationRecord,
    ) -> Result<RevokeOutcome, StoreError> {
        let mut t = self.tables.write();
        let Some(cred) = t.credentials.get_mut(&revocation.cred_id) else {
            return Ok(RevokeOutcome::NotOwned);
        };
        if cred.issuer != IssuerRef::User(issuer) {
            return Ok(RevokeOutcome::NotOwned);
        }
        if cred.status == CredentialStatus::Revoked {
            return Ok(RevokeOutcome::AlreadyRevoked);
        }
        cred.status = CredentialStatus::Revoked;
        t.revocations.push(revocation.clone());
        Ok(RevokeOutcome::Revoked)
    }

    async fn revocations_for(
        &self,
        cred_id: CredentialId,
    ) -> Result<Vec<RevocationRecord>, StoreError> {
        Ok(self
            .tables
            .read()
            .revocations
            .iter()
            .filter(|r| r.cred_id == cred_id)
            .cloned()
            .collect())
    }

    async fn issuer_stats(&self, issuer: UserId) -> Result<IssuerStats, StoreError> {
        let t = self.tables.read();
        let issued: Vec<&CredentialRecord> = t
            .credentials
            .values()
            .filter(|c| c.issuer == IssuerRef::User(issuer))
            .collect();
        let holders: HashSet<UserId> = issued.iter().map(|c| c.holder_id).collect();
        let issued_ids: HashSet<CredentialId> = issued.iter().map(|c| c.cred_id).collect();
        let revoked = t
            .revocations
            .iter()
            .filter(|r| issued_ids.contains(&r.cred_id))
            .count();
        Ok(IssuerStats {
            credentials_issued: issued.len() as u64,
            active_students: holders.len() as u64,
            revoked_credentials: revoked as u64,
        })
    }

    async fn recent_issuances(
        &self,
        issuer: UserId,
        limit: usize,
    ) -> Result<Vec<IssuanceEvent>, StoreError> {
        let t = self.tables.read();
        let mut issued: Vec<&CredentialRecord> = t
            .credentials
            .values()
            .filter(|c| c.issuer == IssuerRef::User(issuer))
            .collect();
        newest_first(&mut issued, |c| c.issued_at);
        Ok(issued
            .into_iter()
            .filter_map(|c| {
                t.users.get(&c.holder_id).map(|holder| IssuanceEvent {
                    title: c.title.clone(),
                    holder_email: holder.email.clone(),
                    issued_at: c.issued_at,
                })
            })
            .take(limit)
            .collect())
    }
}
