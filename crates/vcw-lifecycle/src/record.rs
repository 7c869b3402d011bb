//! # Stored Records
//!
//! The rows the lifecycle core reads and writes through
//! [`CredentialStore`](crate::store::CredentialStore).

use chrono::{DateTime, Utc};
use serde_json::Value;
use vcw_core::{CredentialId, RevocationId, UserId};
use vcw_crypto::KeyMaterial;
use vcw_vc::ArtifactKind;

use crate::principal::Role;

/// A registered user.
#[derive(Clone)]
pub struct UserRecord {
    /// Stable identifier.
    pub user_id: UserId,
    /// Unique login email.
    pub email: String,
    /// PHC-format password hash.
    pub password_hash: String,
    /// Account role.
    pub role: Role,
    /// Signing key, generated at registration or by backfill.
    pub signing_key: Option<KeyMaterial>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("role", &self.role)
            .field("has_signing_key", &self.signing_key.is_some())
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Lifecycle status of a stored credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialStatus {
    /// Valid as far as this system knows.
    Active,
    /// Revoked by its issuer.
    Revoked,
}

impl CredentialStatus {
    /// Return the string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Revoked => "revoked",
        }
    }

    /// Parse the stored string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "revoked" => Some(Self::Revoked),
            _ => None,
        }
    }
}

/// Who issued a stored credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuerRef {
    /// Issued here by a local issuer account.
    User(UserId),
    /// Imported; signed outside this system.
    External,
}

impl IssuerRef {
    /// The local issuer, if any.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::User(id) => Some(*id),
            Self::External => None,
        }
    }
}

impl From<Option<UserId>> for IssuerRef {
    fn from(id: Option<UserId>) -> Self {
        id.map_or(Self::External, Self::User)
    }
}

/// A stored credential or presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialRecord {
    /// Record identifier.
    pub cred_id: CredentialId,
    /// Provenance.
    pub issuer: IssuerRef,
    /// Owning holder.
    pub holder_id: UserId,
    /// VC or VP.
    pub category: ArtifactKind,
    /// Hex SHA-256 content fingerprint.
    pub fingerprint: String,
    /// Listing title.
    pub title: String,
    /// Current status.
    pub status: CredentialStatus,
    /// The signed artifact.
    pub payload: Value,
    /// When the record was created.
    pub issued_at: DateTime<Utc>,
}

/// A revocation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationRecord {
    /// Entry identifier.
    pub revoc_id: RevocationId,
    /// Revoked credential.
    pub cred_id: CredentialId,
    /// When it was revoked.
    pub revoked_at: DateTime<Utc>,
    /// Free-text reason.
    pub reason: Option<String>,
}

/// Result of an atomic revoke attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    /// Status flipped and revocation row written.
    Revoked,
    /// The credential does not exist or was not issued by the caller.
    NotOwned,
    /// Already revoked; nothing written.
    AlreadyRevoked,
}

/// Aggregate counts for one issuer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssuerStats {
    /// Credentials issued.
    pub credentials_issued: u64,
    /// Distinct holders issued to.
    pub active_students: u64,
    /// Revocation rows against the issuer's credentials.
    pub revoked_credentials: u64,
}

/// One recent issuance, for the activity feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuanceEvent {
    /// Credential title.
    pub title: String,
    /// Holder's email.
    pub holder_email: String,
    /// When it was issued.
    pub issued_at: DateTime<Utc>,
}
