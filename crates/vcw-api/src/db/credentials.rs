//! Credential and revocation persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `credentials` and
//! `revocations` tables.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use vcw_core::{CredentialId, RevocationId, UserId};
use vcw_lifecycle::{
    CredentialRecord, CredentialStatus, IssuanceEvent, IssuerRef, IssuerStats, RevocationRecord,
    RevokeOutcome, StoreError,
};
use vcw_vc::ArtifactKind;

const CREDENTIAL_COLUMNS: &str = "cred_id, issuer_id, holder_id, category, content_fingerprint, \
     title, status, payload, issued_at";

/// Insert a credential. A duplicate `(holder_id, content_fingerprint)`
/// fails with SQLSTATE 23505.
pub async fn insert(pool: &PgPool, record: &CredentialRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO credentials (cred_id, issuer_id, holder_id, category, content_fingerprint,
         title, status, payload, issued_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(record.cred_id.as_uuid())
    .bind(record.issuer.user_id().map(|id| *id.as_uuid()))
    .bind(record.holder_id.as_uuid())
    .bind(record.category.as_str())
    .bind(&record.fingerprint)
    .bind(&record.title)
    .bind(record.status.as_str())
    .bind(&record.payload)
    .bind(record.issued_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch a credential by id.
pub async fn get_by_id(
    pool: &PgPool,
    id: CredentialId,
) -> Result<Option<CredentialRow>, sqlx::Error> {
    sqlx::query_as::<_, CredentialRow>(&format!(
        "SELECT {CREDENTIAL_COLUMNS} FROM credentials WHERE cred_id = $1"
    ))
    .bind(id.as_uuid())
    .fetch_optional(pool)
    .await
}

/// Whether `holder` holds a credential with `fingerprint`.
pub async fn exists_for_holder(
    pool: &PgPool,
    holder: UserId,
    fingerprint: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM credentials
         WHERE holder_id = $1 AND content_fingerprint = $2)",
    )
    .bind(holder.as_uuid())
    .bind(fingerprint)
    .fetch_one(pool)
    .await
}

/// Whether any holder holds a credential with `fingerprint`.
pub async fn exists_anywhere(pool: &PgPool, fingerprint: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM credentials WHERE content_fingerprint = $1)",
    )
    .bind(fingerprint)
    .fetch_one(pool)
    .await
}

/// A holder's credentials, newest first.
pub async fn list_for_holder(
    pool: &PgPool,
    holder: UserId,
) -> Result<Vec<CredentialRow>, sqlx::Error> {
    sqlx::query_as::<_, CredentialRow>(&format!(
        "SELECT {CREDENTIAL_COLUMNS} FROM credentials
         WHERE holder_id = $1 ORDER BY issued_at DESC, cred_id"
    ))
    .bind(holder.as_uuid())
    .fetch_all(pool)
    .await
}

/// Revoke in one transaction: lock the credential row, check ownership and
/// status, flip the status and record the revocation.
pub async fn revoke(
    pool: &PgPool,
    issuer: UserId,
    revocation: &RevocationRecord,
) -> Result<RevokeOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let row: Option<(Option<Uuid>, String)> = sqlx::query_as(
        "SELECT issuer_id, status FROM credentials WHERE cred_id = $1 FOR UPDATE",
    )
    .bind(revocation.cred_id.as_uuid())
    .fetch_optional(&mut *tx)
    .await?;

    let outcome = match row {
        None => RevokeOutcome::NotOwned,
        Some((owner, _)) if owner != Some(*issuer.as_uuid()) => RevokeOutcome::NotOwned,
        Some((_, status)) if status == CredentialStatus::Revoked.as_str() => {
            RevokeOutcome::AlreadyRevoked
        }
        Some(_) => {
            sqlx::query("UPDATE credentials SET status = $1 WHERE cred_id = $2")
                .bind(CredentialStatus::Revoked.as_str())
                .bind(revocation.cred_id.as_uuid())
                .execute(&mut *tx)
                .await?;
            sqlx::query(
                "INSERT INTO revocations (revoc_id, cred_id, revoked_at, reason)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(revocation.revoc_id.as_uuid())
            .bind(revocation.cred_id.as_uuid())
            .bind(revocation.revoked_at)
            .bind(revocation.reason.as_deref())
            .execute(&mut *tx)
            .await?;
            RevokeOutcome::Revoked
        }
    };

    tx.commit().await?;
    Ok(outcome)
}

/// Revocation rows for a credential, oldest first.
pub async fn revocations_for(
    pool: &PgPool,
    cred_id: CredentialId,
) -> Result<Vec<RevocationRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RevocationRow>(
        "SELECT revoc_id, cred_id, revoked_at, reason FROM revocations
         WHERE cred_id = $1 ORDER BY revoked_at",
    )
    .bind(cred_id.as_uuid())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(RevocationRow::into_record).collect())
}

/// Issued, distinct-holder, and revoked counts for `issuer`.
pub async fn issuer_stats(pool: &PgPool, issuer: UserId) -> Result<IssuerStats, sqlx::Error> {
    let (issued, holders, revoked): (i64, i64, i64) = sqlx::query_as(
        "SELECT
            (SELECT COUNT(*) FROM credentials WHERE issuer_id = $1),
            (SELECT COUNT(DISTINCT holder_id) FROM credentials WHERE issuer_id = $1),
            (SELECT COUNT(*) FROM revocations r
               JOIN credentials c ON c.cred_id = r.cred_id
              WHERE c.issuer_id = $1)",
    )
    .bind(issuer.as_uuid())
    .fetch_one(pool)
    .await?;

    Ok(IssuerStats {
        credentials_issued: issued.max(0) as u64,
        active_students: holders.max(0) as u64,
        revoked_credentials: revoked.max(0) as u64,
    })
}

/// The issuer's latest issuances joined with holder emails.
pub async fn recent_issuances(
    pool: &PgPool,
    issuer: UserId,
    limit: usize,
) -> Result<Vec<IssuanceEvent>, sqlx::Error> {
    let rows: Vec<(String, String, DateTime<Utc>)> = sqlx::query_as(
        "SELECT c.title, u.email, c.issued_at
         FROM credentials c JOIN users u ON u.user_id = c.holder_id
         WHERE c.issuer_id = $1
         ORDER BY c.issued_at DESC
         LIMIT $2",
    )
    .bind(issuer.as_uuid())
    .bind(i64::try_from(limit).unwrap_or(i64::MAX))
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(title, holder_email, issued_at)| IssuanceEvent {
            title,
            holder_email,
            issued_at,
        })
        .collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
pub struct CredentialRow {
    cred_id: Uuid,
    issuer_id: Option<Uuid>,
    holder_id: Uuid,
    category: String,
    content_fingerprint: String,
    title: String,
    status: String,
    payload: serde_json::Value,
    issued_at: DateTime<Utc>,
}

impl CredentialRow {
    /// Convert to the lifecycle record, rejecting unknown enum strings.
    pub fn into_record(self) -> Result<CredentialRecord, StoreError> {
        let category = ArtifactKind::parse(&self.category).ok_or_else(|| {
            tracing::error!(cred_id = %self.cred_id, category = %self.category, "unknown credential category in database");
            StoreError::Corrupt(format!(
                "credential {} has unknown category '{}'",
                self.cred_id, self.category
            ))
        })?;
        let status = CredentialStatus::parse(&self.status).ok_or_else(|| {
            tracing::error!(cred_id = %self.cred_id, status = %self.status, "unknown credential status in database");
            StoreError::Corrupt(format!(
                "credential {} has unknown status '{}'",
                self.cred_id, self.status
            ))
        })?;
        Ok(CredentialRecord {
            cred_id: CredentialId::from_uuid(self.cred_id),
            issuer: IssuerRef::from(self.issuer_id.map(UserId::from_uuid)),
            holder_id: UserId::from_uuid(self.holder_id),
            category,
            fingerprint: self.content_fingerprint,
            title: self.title,
            status,
            payload: self.payload,
            issued_at: self.issued_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RevocationRow {
    revoc_id: Uuid,
    cred_id: Uuid,
    revoked_at: DateTime<Utc>,
    reason: Option<String>,
}

impl RevocationRow {
    fn into_record(self) -> RevocationRecord {
        RevocationRecord {
            revoc_id: RevocationId::from_uuid(self.revoc_id),
            cred_id: CredentialId::from_uuid(self.cred_id),
            revoked_at: self.revoked_at,
            reason: self.reason,
        }
    }
}
