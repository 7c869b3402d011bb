//! # Credential Lifecycle
//!
//! Orchestration of issuance, import, presentation, verification and
//! revocation over a [`CredentialStore`] and a [`CredentialSigner`].
//!
//! ## Commit point
//!
//! Signing is side-effect free; the store insert is the only commit. When
//! the insert fails transiently after a successful signature, issuance
//! signs again and retries, up to [`LifecycleConfig::store_retries`] times,
//! then surfaces `StoreUnavailable`. No store lock or connection is held
//! while the signer runs.
//!
//! ## Dedup
//!
//! The pre-checks here are early exits only. The store's uniqueness
//! constraint is the guard, and a `UniqueViolation` on insert is reported
//! as `DuplicateCredential` exactly like a pre-check hit.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use vcw_core::{CredentialId, RevocationId, Timestamp, UserId};
use vcw_crypto::KeyMaterial;
use vcw_vc::{
    redact, Artifact, ArtifactKind, CredentialSigner, DisclosureFrame, ProofPurpose,
    VerifiablePresentation,
};

use crate::claim::ClaimInput;
use crate::config::LifecycleConfig;
use crate::dashboard::{issuer_dashboard, DashboardData};
use crate::error::LifecycleError;
use crate::fingerprint::{artifact_fingerprint, semantic_fingerprint};
use crate::principal::{AuthenticatedPrincipal, Role};
use crate::record::{
    CredentialRecord, CredentialStatus, IssuerRef, RevocationRecord, RevokeOutcome, UserRecord,
};
use crate::store::{CredentialStore, StoreError};

/// A freshly issued credential.
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    /// Stored record id.
    pub cred_id: CredentialId,
    /// Semantic fingerprint the record is stored under.
    pub fingerprint: String,
    /// The signed credential.
    pub document: Value,
}

/// Outcome of [`CredentialLifecycle::verify`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    /// Classified kind.
    pub kind: ArtifactKind,
    /// True when `errors` is empty.
    pub verified: bool,
    /// Verification messages.
    pub errors: Vec<String>,
}

/// The lifecycle core. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CredentialLifecycle {
    store: Arc<dyn CredentialStore>,
    signer: Arc<dyn CredentialSigner>,
    config: LifecycleConfig,
}

impl CredentialLifecycle {
    /// Assemble the core from its collaborators.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        signer: Arc<dyn CredentialSigner>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            store,
            signer,
            config,
        }
    }

    /// The configured store.
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// The configured signer.
    pub fn signer(&self) -> &Arc<dyn CredentialSigner> {
        &self.signer
    }

    /// Active configuration.
    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    // ── Users ───────────────────────────────────────────────────────────

    /// Create a user with a freshly generated signing key.
    ///
    /// `password_hash` is stored as given. Email is trimmed and lowercased.
    pub async fn register_user(
        &self,
        email: &str,
        password_hash: String,
        role: Role,
    ) -> Result<UserRecord, LifecycleError> {
        let email = normalize_email(email)?;
        let user = UserRecord {
            user_id: UserId::new(),
            email: email.clone(),
            password_hash,
            role,
            signing_key: Some(self.signer.generate_key()),
            created_at: *Timestamp::now().as_datetime(),
        };
        match self.store.insert_user(&user).await {
            Ok(()) => {
                tracing::info!(user_id = %user.user_id, %role, "user registered");
                Ok(user)
            }
            Err(StoreError::UniqueViolation(_)) => Err(LifecycleError::EmailTaken(email)),
            Err(e) => Err(e.into()),
        }
    }

    /// Look up a user by id.
    pub async fn user(&self, id: UserId) -> Result<Option<UserRecord>, LifecycleError> {
        Ok(self.store.user_by_id(id).await?)
    }

    /// Look up a user by email, normalized the same way as registration.
    pub async fn user_by_email(&self, email: &str) -> Result<Option<UserRecord>, LifecycleError> {
        let Ok(email) = normalize_email(email) else {
            return Ok(None);
        };
        Ok(self.store.user_by_email(&email).await?)
    }

    /// Generate keys for every user that lacks one. Safe to rerun.
    pub async fn backfill_keys(&self) -> Result<usize, LifecycleError> {
        let mut filled = 0;
        for id in self.store.users_without_key().await? {
            let key = self.signer.generate_key();
            if self.store.set_signing_key_if_absent(id, &key).await? {
                tracing::info!(user_id = %id, "signing key backfilled");
                filled += 1;
            }
        }
        Ok(filled)
    }

    // ── Issue ───────────────────────────────────────────────────────────

    /// Issue a credential to the holder named in `claim`.
    pub async fn issue(
        &self,
        principal: &AuthenticatedPrincipal,
        claim: &ClaimInput,
    ) -> Result<IssuedCredential, LifecycleError> {
        principal.require(Role::Issuer)?;
        let today = Utc::now().date_naive();
        let (holder_email, fields) = claim.validate(today, &self.config.default_university)?;

        let holder = self
            .user_by_email(&holder_email)
            .await?
            .filter(|u| u.role == Role::Holder)
            .ok_or_else(|| LifecycleError::HolderNotFound(holder_email.clone()))?;

        let fingerprint = semantic_fingerprint(principal.user_id, holder.user_id, &fields)
            .map_err(|e| LifecycleError::InternalInconsistency(e.to_string()))?;
        if self.store.exists(holder.user_id, &fingerprint).await? {
            tracing::warn!(holder_id = %holder.user_id, %fingerprint, "duplicate issuance rejected");
            return Err(LifecycleError::DuplicateCredential);
        }

        let issuer = self.store.user_by_id(principal.user_id).await?.ok_or_else(|| {
            LifecycleError::InternalInconsistency(format!(
                "issuer {} vanished during issuance",
                principal.user_id
            ))
        })?;
        let issuer_key = issuer
            .signing_key
            .ok_or(LifecycleError::IssuerKeyMissing(issuer.user_id))?;
        let holder_key = holder
            .signing_key
            .as_ref()
            .ok_or(LifecycleError::HolderKeyMissing(holder.user_id))?;
        let issuer_did = self.signer.derive_subject_identifier(&issuer_key)?;
        let subject_did = self.signer.derive_subject_identifier(holder_key)?;

        let cred_id = CredentialId::new();
        let title = fields.credential_type();
        let mut attempt = 0;
        loop {
            let issued_at = *Timestamp::now().as_datetime();
            let unsigned = fields
                .to_credential(cred_id, &issuer_did, &subject_did, issued_at)
                .to_document()
                .map_err(|e| LifecycleError::InternalInconsistency(e.to_string()))?;
            let signed = self
                .sign(
                    Artifact::Credential(unsigned),
                    ProofPurpose::AssertionMethod,
                    &issuer_key,
                )
                .await?
                .into_document();

            let record = CredentialRecord {
                cred_id,
                issuer: IssuerRef::User(issuer.user_id),
                holder_id: holder.user_id,
                category: ArtifactKind::Credential,
                fingerprint: fingerprint.clone(),
                title: title.clone(),
                status: CredentialStatus::Active,
                payload: signed.clone(),
                issued_at,
            };

            match self.store.insert_credential(&record).await {
                Ok(()) => {
                    tracing::info!(
                        %cred_id,
                        issuer_id = %issuer.user_id,
                        holder_id = %holder.user_id,
                        %fingerprint,
                        "credential issued"
                    );
                    return Ok(IssuedCredential {
                        cred_id,
                        fingerprint,
                        document: signed,
                    });
                }
                Err(StoreError::UniqueViolation(_)) => {
                    tracing::warn!(holder_id = %holder.user_id, %fingerprint, "duplicate issuance lost insert race");
                    return Err(LifecycleError::DuplicateCredential);
                }
                Err(StoreError::Unavailable(msg)) if attempt < self.config.store_retries => {
                    attempt += 1;
                    tracing::warn!(%cred_id, attempt, error = %msg, "store unavailable after signing, retrying");
                }
                Err(e) => {
                    tracing::error!(%cred_id, error = %e, "signed credential could not be persisted");
                    return Err(e.into());
                }
            }
        }
    }

    // ── Import ──────────────────────────────────────────────────────────

    /// Verify and store an externally signed credential or presentation.
    ///
    /// `raw` is the exact submitted bytes; the whole-artifact fingerprint is
    /// taken over them.
    pub async fn import(
        &self,
        principal: &AuthenticatedPrincipal,
        raw: &[u8],
    ) -> Result<CredentialRecord, LifecycleError> {
        principal.require(Role::Holder)?;
        let document: Value = serde_json::from_slice(raw)
            .map_err(|e| LifecycleError::Validation(format!("artifact is not valid JSON: {e}")))?;
        if !document.is_object() {
            return Err(LifecycleError::Validation(
                "artifact must be a JSON object".into(),
            ));
        }
        let artifact = Artifact::classify(document)?;

        let errors = self.verify_artifact(&artifact).await?;
        if !errors.is_empty() {
            tracing::warn!(holder_id = %principal.user_id, kind = %artifact.kind(), "import rejected: verification failed");
            return Err(LifecycleError::InvalidArtifact { errors });
        }

        if let Some(revoked) = self.revoked_origin(artifact.document()).await? {
            tracing::warn!(holder_id = %principal.user_id, cred_id = %revoked, "import rejected: credential revoked");
            return Err(LifecycleError::Validation(format!(
                "credential {revoked} has been revoked by its issuer"
            )));
        }

        let fingerprint = artifact_fingerprint(raw);
        if self.store.fingerprint_exists(&fingerprint).await? {
            tracing::warn!(%fingerprint, "duplicate import rejected");
            return Err(LifecycleError::DuplicateCredential);
        }

        let record = CredentialRecord {
            cred_id: CredentialId::new(),
            issuer: IssuerRef::External,
            holder_id: principal.user_id,
            category: artifact.kind(),
            fingerprint,
            title: artifact.title(),
            status: CredentialStatus::Active,
            issued_at: *Timestamp::now().as_datetime(),
            payload: artifact.into_document(),
        };
        match self.store.insert_credential(&record).await {
            Ok(()) => {
                tracing::info!(
                    cred_id = %record.cred_id,
                    holder_id = %record.holder_id,
                    category = %record.category,
                    fingerprint = %record.fingerprint,
                    "artifact imported"
                );
                Ok(record)
            }
            Err(StoreError::UniqueViolation(_)) => Err(LifecycleError::DuplicateCredential),
            Err(e) => Err(e.into()),
        }
    }

    // ── Presentation ────────────────────────────────────────────────────

    /// Derive a signed presentation revealing only `frame`'s attributes.
    ///
    /// Nothing is stored.
    pub async fn create_presentation(
        &self,
        principal: &AuthenticatedPrincipal,
        cred_id: CredentialId,
        frame: &DisclosureFrame,
    ) -> Result<Value, LifecycleError> {
        let record = self
            .store
            .credential(cred_id)
            .await?
            .filter(|c| c.holder_id == principal.user_id)
            .ok_or_else(|| {
                LifecycleError::Forbidden("credential not found or not held by caller".into())
            })?;
        if record.category != ArtifactKind::Credential {
            return Err(LifecycleError::Validation(
                "only credentials can be presented, not presentations".into(),
            ));
        }
        if record.status == CredentialStatus::Revoked
            || self.revoked_origin(&record.payload).await?.is_some()
        {
            return Err(LifecycleError::Validation(
                "revoked credentials cannot be presented".into(),
            ));
        }

        let holder = self
            .store
            .user_by_id(principal.user_id)
            .await?
            .ok_or_else(|| {
                LifecycleError::InternalInconsistency(format!(
                    "holder {} vanished during presentation",
                    principal.user_id
                ))
            })?;
        let key = holder
            .signing_key
            .ok_or(LifecycleError::HolderKeyMissing(holder.user_id))?;
        let holder_did = self.signer.derive_subject_identifier(&key)?;

        let redacted = redact(&record.payload, frame)
            .map_err(|e| LifecycleError::InternalInconsistency(e.to_string()))?;
        let envelope = VerifiablePresentation::wrap(vec![redacted], Some(holder_did))
            .to_document()
            .map_err(|e| LifecycleError::InternalInconsistency(e.to_string()))?;

        let signed = self
            .sign(
                Artifact::Presentation(envelope),
                ProofPurpose::Authentication,
                &key,
            )
            .await?;
        tracing::info!(%cred_id, holder_id = %holder.user_id, fields = frame.credential_subject.len(), "presentation created");
        Ok(signed.into_document())
    }

    // ── Verify ──────────────────────────────────────────────────────────

    /// Classify and verify an untrusted artifact.
    ///
    /// A failed verification is a normal outcome reported in the result.
    pub async fn verify(&self, document: Value) -> Result<VerificationReport, LifecycleError> {
        let artifact = Artifact::classify(document)?;
        let errors = self.verify_artifact(&artifact).await?;
        Ok(VerificationReport {
            kind: artifact.kind(),
            verified: errors.is_empty(),
            errors,
        })
    }

    // ── Revoke ──────────────────────────────────────────────────────────

    /// Revoke a credential the caller issued.
    pub async fn revoke(
        &self,
        principal: &AuthenticatedPrincipal,
        cred_id: CredentialId,
        reason: Option<String>,
    ) -> Result<RevocationRecord, LifecycleError> {
        principal.require(Role::Issuer)?;
        let revocation = RevocationRecord {
            revoc_id: RevocationId::new(),
            cred_id,
            revoked_at: *Timestamp::now().as_datetime(),
            reason: reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()),
        };
        match self.store.revoke(principal.user_id, &revocation).await? {
            RevokeOutcome::Revoked => {
                tracing::info!(%cred_id, issuer_id = %principal.user_id, "credential revoked");
                Ok(revocation)
            }
            RevokeOutcome::NotOwned => Err(LifecycleError::Forbidden(
                "credential not found or not issued by caller".into(),
            )),
            RevokeOutcome::AlreadyRevoked => Err(LifecycleError::AlreadyRevoked(cred_id)),
        }
    }

    // ── Read side ───────────────────────────────────────────────────────

    /// The caller's credentials, newest first.
    pub async fn list_credentials(
        &self,
        principal: &AuthenticatedPrincipal,
    ) -> Result<Vec<CredentialRecord>, LifecycleError> {
        principal.require(Role::Holder)?;
        Ok(self.store.credentials_for_holder(principal.user_id).await?)
    }

    /// The caller's issuer dashboard.
    pub async fn dashboard(
        &self,
        principal: &AuthenticatedPrincipal,
    ) -> Result<DashboardData, LifecycleError> {
        principal.require(Role::Issuer)?;
        Ok(issuer_dashboard(self.store.as_ref(), principal.user_id).await?)
    }

    // ── Revocation lookup ───────────────────────────────────────────────

    /// The first credential carried by `document` that was issued here and
    /// has since been revoked. Imported copies share the original's
    /// `urn:uuid:` id, so revocation reaches them through this lookup.
    async fn revoked_origin(
        &self,
        document: &Value,
    ) -> Result<Option<CredentialId>, LifecycleError> {
        let nested: Vec<&Value> = match document.get("verifiableCredential") {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(single @ Value::Object(_)) => vec![single],
            _ => Vec::new(),
        };
        let ids = std::iter::once(document)
            .chain(nested)
            .filter_map(|doc| doc.get("id")?.as_str()?.strip_prefix("urn:uuid:"))
            .filter_map(|id| id.parse::<CredentialId>().ok());

        for id in ids {
            if let Some(original) = self.store.credential(id).await? {
                if matches!(original.issuer, IssuerRef::User(_))
                    && original.status == CredentialStatus::Revoked
                {
                    return Ok(Some(id));
                }
            }
        }
        Ok(None)
    }

    // ── Signer calls ────────────────────────────────────────────────────

    async fn sign(
        &self,
        payload: Artifact,
        purpose: ProofPurpose,
        key: &KeyMaterial,
    ) -> Result<Artifact, LifecycleError> {
        match tokio::time::timeout(
            self.config.signing_timeout,
            self.signer.sign(payload, purpose, key),
        )
        .await
        {
            Ok(result) => Ok(result?),
            Err(_) => {
                tracing::warn!(timeout_ms = self.config.signing_timeout.as_millis() as u64, "signing timed out");
                Err(LifecycleError::SigningUnavailable(
                    "signing service timed out".into(),
                ))
            }
        }
    }

    async fn verify_artifact(&self, artifact: &Artifact) -> Result<Vec<String>, LifecycleError> {
        let purpose = artifact.kind().proof_purpose();
        tokio::time::timeout(
            self.config.signing_timeout,
            self.signer.verify(artifact, purpose),
        )
        .await
        .map_err(|_| {
            tracing::warn!("verification timed out");
            LifecycleError::SigningUnavailable("verification service timed out".into())
        })
    }
}

fn normalize_email(raw: &str) -> Result<String, LifecycleError> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(LifecycleError::Validation(format!(
            "'{}' is not a valid email address",
            raw.trim()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  Ana@UA.pt ").unwrap(), "ana@ua.pt");
        for bad in ["", "ana", "@ua.pt", "ana@"] {
            assert!(normalize_email(bad).is_err(), "{bad}");
        }
    }
}
