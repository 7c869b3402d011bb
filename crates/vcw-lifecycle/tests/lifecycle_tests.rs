//! End-to-end behaviour of the lifecycle core against the in-memory store,
//! with a call-counting signer wrapped around the real Ed25519 signer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use vcw_core::{CredentialId, UserId};
use vcw_crypto::KeyMaterial;
use vcw_lifecycle::{
    AuthenticatedPrincipal, ClaimInput, CredentialLifecycle, CredentialRecord, CredentialStatus,
    CredentialStore, IssuanceEvent, IssuerRef, IssuerStats, LifecycleConfig, LifecycleError,
    MemoryStore, RevocationRecord, RevokeOutcome, Role, StoreError, UserRecord,
};
use vcw_vc::{
    Artifact, ArtifactKind, CredentialSigner, DisclosureFrame, Ed25519Signer, ProofPurpose,
    SigningError,
};

// ── Collaborator doubles ────────────────────────────────────────────────

#[derive(Debug, Default)]
struct CountingSigner {
    inner: Ed25519Signer,
    signs: AtomicUsize,
    verifies: AtomicUsize,
    delay: Option<Duration>,
}

impl CountingSigner {
    fn signs(&self) -> usize {
        self.signs.load(Ordering::SeqCst)
    }

    fn verifies(&self) -> usize {
        self.verifies.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialSigner for CountingSigner {
    async fn sign(
        &self,
        payload: Artifact,
        purpose: ProofPurpose,
        key: &KeyMaterial,
    ) -> Result<Artifact, SigningError> {
        self.signs.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.sign(payload, purpose, key).await
    }

    async fn verify(&self, artifact: &Artifact, purpose: ProofPurpose) -> Vec<String> {
        self.verifies.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(artifact, purpose).await
    }

    fn derive_verification_method(&self, key: &KeyMaterial) -> Result<String, SigningError> {
        self.inner.derive_verification_method(key)
    }

    fn derive_subject_identifier(&self, key: &KeyMaterial) -> Result<String, SigningError> {
        self.inner.derive_subject_identifier(key)
    }

    fn generate_key(&self) -> KeyMaterial {
        self.inner.generate_key()
    }
}

/// Fails the first `failures` credential inserts with `Unavailable`. With
/// `blind_prechecks`, the dedup existence queries always answer `false`,
/// leaving the insert constraint as the only guard.
#[derive(Debug)]
struct FlakyStore {
    inner: MemoryStore,
    failures: AtomicUsize,
    inserts: AtomicUsize,
    blind_prechecks: bool,
}

impl FlakyStore {
    fn new(failures: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            failures: AtomicUsize::new(failures),
            inserts: AtomicUsize::new(0),
            blind_prechecks: false,
        }
    }

    fn blind() -> Self {
        Self {
            blind_prechecks: true,
            ..Self::new(0)
        }
    }
}

#[async_trait]
impl CredentialStore for FlakyStore {
    async fn insert_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        self.inner.insert_user(user).await
    }
    async fn user_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        self.inner.user_by_id(id).await
    }
    async fn user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        self.inner.user_by_email(email).await
    }
    async fn users_without_key(&self) -> Result<Vec<UserId>, StoreError> {
        self.inner.users_without_key().await
    }
    async fn set_signing_key_if_absent(
        &self,
        id: UserId,
        key: &KeyMaterial,
    ) -> Result<bool, StoreError> {
        self.inner.set_signing_key_if_absent(id, key).await
    }
    async fn insert_credential(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Unavailable("connection reset".into()));
        }
        self.inner.insert_credential(record).await
    }
    async fn credential(&self, id: CredentialId) -> Result<Option<CredentialRecord>, StoreError> {
        self.inner.credential(id).await
    }
    async fn exists(&self, holder: UserId, fingerprint: &str) -> Result<bool, StoreError> {
        if self.blind_prechecks {
            return Ok(false);
        }
        self.inner.exists(holder, fingerprint).await
    }
    async fn fingerprint_exists(&self, fingerprint: &str) -> Result<bool, StoreError> {
        if self.blind_prechecks {
            return Ok(false);
        }
        self.inner.fingerprint_exists(fingerprint).await
    }
    async fn credentials_for_holder(
        &self,
        holder: UserId,
    ) -> Result<Vec<CredentialRecord>, StoreError> {
        self.inner.credentials_for_holder(holder).await
    }
    async fn revoke(
        &self,
        issuer: UserId,
        revocation: &RevocationRecord,
    ) -> Result<RevokeOutcome, StoreError> {
        self.inner.revoke(issuer, revocation).await
    }
    async fn revocations_for(
        &self,
        cred_id: CredentialId,
    ) -> Result<Vec<RevocationRecord>, StoreError> {
        self.inner.revocations_for(cred_id).await
    }
    async fn issuer_stats(&self, issuer: UserId) -> Result<IssuerStats, StoreError> {
        self.inner.issuer_stats(issuer).await
    }
    async fn recent_issuances(
        &self,
        issuer: UserId,
        limit: usize,
    ) -> Result<Vec<IssuanceEvent>, StoreError> {
        self.inner.recent_issuances(issuer, limit).await
    }
}

// ── Fixtures ────────────────────────────────────────────────────────────

struct World {
    core: CredentialLifecycle,
    signer: Arc<CountingSigner>,
    store: Arc<MemoryStore>,
    issuer: AuthenticatedPrincipal,
    holder: AuthenticatedPrincipal,
}

async fn world() -> World {
    let signer = Arc::new(CountingSigner::default());
    let store = Arc::new(MemoryStore::new());
    let core = CredentialLifecycle::new(store.clone(), signer.clone(), LifecycleConfig::default());
    let issuer = core
        .register_user("registrar@ua.pt", "h".into(), Role::Issuer)
        .await
        .unwrap();
    let holder = core
        .register_user("student@ua.pt", "h".into(), Role::Holder)
        .await
        .unwrap();
    World {
        core,
        signer,
        store,
        issuer: AuthenticatedPrincipal::new(issuer.user_id, Role::Issuer),
        holder: AuthenticatedPrincipal::new(holder.user_id, Role::Holder),
    }
}

fn claim() -> ClaimInput {
    ClaimInput {
        holder_email: "student@ua.pt".into(),
        name: "Beatriz".into(),
        course: "Operating Systems".into(),
        grade: "17".into(),
        completion_date: "2025-01-31".into(),
        university: None,
    }
}

fn frame(fields: &[&str]) -> DisclosureFrame {
    DisclosureFrame::new(fields.iter().copied())
}

// ── Issue ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn issued_credential_verifies_and_is_stored() {
    let w = world().await;
    let issued = w.core.issue(&w.issuer, &claim()).await.unwrap();

    assert_eq!(issued.document["type"], json!(["VerifiableCredential", "OperatingSystems"]));
    assert_eq!(issued.document["credentialSubject"]["university"], "Universidade de Aveiro");
    assert!(issued.document["credentialSubject"]["id"]
        .as_str()
        .unwrap()
        .starts_with("did:key:z"));

    let report = w.core.verify(issued.document.clone()).await.unwrap();
    assert!(report.verified, "{:?}", report.errors);
    assert_eq!(report.kind, ArtifactKind::Credential);

    let stored = w.store.credential(issued.cred_id).await.unwrap().unwrap();
    assert_eq!(stored.status, CredentialStatus::Active);
    assert_eq!(stored.title, "OperatingSystems");
    assert_eq!(stored.issuer, IssuerRef::User(w.issuer.user_id));
    assert_eq!(stored.payload, issued.document);
}

#[tokio::test]
async fn duplicate_issuance_is_rejected_without_signing() {
    let w = world().await;
    w.core.issue(&w.issuer, &claim()).await.unwrap();
    assert_eq!(w.signer.signs(), 1);

    let err = w.core.issue(&w.issuer, &claim()).await.unwrap_err();
    assert!(matches!(err, LifecycleError::DuplicateCredential));
    assert_eq!(w.signer.signs(), 1);
    assert_eq!(w.store.credential_count(), 1);
}

#[tokio::test]
async fn different_grade_is_a_different_fact() {
    let w = world().await;
    w.core.issue(&w.issuer, &claim()).await.unwrap();
    let mut regraded = claim();
    regraded.grade = "18".into();
    w.core.issue(&w.issuer, &regraded).await.unwrap();
    assert_eq!(w.store.credential_count(), 2);
}

#[tokio::test]
async fn holder_cannot_issue_and_nothing_happens() {
    let w = world().await;
    let err = w.core.issue(&w.holder, &claim()).await.unwrap_err();
    assert!(matches!(err, LifecycleError::Forbidden(_)));
    assert_eq!(w.signer.signs(), 0);
    assert_eq!(w.store.credential_count(), 0);
}

#[tokio::test]
async fn issue_validates_input_and_holder() {
    let w = world().await;

    let mut future = claim();
    future.completion_date = "2999-01-01".into();
    assert!(matches!(
        w.core.issue(&w.issuer, &future).await,
        Err(LifecycleError::Validation(_))
    ));

    let mut unknown = claim();
    unknown.holder_email = "nobody@ua.pt".into();
    assert!(matches!(
        w.core.issue(&w.issuer, &unknown).await,
        Err(LifecycleError::HolderNotFound(_))
    ));

    let mut to_issuer = claim();
    to_issuer.holder_email = "registrar@ua.pt".into();
    assert!(matches!(
        w.core.issue(&w.issuer, &to_issuer).await,
        Err(LifecycleError::HolderNotFound(_))
    ));
    assert_eq!(w.signer.signs(), 0);
}

#[tokio::test]
async fn issuer_without_key_is_reported() {
    let store = Arc::new(MemoryStore::new());
    let signer = Arc::new(CountingSigner::default());
    let core = CredentialLifecycle::new(store.clone(), signer.clone(), LifecycleConfig::default());
    let issuer = UserRecord {
        user_id: UserId::new(),
        email: "keyless@ua.pt".into(),
        password_hash: "h".into(),
        role: Role::Issuer,
        signing_key: None,
        created_at: chrono::Utc::now(),
    };
    store.insert_user(&issuer).await.unwrap();
    core.register_user("student@ua.pt", "h".into(), Role::Holder)
        .await
        .unwrap();

    let principal = AuthenticatedPrincipal::new(issuer.user_id, Role::Issuer);
    assert!(matches!(
        core.issue(&principal, &claim()).await,
        Err(LifecycleError::IssuerKeyMissing(id)) if id == issuer.user_id
    ));
    assert_eq!(signer.signs(), 0);

    assert_eq!(core.backfill_keys().await.unwrap(), 1);
    assert_eq!(core.backfill_keys().await.unwrap(), 0);
    core.issue(&principal, &claim()).await.unwrap();
}

#[tokio::test]
async fn transient_store_failure_resigns_and_retries() {
    let signer = Arc::new(CountingSigner::default());
    let store = Arc::new(FlakyStore::new(1));
    let core = CredentialLifecycle::new(store.clone(), signer.clone(), LifecycleConfig::default());
    let issuer = core
        .register_user("registrar@ua.pt", "h".into(), Role::Issuer)
        .await
        .unwrap();
    core.register_user("student@ua.pt", "h".into(), Role::Holder)
        .await
        .unwrap();

    let principal = AuthenticatedPrincipal::new(issuer.user_id, Role::Issuer);
    core.issue(&principal, &claim()).await.unwrap();
    assert_eq!(signer.signs(), 2);
    assert_eq!(store.inserts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn persistent_store_failure_surfaces_after_bounded_retries() {
    let signer = Arc::new(CountingSigner::default());
    let store = Arc::new(FlakyStore::new(10));
    let config = LifecycleConfig {
        store_retries: 2,
        ..LifecycleConfig::default()
    };
    let core = CredentialLifecycle::new(store.clone(), signer.clone(), config);
    let issuer = core
        .register_user("registrar@ua.pt", "h".into(), Role::Issuer)
        .await
        .unwrap();
    core.register_user("student@ua.pt", "h".into(), Role::Holder)
        .await
        .unwrap();

    let principal = AuthenticatedPrincipal::new(issuer.user_id, Role::Issuer);
    let err = core.issue(&principal, &claim()).await.unwrap_err();
    assert!(matches!(err, LifecycleError::StoreUnavailable(_)));
    assert_eq!(store.inserts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn insert_constraint_catches_duplicates_the_prechecks_miss() {
    let store = Arc::new(FlakyStore::blind());
    let signer = Arc::new(CountingSigner::default());
    let core = CredentialLifecycle::new(store.clone(), signer.clone(), LifecycleConfig::default());
    let issuer = core
        .register_user("registrar@ua.pt", "h".into(), Role::Issuer)
        .await
        .unwrap();
    let holder = core
        .register_user("student@ua.pt", "h".into(), Role::Holder)
        .await
        .unwrap();
    let issuer = AuthenticatedPrincipal::new(issuer.user_id, Role::Issuer);
    let holder = AuthenticatedPrincipal::new(holder.user_id, Role::Holder);

    let issued = core.issue(&issuer, &claim()).await.unwrap();
    assert!(matches!(
        core.issue(&issuer, &claim()).await,
        Err(LifecycleError::DuplicateCredential)
    ));
    assert_eq!(signer.signs(), 2);
    assert_eq!(store.inner.credential_count(), 1);

    let raw = serde_json::to_vec(&issued.document).unwrap();
    core.import(&holder, &raw).await.unwrap();
    assert!(matches!(
        core.import(&holder, &raw).await,
        Err(LifecycleError::DuplicateCredential)
    ));
    assert_eq!(store.inner.credential_count(), 2);
    assert_eq!(store.inserts.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn slow_signer_maps_to_signing_unavailable() {
    let signer = Arc::new(CountingSigner {
        delay: Some(Duration::from_millis(200)),
        ..CountingSigner::default()
    });
    let store = Arc::new(MemoryStore::new());
    let config = LifecycleConfig {
        signing_timeout: Duration::from_millis(20),
        ..LifecycleConfig::default()
    };
    let core = CredentialLifecycle::new(store.clone(), signer, config);
    let issuer = core
        .register_user("registrar@ua.pt", "h".into(), Role::Issuer)
        .await
        .unwrap();
    core.register_user("student@ua.pt", "h".into(), Role::Holder)
        .await
        .unwrap();

    let principal = AuthenticatedPrincipal::new(issuer.user_id, Role::Issuer);
    assert!(matches!(
        core.issue(&principal, &claim()).await,
        Err(LifecycleError::SigningUnavailable(_))
    ));
    assert_eq!(store.credential_count(), 0);
}

// ── Presentation ────────────────────────────────────────────────────────

#[tokio::test]
async fn presentation_discloses_only_requested_fields_and_verifies() {
    let w = world().await;
    let issued = w.core.issue(&w.issuer, &claim()).await.unwrap();

    let vp = w
        .core
        .create_presentation(&w.holder, issued.cred_id, &frame(&["grade", "shoeSize"]))
        .await
        .unwrap();

    let embedded = &vp["verifiableCredential"][0];
    assert_eq!(embedded["credentialSubject"], json!({"grade": "17"}));
    for field in ["@context", "id", "type", "issuer", "issuanceDate"] {
        assert_eq!(embedded[field], issued.document[field], "{field}");
    }
    assert_eq!(vp["proof"]["proofPurpose"], "authentication");

    let report = w.core.verify(vp).await.unwrap();
    assert!(report.verified, "{:?}", report.errors);
    assert_eq!(report.kind, ArtifactKind::Presentation);
    assert_eq!(w.store.credential_count(), 1);
}

#[tokio::test]
async fn presentation_by_non_owner_is_forbidden() {
    let w = world().await;
    let issued = w.core.issue(&w.issuer, &claim()).await.unwrap();
    let stranger = w
        .core
        .register_user("other@ua.pt", "h".into(), Role::Holder)
        .await
        .unwrap();
    let stranger = AuthenticatedPrincipal::new(stranger.user_id, Role::Holder);

    let signs_before = w.signer.signs();
    let not_yours = w
        .core
        .create_presentation(&stranger, issued.cred_id, &frame(&["name"]))
        .await
        .unwrap_err();
    let missing = w
        .core
        .create_presentation(&w.holder, CredentialId::new(), &frame(&["name"]))
        .await
        .unwrap_err();
    assert_eq!(not_yours.to_string(), missing.to_string());
    assert!(matches!(not_yours, LifecycleError::Forbidden(_)));
    assert_eq!(w.signer.signs(), signs_before);
}

// ── Import ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn import_stores_external_credential_once_system_wide() {
    let w = world().await;
    let issued = w.core.issue(&w.issuer, &claim()).await.unwrap();
    let raw = serde_json::to_vec(&issued.document).unwrap();

    let record = w.core.import(&w.holder, &raw).await.unwrap();
    assert_eq!(record.issuer, IssuerRef::External);
    assert_eq!(record.category, ArtifactKind::Credential);
    assert_eq!(record.title, "OperatingSystems");

    let other = w
        .core
        .register_user("other@ua.pt", "h".into(), Role::Holder)
        .await
        .unwrap();
    let other = AuthenticatedPrincipal::new(other.user_id, Role::Holder);
    assert!(matches!(
        w.core.import(&other, &raw).await,
        Err(LifecycleError::DuplicateCredential)
    ));
}

#[tokio::test]
async fn import_of_presentation_is_titled_presentation() {
    let w = world().await;
    let issued = w.core.issue(&w.issuer, &claim()).await.unwrap();
    let vp = w
        .core
        .create_presentation(&w.holder, issued.cred_id, &frame(&["name"]))
        .await
        .unwrap();
    let record = w
        .core
        .import(&w.holder, &serde_json::to_vec(&vp).unwrap())
        .await
        .unwrap();
    assert_eq!(record.category, ArtifactKind::Presentation);
    assert_eq!(record.title, "Presentation");

    assert!(matches!(
        w.core
            .create_presentation(&w.holder, record.cred_id, &frame(&["name"]))
            .await,
        Err(LifecycleError::Validation(_))
    ));
}

#[tokio::test]
async fn tampered_import_is_rejected_and_not_stored() {
    let w = world().await;
    let issued = w.core.issue(&w.issuer, &claim()).await.unwrap();
    let mut forged = issued.document.clone();
    forged["credentialSubject"]["grade"] = json!("20");

    let err = w
        .core
        .import(&w.holder, &serde_json::to_vec(&forged).unwrap())
        .await
        .unwrap_err();
    match err {
        LifecycleError::InvalidArtifact { errors } => assert!(!errors.is_empty()),
        other => panic!("expected InvalidArtifact, got {other:?}"),
    }
    assert_eq!(w.store.credential_count(), 1);
}

#[tokio::test]
async fn unrecognized_type_never_reaches_the_signer() {
    let w = world().await;
    let doc: Value = json!({"type": ["UniversityDegree"], "issuer": "did:key:z"});
    let raw = serde_json::to_vec(&doc).unwrap();

    assert!(matches!(
        w.core.import(&w.holder, &raw).await,
        Err(LifecycleError::UnrecognizedArtifactType(_))
    ));
    assert!(matches!(
        w.core.verify(doc).await,
        Err(LifecycleError::UnrecognizedArtifactType(_))
    ));
    assert_eq!(w.signer.verifies(), 0);
}

#[tokio::test]
async fn import_requires_holder_and_json_object() {
    let w = world().await;
    assert!(matches!(
        w.core.import(&w.issuer, b"{}").await,
        Err(LifecycleError::Forbidden(_))
    ));
    assert!(matches!(
        w.core.import(&w.holder, b"not json").await,
        Err(LifecycleError::Validation(_))
    ));
    assert!(matches!(
        w.core.import(&w.holder, b"[1,2]").await,
        Err(LifecycleError::Validation(_))
    ));
}

// ── Verify dispatch ─────────────────────────────────────────────────────

#[tokio::test]
async fn verification_failure_is_reported_not_raised() {
    let w = world().await;
    let report = w
        .core
        .verify(json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiableCredential"],
            "issuer": "did:key:z6Mk",
            "issuanceDate": "2026-01-01T00:00:00Z",
            "credentialSubject": {}
        }))
        .await
        .unwrap();
    assert!(!report.verified);
    assert_eq!(report.errors, vec!["no proof attached".to_string()]);
}

// ── Revoke & dashboard ──────────────────────────────────────────────────

#[tokio::test]
async fn revocation_flips_status_writes_row_and_counts_once() {
    let w = world().await;
    let issued = w.core.issue(&w.issuer, &claim()).await.unwrap();
    let before = w.core.dashboard(&w.issuer).await.unwrap();

    w.core
        .revoke(&w.issuer, issued.cred_id, Some("grading error".into()))
        .await
        .unwrap();

    let stored = w.store.credential(issued.cred_id).await.unwrap().unwrap();
    assert_eq!(stored.status, CredentialStatus::Revoked);
    let rows = w.store.revocations_for(issued.cred_id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].reason.as_deref(), Some("grading error"));

    let after = w.core.dashboard(&w.issuer).await.unwrap();
    assert_eq!(
        after.stats.revoked_credentials,
        before.stats.revoked_credentials + 1
    );

    assert!(matches!(
        w.core.revoke(&w.issuer, issued.cred_id, None).await,
        Err(LifecycleError::AlreadyRevoked(_))
    ));
    assert_eq!(
        w.core.dashboard(&w.issuer).await.unwrap().stats.revoked_credentials,
        after.stats.revoked_credentials
    );
    assert!(matches!(
        w.core
            .create_presentation(&w.holder, issued.cred_id, &frame(&["name"]))
            .await,
        Err(LifecycleError::Validation(_))
    ));
}

#[tokio::test]
async fn revocation_reaches_imported_copies() {
    let w = world().await;
    let issued = w.core.issue(&w.issuer, &claim()).await.unwrap();
    let early_vp = w
        .core
        .create_presentation(&w.holder, issued.cred_id, &frame(&["name"]))
        .await
        .unwrap();
    let copy = w
        .core
        .import(&w.holder, &serde_json::to_vec(&issued.document).unwrap())
        .await
        .unwrap();

    w.core.revoke(&w.issuer, issued.cred_id, None).await.unwrap();

    let err = w
        .core
        .create_presentation(&w.holder, copy.cred_id, &frame(&["name"]))
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Validation(_)));

    // Different bytes, same credential: still refused after revocation.
    let reformatted = serde_json::to_vec_pretty(&issued.document).unwrap();
    assert!(matches!(
        w.core.import(&w.holder, &reformatted).await,
        Err(LifecycleError::Validation(_))
    ));
    assert!(matches!(
        w.core
            .import(&w.holder, &serde_json::to_vec(&early_vp).unwrap())
            .await,
        Err(LifecycleError::Validation(_))
    ));
    assert_eq!(w.store.credential_count(), 2);
}

#[tokio::test]
async fn only_the_issuing_issuer_can_revoke() {
    let w = world().await;
    let issued = w.core.issue(&w.issuer, &claim()).await.unwrap();
    let rival = w
        .core
        .register_user("rival@ua.pt", "h".into(), Role::Issuer)
        .await
        .unwrap();
    let rival = AuthenticatedPrincipal::new(rival.user_id, Role::Issuer);

    assert!(matches!(
        w.core.revoke(&rival, issued.cred_id, None).await,
        Err(LifecycleError::Forbidden(_))
    ));
    assert!(matches!(
        w.core.revoke(&w.holder, issued.cred_id, None).await,
        Err(LifecycleError::Forbidden(_))
    ));
    assert!(w.store.revocations_for(issued.cred_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn dashboard_aggregates_issuer_activity() {
    let w = world().await;
    w.core.issue(&w.issuer, &claim()).await.unwrap();
    let mut second = claim();
    second.course = "Compilers".into();
    w.core.issue(&w.issuer, &second).await.unwrap();

    let dash = w.core.dashboard(&w.issuer).await.unwrap();
    assert_eq!(dash.stats.credentials_issued, 2);
    assert_eq!(dash.stats.active_students, 1);
    assert_eq!(dash.stats.revoked_credentials, 0);
    assert_eq!(dash.recent_activity.len(), 2);
    assert!(dash
        .recent_activity
        .contains(&"Issued \"Compilers\" to student@ua.pt".to_string()));

    assert!(matches!(
        w.core.dashboard(&w.holder).await,
        Err(LifecycleError::Forbidden(_))
    ));
}

#[tokio::test]
async fn registration_rejects_taken_email_case_insensitively() {
    let w = world().await;
    assert!(matches!(
        w.core
            .register_user("Student@UA.pt", "h".into(), Role::Holder)
            .await,
        Err(LifecycleError::EmailTaken(_))
    ));
    let listed = w.core.list_credentials(&w.holder).await.unwrap();
    assert!(listed.is_empty());
}
