//! # Credential Signing Service
//!
//! [`CredentialSigner`] is the seam the lifecycle core signs, verifies and
//! derives identifiers through. It never touches storage, and verification
//! failure is reported as a list of messages rather than an error.
//!
//! [`Ed25519Signer`] signs the JCS canonicalization of
//! `{"document": <artifact minus proof>, "proof": <proof minus proofValue>}`,
//! so the proof purpose, creation time and verification method are covered
//! by the signature along with the content.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use thiserror::Error;

use vcw_core::{CanonicalBytes, Timestamp};
use vcw_crypto::{
    did_key, public_key_from_did_url, verification_method, CryptoError, Ed25519KeyPair,
    Ed25519Signature, KeyMaterial,
};

use crate::artifact::Artifact;
use crate::credential::{VcError, VerifiableCredential};
use crate::presentation::VerifiablePresentation;
use crate::proof::{Proof, ProofPurpose, ProofType};

/// Errors raised while signing or deriving identifiers.
#[derive(Error, Debug)]
pub enum SigningError {
    /// The key material could not be used.
    #[error("key error: {0}")]
    Key(#[from] CryptoError),

    /// The payload could not be canonicalized or is not an object.
    #[error("payload error: {0}")]
    Payload(#[from] VcError),

    /// The payload already carries a proof.
    #[error("payload is already signed")]
    AlreadySigned,

    /// The signing backend could not be reached.
    #[error("signing backend unavailable: {0}")]
    Unavailable(String),
}

/// Signs and verifies credentials and presentations.
#[async_trait]
pub trait CredentialSigner: Send + Sync + std::fmt::Debug {
    /// Attach a proof made with `key` for `purpose`. The variant is kept.
    async fn sign(
        &self,
        payload: Artifact,
        purpose: ProofPurpose,
        key: &KeyMaterial,
    ) -> Result<Artifact, SigningError>;

    /// Check the artifact's proof. An empty list means valid.
    async fn verify(&self, artifact: &Artifact, purpose: ProofPurpose) -> Vec<String>;

    /// Verification method DID URL for `key`.
    fn derive_verification_method(&self, key: &KeyMaterial) -> Result<String, SigningError>;

    /// Subject identifier (DID) for `key`.
    fn derive_subject_identifier(&self, key: &KeyMaterial) -> Result<String, SigningError>;

    /// Fresh key material.
    fn generate_key(&self) -> KeyMaterial;
}

/// Canonical bytes a proof signs: the document without `proof`, together
/// with the proof options without `proofValue`.
pub fn signing_input(document: &Value, proof: &Proof) -> Result<CanonicalBytes, VcError> {
    let mut unsigned = document.as_object().ok_or(VcError::NotAnObject)?.clone();
    unsigned.remove("proof");

    let mut options = serde_json::to_value(proof)?;
    if let Some(obj) = options.as_object_mut() {
        obj.remove("proofValue");
    }

    Ok(CanonicalBytes::from_value(json!({
        "document": Value::Object(unsigned),
        "proof": options,
    }))?)
}

/// Ed25519 over JCS with `did:key` verification methods.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Signer;

impl Ed25519Signer {
    /// New signer.
    pub fn new() -> Self {
        Self
    }

    fn check_proof(document: &Value, proof: &Proof, purpose: ProofPurpose, signer_did: Option<&str>) -> Vec<String> {
        let mut errors = Vec::new();

        if proof.proof_purpose != purpose {
            errors.push(format!(
                "proof purpose '{}' does not match expected '{purpose}'",
                proof.proof_purpose
            ));
        }

        let public_key = match public_key_from_did_url(&proof.verification_method) {
            Ok(pk) => pk,
            Err(e) => {
                errors.push(e.to_string());
                return errors;
            }
        };

        if let Some(expected) = signer_did {
            let controller = proof.verification_method.split('#').next().unwrap_or_default();
            if controller != expected {
                errors.push(format!(
                    "verification method '{}' is not controlled by '{expected}'",
                    proof.verification_method
                ));
            }
        }

        let signature = match Ed25519Signature::from_multibase(&proof.proof_value) {
            Ok(sig) => sig,
            Err(e) => {
                errors.push(e.to_string());
                return errors;
            }
        };

        match signing_input(document, proof) {
            Ok(input) => {
                if let Err(e) = vcw_crypto::verify(&input, &signature, &public_key) {
                    errors.push(e.to_string());
                }
            }
            Err(e) => errors.push(e.to_string()),
        }
        errors
    }
}

#[async_trait]
impl CredentialSigner for Ed25519Signer {
    async fn sign(
        &self,
        payload: Artifact,
        purpose: ProofPurpose,
        key: &KeyMaterial,
    ) -> Result<Artifact, SigningError> {
        let kind = payload.kind();
        let mut document = payload.into_document();
        let obj = document.as_object_mut().ok_or(VcError::NotAnObject)?;
        if obj.contains_key("proof") {
            return Err(SigningError::AlreadySigned);
        }

        let keypair = Ed25519KeyPair::from_key_material(key)?;
        let mut proof = Proof {
            proof_type: ProofType::Ed25519Signature2020,
            created: *Timestamp::now().as_datetime(),
            verification_method: verification_method(&keypair.public_key()),
            proof_purpose: purpose,
            proof_value: String::new(),
        };
        let input = signing_input(&document, &proof)?;
        proof.proof_value = keypair.sign(&input).to_multibase();

        let proof_value = serde_json::to_value(&proof).map_err(VcError::from)?;
        if let Some(obj) = document.as_object_mut() {
            obj.insert("proof".to_string(), proof_value);
        }

        tracing::debug!(%kind, %purpose, "artifact signed");
        Ok(match kind {
            crate::ArtifactKind::Credential => Artifact::Credential(document),
            crate::ArtifactKind::Presentation => Artifact::Presentation(document),
        })
    }

    async fn verify(&self, artifact: &Artifact, purpose: ProofPurpose) -> Vec<String> {
        let document = artifact.document();

        // Structural check, and the DID the proof must be controlled by.
        let signer_did = match artifact {
            Artifact::Credential(doc) => match VerifiableCredential::from_document(doc) {
                Ok(vc) => {
                    if vc.is_expired_at(Utc::now()) {
                        return vec!["credential has expired".to_string()];
                    }
                    Some(vc.issuer)
                }
                Err(e) => return vec![e.to_string()],
            },
            Artifact::Presentation(doc) => match VerifiablePresentation::from_document(doc) {
                Ok(vp) => vp.holder,
                Err(e) => return vec![e.to_string()],
            },
        };

        let proofs = match document.get("proof") {
            None => return vec!["no proof attached".to_string()],
            Some(raw) => match serde_json::from_value::<crate::ProofValue>(raw.clone()) {
                Ok(p) => p,
                Err(e) => return vec![format!("malformed proof: {e}")],
            },
        };
        let proofs = proofs.as_list();
        if proofs.is_empty() {
            return vec!["no proof attached".to_string()];
        }

        let errors: Vec<String> = proofs
            .into_iter()
            .flat_map(|p| Self::check_proof(document, p, purpose, signer_did.as_deref()))
            .collect();
        if !errors.is_empty() {
            tracing::debug!(kind = %artifact.kind(), count = errors.len(), "artifact failed verification");
        }
        errors
    }

    fn derive_verification_method(&self, key: &KeyMaterial) -> Result<String, SigningError> {
        let keypair = Ed25519KeyPair::from_key_material(key)?;
        Ok(verification_method(&keypair.public_key()))
    }

    fn derive_subject_identifier(&self, key: &KeyMaterial) -> Result<String, SigningError> {
        let keypair = Ed25519KeyPair::from_key_material(key)?;
        Ok(did_key(&keypair.public_key()))
    }

    fn generate_key(&self) -> KeyMaterial {
        Ed25519KeyPair::generate().to_key_material()
    }
}
