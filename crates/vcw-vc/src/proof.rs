//! # Proofs
//!
//! The proof object attached to credentials and presentations. Its shape is
//! fixed: unknown members are rejected so nothing can ride along unsigned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Signature scheme of a proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofType {
    /// Ed25519 signature over the JCS-canonical document.
    Ed25519Signature2020,
}

impl std::fmt::Display for ProofType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProofType::Ed25519Signature2020 => f.write_str("Ed25519Signature2020"),
        }
    }
}

/// The declared intent of a signature.
///
/// Credentials are signed for `assertionMethod` (the issuer asserts the
/// claims); presentations for `authentication` (the holder proves control).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProofPurpose {
    /// Issuer assertion.
    AssertionMethod,
    /// Holder authentication.
    Authentication,
}

impl std::fmt::Display for ProofPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProofPurpose::AssertionMethod => f.write_str("assertionMethod"),
            ProofPurpose::Authentication => f.write_str("authentication"),
        }
    }
}

/// A cryptographic proof.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Proof {
    /// Signature scheme.
    #[serde(rename = "type")]
    pub proof_type: ProofType,

    /// When the proof was created.
    pub created: DateTime<Utc>,

    /// DID URL of the signing key.
    #[serde(rename = "verificationMethod")]
    pub verification_method: String,

    /// Declared intent.
    #[serde(rename = "proofPurpose")]
    pub proof_purpose: ProofPurpose,

    /// Multibase (base58btc, `z` prefix) Ed25519 signature.
    #[serde(rename = "proofValue")]
    pub proof_value: String,
}

/// `proof` member: a single object or an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProofValue {
    /// One proof object.
    Single(Box<Proof>),
    /// Several proof objects.
    Array(Vec<Proof>),
}

impl Default for ProofValue {
    fn default() -> Self {
        Self::Array(Vec::new())
    }
}

impl ProofValue {
    /// True if no proof is present.
    pub fn is_empty(&self) -> bool {
        match self {
            ProofValue::Single(_) => false,
            ProofValue::Array(arr) => arr.is_empty(),
        }
    }

    /// Normalize to a list.
    pub fn as_list(&self) -> Vec<&Proof> {
        match self {
            ProofValue::Single(p) => vec![p.as_ref()],
            ProofValue::Array(arr) => arr.iter().collect(),
        }
    }
}
