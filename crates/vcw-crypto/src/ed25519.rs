//! # Ed25519 Signing and Verification
//!
//! Signing takes `&CanonicalBytes` only; raw byte slices cannot be signed.
//! `Ed25519KeyPair` has no `Serialize` impl and its `Debug` output never
//! contains key bytes. Key material leaves a key pair only through
//! [`Ed25519KeyPair::to_key_material`].
//!
//! Signatures travel as multibase base58btc, the `proofValue` encoding of
//! `Ed25519Signature2020`.

use ed25519_dalek::{Signer, Verifier};
use vcw_core::CanonicalBytes;

use crate::error::CryptoError;
use crate::key_material::KeyMaterial;
use crate::multibase;

/// An Ed25519 public key (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey([u8; 32]);

impl Ed25519PublicKey {
    /// Wrap raw public key bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    fn to_verifying_key(self) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({})", multibase::encode(&self.0))
    }
}

/// An Ed25519 signature (64 bytes).
#[derive(Clone, PartialEq, Eq)]
pub struct Ed25519Signature([u8; 64]);

impl Ed25519Signature {
    /// Multibase rendering for `proofValue`.
    pub fn to_multibase(&self) -> String {
        multibase::encode(&self.0)
    }

    /// Parse a multibase `proofValue`.
    pub fn from_multibase(value: &str) -> Result<Self, CryptoError> {
        multibase::decode_array::<64>(value)
            .map(Self)
            .map_err(CryptoError::InvalidSignature)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered = self.to_multibase();
        write!(f, "Ed25519Signature({}…)", &rendered[..12.min(rendered.len())])
    }
}

/// An Ed25519 key pair for signing.
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

impl Ed25519KeyPair {
    /// Fresh key pair from the OS CSPRNG.
    pub fn generate() -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut rand_core::OsRng),
        }
    }

    /// Deterministic key pair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// Rebuild a key pair from persisted key material.
    pub fn from_key_material(material: &KeyMaterial) -> Result<Self, CryptoError> {
        Ok(Self::from_seed(&material.seed()?))
    }

    /// Export the seed as key material for persistence.
    pub fn to_key_material(&self) -> KeyMaterial {
        KeyMaterial::from_seed(&self.signing_key.to_bytes())
    }

    /// The public half.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign canonical bytes.
    pub fn sign(&self, data: &CanonicalBytes) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(data.as_bytes()).to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519KeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Verify a signature over canonical bytes.
pub fn verify(
    data: &CanonicalBytes,
    signature: &Ed25519Signature,
    public_key: &Ed25519PublicKey,
) -> Result<(), CryptoError> {
    let key = public_key.to_verifying_key()?;
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    key.verify(data.as_bytes(), &sig)
        .map_err(|e| CryptoError::VerificationFailed(e.to_string()))
}
