//! # Cryptographic Error Types

use thiserror::Error;

/// Errors from cryptographic operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Ed25519 signature verification failed.
    #[error("Ed25519 verification failed: {0}")]
    VerificationFailed(String),

    /// Invalid Ed25519 signature encoding or length.
    #[error("invalid Ed25519 signature: {0}")]
    InvalidSignature(String),

    /// Invalid Ed25519 public key.
    #[error("invalid Ed25519 public key: {0}")]
    InvalidPublicKey(String),

    /// Stored key material could not be decoded.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// A DID or DID URL could not be resolved to an Ed25519 key.
    #[error("unresolvable DID '{did}': {reason}")]
    UnresolvableDid {
        /// The DID or DID URL as given.
        did: String,
        /// What was wrong with it.
        reason: String,
    },
}
