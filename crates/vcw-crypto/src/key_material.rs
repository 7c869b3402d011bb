//! # Key Material
//!
//! The persisted form of a user's signing key: the 32-byte Ed25519 seed as
//! multibase base58btc in the `users.signing_key` column. Callers outside
//! this crate treat it as opaque: they move it between the store and the
//! signer and never inspect it.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::multibase;

/// Opaque signing key material. Zeroized on drop; `Debug` is redacted.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial(String);

impl KeyMaterial {
    /// Encode a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self(multibase::encode(seed))
    }

    /// Accept a stored value. The encoding is checked up front so a corrupt
    /// column surfaces at load time rather than at signing time.
    pub fn from_stored(encoded: impl Into<String>) -> Result<Self, CryptoError> {
        let material = Self(encoded.into());
        material.seed()?;
        Ok(material)
    }

    /// The encoded form for persistence.
    pub fn expose_stored(&self) -> &str {
        &self.0
    }

    pub(crate) fn seed(&self) -> Result<[u8; 32], CryptoError> {
        multibase::decode_array::<32>(&self.0).map_err(CryptoError::InvalidKeyMaterial)
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyMaterial([REDACTED])")
    }
}
