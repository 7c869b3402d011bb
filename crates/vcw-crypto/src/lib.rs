//! # vcw-crypto — Cryptographic Primitives for the Credential Wallet
//!
//! - **Ed25519** key pairs, signing over [`CanonicalBytes`](vcw_core::CanonicalBytes),
//!   and verification.
//! - **Key material**: the opaque, zeroized-on-drop form in which a user's
//!   signing key is persisted.
//! - **did:key** derivation and resolution for Ed25519 public keys, used for
//!   issuer identifiers, subject identifiers, and proof verification methods.

pub mod did;
pub mod ed25519;
pub mod error;
pub mod key_material;
pub mod multibase;

pub use did::{did_key, public_key_from_did_url, verification_method};
pub use ed25519::{verify, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use error::CryptoError;
pub use key_material::KeyMaterial;
