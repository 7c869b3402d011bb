#![deny(missing_docs)]

//! # vcw-core — Foundational Types for the Credential Wallet
//!
//! Every other crate in the workspace builds on the types defined here.
//! The crate has no internal dependencies, only `serde`, `serde_json`,
//! `serde_jcs`, `thiserror`, `chrono`, `uuid`, and `sha2`.
//!
//! ## Design Principles
//!
//! 1. **[`CanonicalBytes`] is the only path into signatures and semantic
//!    fingerprints.** Anything that is signed or hashed for deduplication
//!    goes through `CanonicalBytes::new()`, which applies RFC 8785 (JCS)
//!    canonicalization and rejects floats.
//!
//! 2. **Newtype identifiers.** A [`UserId`] cannot be passed where a
//!    [`CredentialId`] is expected.
//!
//! 3. **UTC only.** [`Timestamp`] is second-precision UTC; calendar dates
//!    are validated through [`parse_calendar_date`].

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_exact, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, ValidationError};
pub use identity::{CredentialId, RevocationId, UserId};
pub use temporal::{parse_calendar_date, Timestamp};
