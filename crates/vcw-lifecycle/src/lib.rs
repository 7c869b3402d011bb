//! # vcw-lifecycle — Credential Lifecycle Core
//!
//! Business rules for how a claim becomes a signed, deduplicated,
//! role-gated credential, and how an untrusted artifact re-enters the
//! system as verified or rejected.
//!
//! The core talks to two collaborators through traits and holds no state
//! of its own between operations:
//!
//! - [`vcw_vc::CredentialSigner`] signs, verifies and derives identifiers.
//! - [`CredentialStore`] persists users, credentials and revocations and is
//!   the authoritative guard for the `(holder, fingerprint)` uniqueness
//!   constraint. [`MemoryStore`] ships for tests and single-process use.
//!
//! Every operation takes an explicit [`AuthenticatedPrincipal`]; nothing is
//! read from ambient request context.
//!
//! ## Operations
//!
//! | Operation | Role | Effect |
//! |-----------|------|--------|
//! | [`CredentialLifecycle::issue`] | issuer | sign + persist |
//! | [`CredentialLifecycle::import`] | holder | verify + persist |
//! | [`CredentialLifecycle::create_presentation`] | owning holder | redact + sign |
//! | [`CredentialLifecycle::verify`] | none | classify + verify |
//! | [`CredentialLifecycle::revoke`] | owning issuer | atomic status flip + revocation row |
//! | [`CredentialLifecycle::dashboard`] | issuer | read-only aggregation |

pub mod claim;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fingerprint;
pub mod lifecycle;
pub mod memory;
pub mod principal;
pub mod record;
pub mod store;

pub use claim::{ClaimFields, ClaimInput};
pub use config::{LifecycleConfig, DEFAULT_UNIVERSITY};
pub use dashboard::{DashboardData, DashboardStats, RECENT_ACTIVITY_LIMIT};
pub use error::LifecycleError;
pub use fingerprint::{artifact_fingerprint, semantic_fingerprint};
pub use lifecycle::{CredentialLifecycle, IssuedCredential, VerificationReport};
pub use memory::MemoryStore;
pub use principal::{AuthError, AuthenticatedPrincipal, Role};
pub use record::{
    CredentialRecord, CredentialStatus, IssuanceEvent, IssuerRef, IssuerStats, RevocationRecord,
    RevokeOutcome, UserRecord,
};
pub use store::{CredentialStore, StoreError};
