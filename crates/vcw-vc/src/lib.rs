//! # vcw-vc — Verifiable Credentials and Presentations
//!
//! - **Data model**: [`VerifiableCredential`] and [`VerifiablePresentation`]
//!   following the W3C VC Data Model 1.1 field names.
//! - **Classification**: [`Artifact`] is the tagged union every untrusted
//!   document passes through before it is verified or stored.
//! - **Selective disclosure**: [`redact`] derives a credential that reveals
//!   only the requested subject attributes.
//! - **Signing service**: the [`CredentialSigner`] trait is the seam the
//!   lifecycle core signs and verifies through; [`Ed25519Signer`] is the
//!   shipped implementation (Ed25519 over JCS-canonical bytes, `did:key`
//!   verification methods).
//!
//! ## Signing input
//!
//! The signature covers the JCS canonicalization of the document with its
//! `proof` member removed, paired with the proof options minus
//! `proofValue`. It is computed on the JSON as received: verification never
//! re-serializes through the typed structs, so documents carrying members
//! this crate does not model still verify.

pub mod artifact;
pub mod credential;
pub mod disclosure;
pub mod presentation;
pub mod proof;
pub mod signer;

pub use artifact::{Artifact, ArtifactKind, UnrecognizedArtifactType};
pub use credential::{ContextValue, TypeValue, VcError, VerifiableCredential, W3C_CREDENTIALS_V1};
pub use disclosure::{redact, DisclosureFrame};
pub use presentation::VerifiablePresentation;
pub use proof::{Proof, ProofPurpose, ProofType, ProofValue};
pub use signer::{signing_input, CredentialSigner, Ed25519Signer, SigningError};
