//! # Lifecycle Errors
//!
//! One variant per failure a caller can act on differently. Verification
//! failure of an untrusted artifact is *not* an error for
//! [`verify`](crate::CredentialLifecycle::verify), but it is for
//! [`import`](crate::CredentialLifecycle::import), which refuses to store it.

use thiserror::Error;
use vcw_core::{CredentialId, UserId};
use vcw_vc::{SigningError, UnrecognizedArtifactType};

use crate::store::StoreError;

/// Errors from lifecycle operations.
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// Malformed or missing input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Role or ownership mismatch. Does not distinguish "not yours" from
    /// "does not exist".
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Referenced entity is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// No holder account with that email.
    #[error("holder '{0}' not found")]
    HolderNotFound(String),

    /// The holder already holds this content.
    #[error("credential already held by this holder")]
    DuplicateCredential,

    /// Registration with an email already in use.
    #[error("email '{0}' is already registered")]
    EmailTaken(String),

    /// The credential has already been revoked.
    #[error("credential {0} is already revoked")]
    AlreadyRevoked(CredentialId),

    /// The artifact declares neither a credential nor a presentation type.
    #[error(transparent)]
    UnrecognizedArtifactType(#[from] UnrecognizedArtifactType),

    /// The artifact failed verification and was not stored.
    #[error("artifact failed verification")]
    InvalidArtifact {
        /// Messages from the signing service.
        errors: Vec<String>,
    },

    /// The issuer account has no signing key.
    #[error("issuer {0} has no signing key")]
    IssuerKeyMissing(UserId),

    /// The holder account has no signing key.
    #[error("holder {0} has no signing key")]
    HolderKeyMissing(UserId),

    /// The signing service rejected the request.
    #[error("signing failed: {0}")]
    SigningFailure(String),

    /// The signing service timed out or was unreachable. Retryable.
    #[error("signing service unavailable: {0}")]
    SigningUnavailable(String),

    /// The store could not be reached. Retryable.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// State that should be impossible.
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),
}

impl From<vcw_core::ValidationError> for LifecycleError {
    fn from(err: vcw_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => Self::StoreUnavailable(msg),
            other => Self::InternalInconsistency(other.to_string()),
        }
    }
}

impl From<SigningError> for LifecycleError {
    fn from(err: SigningError) -> Self {
        match err {
            SigningError::Unavailable(msg) => Self::SigningUnavailable(msg),
            other => Self::SigningFailure(other.to_string()),
        }
    }
}
