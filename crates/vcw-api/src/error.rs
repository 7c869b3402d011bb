//! # Application Error
//!
//! Maps lifecycle and authentication failures to structured HTTP responses.
//! Every error renders as:
//!
//! ```json
//! { "error": { "code": "DUPLICATE_CREDENTIAL", "message": "...", "details": { ... } } }
//! ```
//!
//! Server-side failures (5xx) are logged in full and answered with a fixed
//! message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use utoipa::ToSchema;
use vcw_lifecycle::{AuthError, LifecycleError};

/// JSON error envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Error detail.
    pub error: ErrorDetail,
}

/// Error detail inside [`ErrorBody`].
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Stable machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Structured context, e.g. verification messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Application-level error type that maps to HTTP responses.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Bearer token rejected.
    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    /// Login with an unknown email or a wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Role or ownership mismatch.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Uniqueness conflict. Carries its own code.
    #[error("{message}")]
    Conflict {
        /// Specific conflict code.
        code: &'static str,
        /// Human-readable message.
        message: String,
    },

    /// The artifact declares neither a credential nor a presentation type.
    #[error("unrecognized artifact type")]
    UnrecognizedArtifact {
        /// Types the artifact declared.
        declared: Vec<String>,
    },

    /// The artifact failed verification.
    #[error("artifact failed verification")]
    InvalidArtifact {
        /// Verification messages.
        errors: Vec<String>,
    },

    /// Signing service unreachable or timed out.
    #[error("signing service unavailable: {0}")]
    SigningUnavailable(String),

    /// Store unreachable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Status code and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(e) => (StatusCode::UNAUTHORIZED, e.code()),
            Self::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict { code, .. } => (StatusCode::CONFLICT, *code),
            Self::UnrecognizedArtifact { .. } => {
                (StatusCode::BAD_REQUEST, "UNRECOGNIZED_ARTIFACT_TYPE")
            }
            Self::InvalidArtifact { .. } => (StatusCode::BAD_REQUEST, "INVALID_ARTIFACT"),
            Self::SigningUnavailable(_) => (StatusCode::BAD_GATEWAY, "SIGNING_UNAVAILABLE"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            Self::UnrecognizedArtifact { declared } => Some(json!({ "declared_types": declared })),
            Self::InvalidArtifact { errors } => Some(json!({ "errors": errors })),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, %code, "request failed with server error");
            match &self {
                Self::SigningUnavailable(_) => "The signing service is unavailable".to_string(),
                Self::ServiceUnavailable(_) => "The service is temporarily unavailable".to_string(),
                _ => "An internal error occurred".to_string(),
            }
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: self.details(),
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Validation(msg) => Self::Validation(msg),
            LifecycleError::Forbidden(msg) => Self::Forbidden(msg),
            LifecycleError::NotFound(msg) => Self::NotFound(msg),
            e @ LifecycleError::HolderNotFound(_) => Self::NotFound(e.to_string()),
            e @ LifecycleError::DuplicateCredential => Self::Conflict {
                code: "DUPLICATE_CREDENTIAL",
                message: e.to_string(),
            },
            e @ LifecycleError::EmailTaken(_) => Self::Conflict {
                code: "EMAIL_TAKEN",
                message: e.to_string(),
            },
            e @ LifecycleError::AlreadyRevoked(_) => Self::Conflict {
                code: "ALREADY_REVOKED",
                message: e.to_string(),
            },
            LifecycleError::UnrecognizedArtifactType(e) => Self::UnrecognizedArtifact {
                declared: e.declared,
            },
            LifecycleError::InvalidArtifact { errors } => Self::InvalidArtifact { errors },
            LifecycleError::SigningUnavailable(msg) => Self::SigningUnavailable(msg),
            LifecycleError::StoreUnavailable(msg) => Self::ServiceUnavailable(msg),
            e @ (LifecycleError::IssuerKeyMissing(_)
            | LifecycleError::HolderKeyMissing(_)
            | LifecycleError::SigningFailure(_)
            | LifecycleError::InternalInconsistency(_)) => Self::Internal(e.to_string()),
        }
    }
}
