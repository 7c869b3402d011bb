//! # Principals and Roles

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vcw_core::UserId;

use crate::error::LifecycleError;

/// Role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Attests facts about holders.
    Issuer,
    /// Receives, imports and presents credentials.
    Holder,
}

impl Role {
    /// Return the string representation of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issuer => "issuer",
            Self::Holder => "holder",
        }
    }

    /// Parse the stored string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "issuer" => Some(Self::Issuer),
            "holder" => Some(Self::Holder),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller of a lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    /// The caller's user id.
    pub user_id: UserId,
    /// The caller's role.
    pub role: Role,
}

impl AuthenticatedPrincipal {
    /// Construct a principal.
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Fail with `Forbidden` unless the caller has `role`.
    pub fn require(&self, role: Role) -> Result<(), LifecycleError> {
        if self.role == role {
            Ok(())
        } else {
            Err(LifecycleError::Forbidden(format!(
                "role '{role}' required, caller has '{}'",
                self.role
            )))
        }
    }
}

/// Why a bearer credential did not yield a principal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header.
    #[error("missing bearer token")]
    MissingToken,
    /// Header present but not `Bearer <token>`, or the token is not a
    /// well-formed session token.
    #[error("malformed bearer token")]
    MalformedToken,
    /// Signature or expiry check failed.
    #[error("invalid or expired token")]
    InvalidOrExpiredToken,
    /// The token names a user that no longer exists.
    #[error("token principal no longer exists")]
    UnknownPrincipal,
}

impl AuthError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::MalformedToken => "MALFORMED_TOKEN",
            Self::InvalidOrExpiredToken => "INVALID_TOKEN",
            Self::UnknownPrincipal => "UNKNOWN_PRINCIPAL",
        }
    }
}
