//! # Authentication Middleware
//!
//! Session tokens are HS256 JWTs carrying `{sub, role, iat, exp}`, presented
//! as `Authorization: Bearer <token>`.
//!
//! [`auth_middleware`] resolves the token to a user that still exists and
//! injects a [`CallerIdentity`] into the request extensions. The role in the
//! identity comes from the stored user, not from the token, so a role change
//! takes effect on the next request.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use vcw_core::UserId;
use vcw_lifecycle::{AuthError, AuthenticatedPrincipal, Role, UserRecord};

use crate::config::JwtSecret;
use crate::error::AppError;
use crate::state::AppState;

// ── Tokens ──────────────────────────────────────────────────────────────────

/// JWT claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Role at issuance time.
    pub role: Role,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Issues and checks session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("keys", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenService {
    /// Build from the shared secret and token lifetime.
    pub fn new(secret: &JwtSecret, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Sign a token for `user`.
    pub fn issue(&self, user: &UserRecord) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let exp = i64::try_from(self.ttl.as_secs())
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or_else(|| AppError::Internal(format!("token ttl {:?} out of range", self.ttl)))?;
        let claims = Claims {
            sub: user.user_id.to_string(),
            role: user.role,
            iat: now,
            exp,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("token encoding failed: {e}")))
    }

    /// Check signature and expiry.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => AuthError::MalformedToken,
                _ => AuthError::InvalidOrExpiredToken,
            })
    }
}

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// The authenticated caller, injected by [`auth_middleware`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity(pub AuthenticatedPrincipal);

impl CallerIdentity {
    /// The principal handed to lifecycle operations.
    pub fn principal(&self) -> &AuthenticatedPrincipal {
        &self.0
    }
}

/// Reads the identity the middleware stored. 401 when absent.
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .copied()
            .ok_or(AppError::Unauthorized(AuthError::MissingToken))
    }
}

// ── Authentication ──────────────────────────────────────────────────────────

fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AuthError::MalformedToken)?;
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => {
            let token = token.trim();
            if token.is_empty() || token.contains(' ') {
                Err(AuthError::MalformedToken)
            } else {
                Ok(Some(token))
            }
        }
        _ => Err(AuthError::MalformedToken),
    }
}

async fn resolve(state: &AppState, token: &str) -> Result<AuthenticatedPrincipal, AppError> {
    let claims = state.tokens.decode(token)?;
    let user_id: UserId = claims
        .sub
        .parse()
        .map_err(|_| AppError::Unauthorized(AuthError::MalformedToken))?;
    let user = state
        .lifecycle
        .user(user_id)
        .await?
        .ok_or(AppError::Unauthorized(AuthError::UnknownPrincipal))?;
    Ok(AuthenticatedPrincipal::new(user.user_id, user.role))
}

/// Resolve the bearer token in `headers` to a principal.
pub async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<AuthenticatedPrincipal, AppError> {
    match bearer_token(headers)? {
        Some(token) => resolve(state, token).await,
        None => Err(AuthError::MissingToken.into()),
    }
}

/// Like [`authenticate`], but a missing header yields `None`. A header that
/// is present must still be valid.
pub async fn authenticate_optional(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<AuthenticatedPrincipal>, AppError> {
    match bearer_token(headers)? {
        Some(token) => resolve(state, token).await.map(Some),
        None => Ok(None),
    }
}

// ── Middleware ──────────────────────────────────────────────────────────────

/// Reject requests without a valid bearer token; otherwise attach the
/// caller's identity.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, request.headers()).await {
        Ok(principal) => {
            request.extensions_mut().insert(CallerIdentity(principal));
            next.run(request).await
        }
        Err(AppError::Unauthorized(reason)) => {
            tracing::warn!(%reason, code = reason.code(), "authentication failed");
            AppError::Unauthorized(reason).into_response()
        }
        Err(other) => other.into_response(),
    }
}
