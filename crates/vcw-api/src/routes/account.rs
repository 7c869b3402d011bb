//! # Accounts
//!
//! - `POST /api/register` — create a holder (or, when allowed, issuer)
//!   account with a fresh signing key.
//! - `POST /api/login` — exchange email and password for a session token.
//! - `GET /api/me` — the caller's profile.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use vcw_lifecycle::{Role, UserRecord};

use crate::auth::{authenticate_optional, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{blank_fields, extract_validated_json, Validate};
use crate::password::{hash_password, verify_password, verify_unknown_user};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Registration request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Login email. Stored lowercased.
    #[serde(default)]
    pub email: String,
    /// Plain-text password; only its argon2 hash is stored.
    #[serde(default)]
    pub password: String,
    /// `holder` (default) or `issuer`.
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "holder")]
    pub role: Option<Role>,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), String> {
        let missing = blank_fields(&[
            ("email", self.email.as_str()),
            ("password", self.password.as_str()),
        ]);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("missing required fields: {}", missing.join(", ")))
        }
    }
}

/// Registration result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// New user id.
    pub user_id: Uuid,
    /// Normalized email.
    pub email: String,
    /// Assigned role.
    pub role: String,
}

/// Login request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login email.
    #[serde(default)]
    pub email: String,
    /// Password.
    #[serde(default)]
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), String> {
        let missing = blank_fields(&[
            ("email", self.email.as_str()),
            ("password", self.password.as_str()),
        ]);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("missing required fields: {}", missing.join(", ")))
        }
    }
}

/// Public view of a user.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserView {
    /// User id.
    pub user_id: Uuid,
    /// Email.
    pub email: String,
    /// `issuer` or `holder`.
    pub role: String,
}

impl From<&UserRecord> for UserView {
    fn from(user: &UserRecord) -> Self {
        Self {
            user_id: *user.user_id.as_uuid(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
        }
    }
}

/// Login result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// Bearer token for subsequent requests.
    pub token: String,
    /// The logged-in user.
    pub user: UserView,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Register and login.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
}

/// Profile.
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/api/me", get(me))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/register — Create an account.
///
/// Issuer accounts require `VCW_ALLOW_ISSUER_SIGNUP` or a bearer token of
/// an existing issuer.
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 403, description = "Issuer sign-up not permitted", body = crate::error::ErrorBody),
        (status = 409, description = "Email already registered", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "account"
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let role = req.role.unwrap_or(Role::Holder);

    if role == Role::Issuer && !state.config.allow_issuer_signup {
        let caller = authenticate_optional(&state, &headers).await?;
        if !matches!(caller, Some(p) if p.role == Role::Issuer) {
            tracing::warn!("issuer registration refused for non-issuer caller");
            return Err(AppError::Forbidden(
                "issuer accounts can only be created by an issuer".into(),
            ));
        }
    }

    let password_hash = hash_password(req.password).await?;
    let user = state
        .lifecycle
        .register_user(&req.email, password_hash, role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".into(),
            user_id: *user.user_id.as_uuid(),
            email: user.email,
            role: user.role.as_str().to_string(),
        }),
    ))
}

/// POST /api/login — Exchange credentials for a session token.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid email or password", body = crate::error::ErrorBody),
    ),
    tag = "account"
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let req = extract_validated_json(body)?;

    let Some(user) = state.lifecycle.user_by_email(&req.email).await? else {
        verify_unknown_user(req.password).await?;
        tracing::warn!("login failed: unknown email");
        return Err(AppError::InvalidCredentials);
    };
    if !verify_password(req.password, user.password_hash.clone()).await? {
        tracing::warn!(user_id = %user.user_id, "login failed: wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens.issue(&user)?;
    tracing::info!(user_id = %user.user_id, role = %user.role, "login succeeded");
    Ok(Json(LoginResponse {
        message: "Login successful".into(),
        token,
        user: UserView::from(&user),
    }))
}

/// GET /api/me — The caller's profile.
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Caller profile", body = UserView),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
    ),
    tag = "account"
)]
pub(crate) async fn me(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<UserView>, AppError> {
    let user = state
        .lifecycle
        .user(caller.principal().user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".into()))?;
    Ok(Json(UserView::from(&user)))
}
