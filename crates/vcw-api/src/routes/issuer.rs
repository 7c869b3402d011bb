//! # Issuer Endpoints
//!
//! - `POST /api/issuer/issue_vc` — sign and store a course-completion
//!   credential for a registered holder.
//! - `POST /api/issuer/revoke` — revoke a credential the caller issued.
//! - `GET /api/issuer/dashboard_data` — headline counts and recent activity.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use vcw_core::CredentialId;
use vcw_lifecycle::{ClaimInput, DashboardData};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Issuance request. Missing fields are reported together.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct IssueCredentialRequest {
    /// Email of a registered holder.
    pub holder_email: String,
    /// Holder's name as attested.
    pub name: String,
    /// Course completed.
    pub course: String,
    /// Grade awarded.
    pub grade: String,
    /// `YYYY-MM-DD`, not in the future.
    #[serde(rename = "completionDate", alias = "completion_date")]
    pub completion_date: String,
    /// Awarding university. Defaults to the configured university.
    pub university: Option<String>,
}

impl From<IssueCredentialRequest> for ClaimInput {
    fn from(req: IssueCredentialRequest) -> Self {
        ClaimInput {
            holder_email: req.holder_email,
            name: req.name,
            course: req.course,
            grade: req.grade,
            completion_date: req.completion_date,
            university: req.university,
        }
    }
}

/// Revocation request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RevokeRequest {
    /// Credential to revoke.
    pub cred_id: Uuid,
    /// Optional free-text reason, stored with the revocation.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Revocation result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RevokeResponse {
    /// Revocation id.
    pub revoc_id: Uuid,
    /// Revoked credential.
    pub cred_id: Uuid,
    /// Always `revoked`.
    pub status: String,
    /// When the revocation was recorded.
    pub revoked_at: DateTime<Utc>,
    /// Stored reason, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Headline counts.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardStatsView {
    /// Credentials issued by the caller.
    pub credentials_issued: u64,
    /// Distinct holders issued to.
    pub active_students: u64,
    /// Revoked credentials among those issued.
    pub revoked_credentials: u64,
}

/// Dashboard payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    /// Headline counts.
    pub stats: DashboardStatsView,
    /// Up to five recent issuances, newest first.
    pub recent_activity: Vec<String>,
}

impl From<DashboardData> for DashboardResponse {
    fn from(data: DashboardData) -> Self {
        Self {
            stats: DashboardStatsView {
                credentials_issued: data.stats.credentials_issued,
                active_students: data.stats.active_students,
                revoked_credentials: data.stats.revoked_credentials,
            },
            recent_activity: data.recent_activity,
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the issuer router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/issuer/issue_vc", post(issue_credential))
        .route("/api/issuer/revoke", post(revoke_credential))
        .route("/api/issuer/dashboard_data", get(dashboard_data))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/issuer/issue_vc — Issue a credential.
///
/// Returns the signed credential. Re-issuing the same facts to the same
/// holder is rejected before anything is signed.
#[utoipa::path(
    post,
    path = "/api/issuer/issue_vc",
    request_body = IssueCredentialRequest,
    responses(
        (status = 201, description = "Signed verifiable credential", body = serde_json::Value),
        (status = 403, description = "Caller is not an issuer", body = crate::error::ErrorBody),
        (status = 404, description = "Holder not found", body = crate::error::ErrorBody),
        (status = 409, description = "Credential already issued to this holder", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
        (status = 502, description = "Signing service unavailable", body = crate::error::ErrorBody),
    ),
    tag = "issuer"
)]
pub(crate) async fn issue_credential(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<IssueCredentialRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let req = extract_json(body)?;
    let issued = state
        .lifecycle
        .issue(caller.principal(), &ClaimInput::from(req))
        .await?;
    Ok((StatusCode::CREATED, Json(issued.document)))
}

/// POST /api/issuer/revoke — Revoke a credential the caller issued.
#[utoipa::path(
    post,
    path = "/api/issuer/revoke",
    request_body = RevokeRequest,
    responses(
        (status = 200, description = "Credential revoked", body = RevokeResponse),
        (status = 403, description = "Not an issuer, or credential not issued by caller", body = crate::error::ErrorBody),
        (status = 409, description = "Already revoked", body = crate::error::ErrorBody),
    ),
    tag = "issuer"
)]
pub(crate) async fn revoke_credential(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<RevokeRequest>, JsonRejection>,
) -> Result<Json<RevokeResponse>, AppError> {
    let req = extract_json(body)?;
    let revocation = state
        .lifecycle
        .revoke(
            caller.principal(),
            CredentialId::from_uuid(req.cred_id),
            req.reason,
        )
        .await?;
    Ok(Json(RevokeResponse {
        revoc_id: *revocation.revoc_id.as_uuid(),
        cred_id: *revocation.cred_id.as_uuid(),
        status: "revoked".into(),
        revoked_at: revocation.revoked_at,
        reason: revocation.reason,
    }))
}

/// GET /api/issuer/dashboard_data — Issuer dashboard.
#[utoipa::path(
    get,
    path = "/api/issuer/dashboard_data",
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 403, description = "Caller is not an issuer", body = crate::error::ErrorBody),
    ),
    tag = "issuer"
)]
pub(crate) async fn dashboard_data(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<DashboardResponse>, AppError> {
    let data = state.lifecycle.dashboard(caller.principal()).await?;
    Ok(Json(data.into()))
}
