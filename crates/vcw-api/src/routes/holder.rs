//! # Holder Endpoints
//!
//! - `POST /api/holder/upload` — verify and import an externally signed
//!   credential or presentation. The body is taken as raw bytes so the
//!   duplicate check covers exactly what was submitted.
//! - `GET /api/holder/list_credentials` — the caller's credentials, newest
//!   first.
//! - `POST /api/holder/create_presentation` — derive a signed presentation
//!   that reveals only the requested subject attributes.

use axum::body::Bytes;
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
use vcw_lifecycle::CredentialRecord;
use vcw_vc::DisclosureFrame;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// A stored credential or presentation as shown to its holder.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CredentialView {
    /// Record id.
    pub cred_id: Uuid,
    /// Issuing user, or `null` for imported artifacts.
    pub issuer_id: Option<Uuid>,
    /// Holding user.
    pub holder_id: Uuid,
    /// `VC` or `VP`.
    pub category: String,
    /// Display title.
    pub title: String,
    /// `active` or `revoked`.
    pub status: String,
    /// Content fingerprint.
    pub fingerprint: String,
    /// When the record was stored.
    pub issued_at: DateTime<Utc>,
    /// The signed artifact.
    pub credential_data: serde_json::Value,
}

impl From<CredentialRecord> for CredentialView {
    fn from(record: CredentialRecord) -> Self {
        Self {
            cred_id: *record.cred_id.as_uuid(),
            issuer_id: record.issuer.user_id().map(|id| *id.as_uuid()),
            holder_id: *record.holder_id.as_uuid(),
            category: record.category.as_str().to_string(),
            title: record.title,
            status: record.status.as_str().to_string(),
            fingerprint: record.fingerprint,
            issued_at: record.issued_at,
            credential_data: record.payload,
        }
    }
}

/// Import result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// The stored record.
    pub credential: CredentialView,
}

/// Attributes to reveal.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DisclosureFrameRequest {
    /// Subject attribute names. Names absent from the credential are
    /// ignored.
    #[serde(rename = "credentialSubject", default)]
    pub credential_subject: Vec<String>,
}

/// Presentation request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePresentationRequest {
    /// Credential to present.
    pub cred_id: Uuid,
    /// Attributes to reveal.
    #[serde(default)]
    pub disclosure_frame: DisclosureFrameRequest,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the holder router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/holder/upload", post(upload))
        .route("/api/holder/list_credentials", get(list_credentials))
        .route("/api/holder/create_presentation", post(create_presentation))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/holder/upload — Import a signed VC or VP.
#[utoipa::path(
    post,
    path = "/api/holder/upload",
    request_body(content = serde_json::Value, description = "Signed VC or VP", content_type = "application/json"),
    responses(
        (status = 201, description = "Artifact imported", body = UploadResponse),
        (status = 400, description = "Unrecognized type or failed verification", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is not a holder", body = crate::error::ErrorBody),
        (status = 409, description = "Artifact already imported", body = crate::error::ErrorBody),
    ),
    tag = "holder"
)]
pub(crate) async fn upload(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Bytes,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    if body.is_empty() {
        return Err(AppError::BadRequest("request body is empty".into()));
    }
    let record = state.lifecycle.import(caller.principal(), &body).await?;
    let message = format!("{} successfully imported.", record.category);
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message,
            credential: record.into(),
        }),
    ))
}

/// GET /api/holder/list_credentials — The caller's credentials.
#[utoipa::path(
    get,
    path = "/api/holder/list_credentials",
    responses(
        (status = 200, description = "Credentials, newest first", body = Vec<CredentialView>),
        (status = 403, description = "Caller is not a holder", body = crate::error::ErrorBody),
    ),
    tag = "holder"
)]
pub(crate) async fn list_credentials(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<CredentialView>>, AppError> {
    let records = state.lifecycle.list_credentials(caller.principal()).await?;
    Ok(Json(records.into_iter().map(CredentialView::from).collect()))
}

/// POST /api/holder/create_presentation — Derive a selective-disclosure
/// presentation.
///
/// Nothing is stored. A credential that does not exist and one held by
/// someone else give the same 403.
#[utoipa::path(
    post,
    path = "/api/holder/create_presentation",
    request_body = CreatePresentationRequest,
    responses(
        (status = 200, description = "Signed verifiable presentation", body = serde_json::Value),
        (status = 403, description = "Credential not found or not held by caller", body = crate::error::ErrorBody),
        (status = 422, description = "Credential cannot be presented", body = crate::error::ErrorBody),
    ),
    tag = "holder"
)]
pub(crate) async fn create_presentation(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreatePresentationRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let req = extract_json(body)?;
    let frame = DisclosureFrame::new(req.disclosure_frame.credential_subject);
    let presentation = state
        .lifecycle
        .create_presentation(
            caller.principal(),
            CredentialId::from_uuid(req.cred_id),
            &frame,
        )
        .await?;
    Ok(Json(presentation))
}
