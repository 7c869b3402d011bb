//! # Verifier Endpoint
//!
//! `POST /api/verifier/verify` — unauthenticated. Classifies the artifact
//! as a credential or a presentation and checks it with the matching proof
//! purpose. A failed check is a normal `200` response with
//! `verified: false`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use vcw_lifecycle::VerificationReport;

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// Verification outcome.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    /// True when no errors were found.
    pub verified: bool,
    /// Verification messages.
    pub errors: Vec<String>,
    /// `VC` or `VP`.
    pub kind: String,
}

impl From<VerificationReport> for VerifyResponse {
    fn from(report: VerificationReport) -> Self {
        Self {
            verified: report.verified,
            errors: report.errors,
            kind: report.kind.as_str().to_string(),
        }
    }
}

/// Build the verifier router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/verifier/verify", post(verify))
}

/// POST /api/verifier/verify — Verify a VC or VP.
#[utoipa::path(
    post,
    path = "/api/verifier/verify",
    request_body(content = serde_json::Value, description = "Signed VC or VP", content_type = "application/json"),
    responses(
        (status = 200, description = "Verification outcome", body = VerifyResponse),
        (status = 400, description = "Not a JSON object, or neither a VC nor a VP", body = crate::error::ErrorBody),
    ),
    tag = "verifier"
)]
pub(crate) async fn verify(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<VerifyResponse>, AppError> {
    let document = extract_json(body)?;
    if !document.is_object() {
        return Err(AppError::BadRequest("payload must be a JSON object".into()));
    }
    let report = state.lifecycle.verify(document).await?;
    tracing::info!(kind = %report.kind, verified = report.verified, "artifact verified");
    Ok(Json(report.into()))
}
