//! # OpenAPI Specification Assembly
//!
//! Collects the utoipa-documented handlers into one document, served at
//! `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI document for the wallet API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "VCW API",
        version = "0.3.0",
        description = "Verifiable credential wallet: issuance, holder import and selective-disclosure presentations, revocation, and verification.",
        license(name = "MIT")
    ),
    paths(
        // Account
        crate::routes::account::register,
        crate::routes::account::login,
        crate::routes::account::me,
        // Issuer
        crate::routes::issuer::issue_credential,
        crate::routes::issuer::revoke_credential,
        crate::routes::issuer::dashboard_data,
        // Holder
        crate::routes::holder::upload,
        crate::routes::holder::list_credentials,
        crate::routes::holder::create_presentation,
        // Verifier
        crate::routes::verifier::verify,
    ),
    components(schemas(
        crate::routes::account::RegisterRequest,
        crate::routes::account::RegisterResponse,
        crate::routes::account::LoginRequest,
        crate::routes::account::LoginResponse,
        crate::routes::account::UserView,
        crate::routes::issuer::IssueCredentialRequest,
        crate::routes::issuer::RevokeRequest,
        crate::routes::issuer::RevokeResponse,
        crate::routes::issuer::DashboardStatsView,
        crate::routes::issuer::DashboardResponse,
        crate::routes::holder::CredentialView,
        crate::routes::holder::UploadResponse,
        crate::routes::holder::DisclosureFrameRequest,
        crate::routes::holder::CreatePresentationRequest,
        crate::routes::verifier::VerifyResponse,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "account", description = "Registration, login and profile"),
        (name = "issuer", description = "Credential issuance, revocation and dashboard"),
        (name = "holder", description = "Credential import, listing and presentations"),
        (name = "verifier", description = "Unauthenticated verification"),
    )
)]
pub struct ApiDoc;

/// Serves the document at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
