//! End-to-end tests driving the router with `oneshot` against the in-memory
//! store.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use vcw_api::config::AppConfig;
use vcw_api::state::AppState;

// -- Helpers -----------------------------------------------------------------

fn test_app_with(allow_issuer_signup: bool) -> Router {
    let config = AppConfig {
        allow_issuer_signup,
        ..AppConfig::default()
    };
    vcw_api::app(AppState::with_config(config, None))
}

fn test_app() -> Router {
    test_app_with(true)
}

async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Vec<u8>>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(bytes) => builder
            .header("content-type", "application/json")
            .body(Body::from(bytes))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    send_raw(app, method, uri, token, body.map(|b| b.to_string().into_bytes())).await
}

async fn register(app: &Router, email: &str, role: &str) -> StatusCode {
    let (status, _) = send(
        app,
        "POST",
        "/api/register",
        None,
        Some(json!({"email": email, "password": "pa55word", "role": role})),
    )
    .await;
    status
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/login",
        None,
        Some(json!({"email": email, "password": "pa55word"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_string()
}

async fn account(app: &Router, email: &str, role: &str) -> String {
    assert_eq!(register(app, email, role).await, StatusCode::CREATED);
    login(app, email).await
}

fn claim(holder_email: &str, grade: &str) -> Value {
    json!({
        "holder_email": holder_email,
        "name": "Rita Sousa",
        "course": "Computer Networks",
        "grade": grade,
        "completionDate": "2025-06-30"
    })
}

/// Issuer and holder tokens plus a credential issued to the holder.
struct World {
    app: Router,
    issuer: String,
    holder: String,
    credential: Value,
}

async fn world() -> World {
    let app = test_app();
    let issuer = account(&app, "registrar@ua.pt", "issuer").await;
    let holder = account(&app, "rita@ua.pt", "holder").await;
    let (status, credential) = send(
        &app,
        "POST",
        "/api/issuer/issue_vc",
        Some(&issuer),
        Some(claim("rita@ua.pt", "17")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{credential}");
    World {
        app,
        issuer,
        holder,
        credential,
    }
}

async fn first_cred_id(app: &Router, holder: &str) -> String {
    let (status, list) = send(app, "GET", "/api/holder/list_credentials", Some(holder), None).await;
    assert_eq!(status, StatusCode::OK);
    list[0]["cred_id"].as_str().unwrap().to_string()
}

// -- Health & docs -----------------------------------------------------------

#[tokio::test]
async fn health_probes_need_no_token() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/health/liveness", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
    let (status, body) = send(&app, "GET", "/health/readiness", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ready");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (status, doc) = send(&test_app(), "GET", "/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/verifier/verify"].is_object());
}

// -- Accounts ----------------------------------------------------------------

#[tokio::test]
async fn register_login_me() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({"email": "Ana@UA.pt", "password": "pa55word"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "holder");
    assert_eq!(body["email"], "ana@ua.pt");

    let token = login(&app, "ana@ua.pt").await;
    let (status, me) = send(&app, "GET", "/api/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "ana@ua.pt");
    assert_eq!(me["role"], "holder");
    assert_eq!(me["user_id"], body["user_id"]);
}

#[tokio::test]
async fn duplicate_email_and_bad_password() {
    let app = test_app();
    assert_eq!(register(&app, "dup@ua.pt", "holder").await, StatusCode::CREATED);
    let (status, body) = send(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({"email": "DUP@ua.pt", "password": "other"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "EMAIL_TAKEN");

    let (status, wrong_password) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({"email": "dup@ua.pt", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password["error"]["code"], "INVALID_CREDENTIALS");

    let (status, unknown_email) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({"email": "nobody@ua.pt", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email, wrong_password);
}

#[tokio::test]
async fn register_requires_fields() {
    let (status, body) = send(
        &test_app(),
        "POST",
        "/api/register",
        None,
        Some(json!({"email": "x@ua.pt"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]["message"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn issuer_signup_is_gated() {
    let app = test_app_with(false);
    assert_eq!(register(&app, "self@ua.pt", "issuer").await, StatusCode::FORBIDDEN);
    assert_eq!(register(&app, "h@ua.pt", "holder").await, StatusCode::CREATED);
    let holder = login(&app, "h@ua.pt").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/register",
        Some(&holder),
        Some(json!({"email": "sneaky@ua.pt", "password": "pa55word", "role": "issuer"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn protected_routes_reject_missing_and_bad_tokens() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/api/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "MISSING_TOKEN");

    let (status, body) = send(&app, "GET", "/api/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "MALFORMED_TOKEN");
}

// -- Issuance ----------------------------------------------------------------

#[tokio::test]
async fn issued_credential_is_signed_and_listed() {
    let w = world().await;
    assert_eq!(w.credential["type"], json!(["VerifiableCredential", "ComputerNetworks"]));
    assert_eq!(w.credential["credentialSubject"]["university"], "Universidade de Aveiro");
    assert_eq!(w.credential["proof"]["proofPurpose"], "assertionMethod");

    let (status, list) = send(&w.app, "GET", "/api/holder/list_credentials", Some(&w.holder), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["title"], "ComputerNetworks");
    assert_eq!(list[0]["status"], "active");
    assert_eq!(list[0]["category"], "VC");
    assert_eq!(list[0]["credential_data"], w.credential);
}

#[tokio::test]
async fn reissuing_the_same_fact_conflicts() {
    let w = world().await;
    let (status, body) = send(
        &w.app,
        "POST",
        "/api/issuer/issue_vc",
        Some(&w.issuer),
        Some(claim("rita@ua.pt", "17")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "DUPLICATE_CREDENTIAL");

    let (status, _) = send(
        &w.app,
        "POST",
        "/api/issuer/issue_vc",
        Some(&w.issuer),
        Some(claim("rita@ua.pt", "18")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn issuance_errors() {
    let w = world().await;

    let (status, body) = send(
        &w.app,
        "POST",
        "/api/issuer/issue_vc",
        Some(&w.holder),
        Some(claim("rita@ua.pt", "10")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");

    let (status, body) = send(
        &w.app,
        "POST",
        "/api/issuer/issue_vc",
        Some(&w.issuer),
        Some(json!({"holder_email": "rita@ua.pt", "name": "Rita"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("course") && message.contains("grade"), "{message}");

    let (status, _) = send(
        &w.app,
        "POST",
        "/api/issuer/issue_vc",
        Some(&w.issuer),
        Some(claim("ghost@ua.pt", "10")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut future = claim("rita@ua.pt", "10");
    future["completionDate"] = json!("2999-01-01");
    let (status, _) = send(&w.app, "POST", "/api/issuer/issue_vc", Some(&w.issuer), Some(future)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send_raw(
        &w.app,
        "POST",
        "/api/issuer/issue_vc",
        Some(&w.issuer),
        Some(b"{oops".to_vec()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// -- Presentations & verification --------------------------------------------

#[tokio::test]
async fn presentation_discloses_only_requested_fields_and_verifies() {
    let w = world().await;
    let cred_id = first_cred_id(&w.app, &w.holder).await;

    let (status, vp) = send(
        &w.app,
        "POST",
        "/api/holder/create_presentation",
        Some(&w.holder),
        Some(json!({
            "cred_id": cred_id,
            "disclosure_frame": {"credentialSubject": ["name", "course", "shoeSize"]}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{vp}");
    let subject = vp["verifiableCredential"][0]["credentialSubject"]
        .as_object()
        .unwrap();
    let mut keys: Vec<&str> = subject.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["course", "name"]);
    assert_eq!(vp["proof"]["proofPurpose"], "authentication");

    let (status, report) = send(&w.app, "POST", "/api/verifier/verify", None, Some(vp)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report, json!({"verified": true, "errors": [], "kind": "VP"}));

    let (status, report) =
        send(&w.app, "POST", "/api/verifier/verify", None, Some(w.credential.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["verified"], true);
    assert_eq!(report["kind"], "VC");
}

#[tokio::test]
async fn other_holders_cannot_present() {
    let w = world().await;
    let cred_id = first_cred_id(&w.app, &w.holder).await;
    let intruder = account(&w.app, "mallory@ua.pt", "holder").await;

    let body = json!({"cred_id": cred_id, "disclosure_frame": {"credentialSubject": ["name"]}});
    let (status, owned_by_other) = send(
        &w.app,
        "POST",
        "/api/holder/create_presentation",
        Some(&intruder),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let missing = json!({
        "cred_id": "00000000-0000-4000-8000-000000000000",
        "disclosure_frame": {"credentialSubject": ["name"]}
    });
    let (status, not_found) = send(
        &w.app,
        "POST",
        "/api/holder/create_presentation",
        Some(&intruder),
        Some(missing),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(owned_by_other, not_found);
}

#[tokio::test]
async fn tampered_credential_fails_verification_without_error_status() {
    let w = world().await;
    let mut tampered = w.credential.clone();
    tampered["credentialSubject"]["grade"] = json!("20");
    let (status, report) = send(&w.app, "POST", "/api/verifier/verify", None, Some(tampered)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["verified"], false);
    assert!(!report["errors"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn verifier_rejects_unclassifiable_payloads() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/verifier/verify",
        None,
        Some(json!({"type": ["Diploma"]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "UNRECOGNIZED_ARTIFACT_TYPE");

    let (status, _) = send(&app, "POST", "/api/verifier/verify", None, Some(json!([1, 2]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_raw(&app, "POST", "/api/verifier/verify", None, Some(b"nope".to_vec())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// -- Import ------------------------------------------------------------------

#[tokio::test]
async fn upload_is_verified_and_deduplicated_system_wide() {
    let w = world().await;
    let other = account(&w.app, "joao@ua.pt", "holder").await;
    let bytes = serde_json::to_vec(&w.credential).unwrap();

    let (status, body) = send_raw(&w.app, "POST", "/api/holder/upload", Some(&other), Some(bytes.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], "VC successfully imported.");
    assert_eq!(body["credential"]["issuer_id"], Value::Null);
    assert_eq!(body["credential"]["title"], "ComputerNetworks");

    let (status, body) = send_raw(&w.app, "POST", "/api/holder/upload", Some(&w.holder), Some(bytes)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "DUPLICATE_CREDENTIAL");
}

#[tokio::test]
async fn upload_rejects_tampered_and_untyped_artifacts() {
    let w = world().await;
    let mut tampered = w.credential.clone();
    tampered["credentialSubject"]["name"] = json!("Someone Else");
    let (status, body) = send(&w.app, "POST", "/api/holder/upload", Some(&w.holder), Some(tampered)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_ARTIFACT");
    assert!(body["error"]["details"]["errors"].is_array());

    let (status, body) = send(
        &w.app,
        "POST",
        "/api/holder/upload",
        Some(&w.holder),
        Some(json!({"type": "Transcript"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "UNRECOGNIZED_ARTIFACT_TYPE");

    let (status, _) = send(
        &w.app,
        "POST",
        "/api/holder/upload",
        Some(&w.issuer),
        Some(w.credential.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// -- Revocation & dashboard --------------------------------------------------

#[tokio::test]
async fn revocation_updates_status_and_dashboard() {
    let w = world().await;
    let cred_id = first_cred_id(&w.app, &w.holder).await;

    let (_, before) = send(&w.app, "GET", "/api/issuer/dashboard_data", Some(&w.issuer), None).await;
    assert_eq!(before["stats"]["credentials_issued"], 1);
    assert_eq!(before["stats"]["active_students"], 1);
    assert_eq!(before["stats"]["revoked_credentials"], 0);
    assert_eq!(
        before["recent_activity"][0],
        "Issued \"ComputerNetworks\" to rita@ua.pt"
    );

    let (status, body) = send(
        &w.app,
        "POST",
        "/api/issuer/revoke",
        Some(&w.issuer),
        Some(json!({"cred_id": cred_id, "reason": "issued in error"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "revoked");
    assert_eq!(body["reason"], "issued in error");

    let (_, after) = send(&w.app, "GET", "/api/issuer/dashboard_data", Some(&w.issuer), None).await;
    assert_eq!(after["stats"]["revoked_credentials"], 1);

    let (_, list) = send(&w.app, "GET", "/api/holder/list_credentials", Some(&w.holder), None).await;
    assert_eq!(list[0]["status"], "revoked");

    let (status, body) = send(
        &w.app,
        "POST",
        "/api/issuer/revoke",
        Some(&w.issuer),
        Some(json!({"cred_id": cred_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "ALREADY_REVOKED");

    let (status, _) = send(
        &w.app,
        "POST",
        "/api/holder/create_presentation",
        Some(&w.holder),
        Some(json!({"cred_id": cred_id, "disclosure_frame": {"credentialSubject": ["name"]}})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn only_the_issuing_issuer_can_revoke() {
    let w = world().await;
    let cred_id = first_cred_id(&w.app, &w.holder).await;
    let rival = account(&w.app, "rival@up.pt", "issuer").await;

    let (status, _) = send(
        &w.app,
        "POST",
        "/api/issuer/revoke",
        Some(&rival),
        Some(json!({"cred_id": cred_id})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &w.app,
        "POST",
        "/api/issuer/revoke",
        Some(&w.holder),
        Some(json!({"cred_id": cred_id})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&w.app, "GET", "/api/issuer/dashboard_data", Some(&w.holder), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
