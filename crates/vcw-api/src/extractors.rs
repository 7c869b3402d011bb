//! # Request Extraction & Validation
//!
//! [`Validate`] for request DTOs and helpers that turn axum's JSON
//! rejections into [`AppError`]s. Bodies that are not JSON at all are a
//! `400`; JSON with missing or mistyped fields is a `422`.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Business rules beyond what deserialization checks.
pub trait Validate {
    /// Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Unwrap a JSON body.
///
/// ```ignore
/// async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., AppError> {
///     let req = extract_json(body)?;
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result.map(|Json(v)| v).map_err(|err| match err {
        JsonRejection::JsonDataError(e) => AppError::Validation(e.body_text()),
        other => AppError::BadRequest(other.body_text()),
    })
}

/// Unwrap a JSON body and run its [`Validate`] rules.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// Names of the fields in `fields` whose value is blank.
pub fn blank_fields<'a>(fields: &[(&'a str, &str)]) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Probe {
        name: String,
    }

    impl Validate for Probe {
        fn validate(&self) -> Result<(), String> {
            if self.name.trim().is_empty() {
                Err("name must not be blank".into())
            } else {
                Ok(())
            }
        }
    }

    async fn handler(body: Result<Json<Probe>, JsonRejection>) -> axum::response::Response {
        match extract_validated_json(body) {
            Ok(p) => p.name.into_response(),
            Err(e) => e.into_response(),
        }
    }

    async fn post_body(body: &'static str) -> StatusCode {
        Router::new()
            .route("/", post(handler))
            .oneshot(
                Request::post("/")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn syntax_errors_are_400_and_shape_errors_are_422() {
        assert_eq!(post_body("{not json").await, StatusCode::BAD_REQUEST);
        assert_eq!(post_body(r#"{"other": 1}"#).await, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(post_body(r#"{"name": "  "}"#).await, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(post_body(r#"{"name": "ok"}"#).await, StatusCode::OK);
    }

    #[test]
    fn blank_fields_lists_names() {
        assert_eq!(
            blank_fields(&[("email", " "), ("password", "x"), ("role", "")]),
            vec!["email", "role"]
        );
    }
}
