//! JSON extractor that turns axum rejections into structured `AppError` responses.
//!
//! Use `AppJson<T>` in place of `axum::Json<T>` in handler signatures so a bad
//! body produces a JSON `AppError` rather than axum's plain-text rejection.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};

use crate::error::AppError;

pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(map_json_rejection(rejection)),
        }
    }
}

pub fn map_json_rejection(rejection: JsonRejection) -> AppError {
    let body_text = rejection.body_text();
    let field_hint = extract_field_from_serde_message(&body_text);

    AppError::Validation {
        message: format!("Invalid request body: {body_text}"),
        field: Some(field_hint.unwrap_or_else(|| "body".to_string())),
        received: None,
        docs_hint: Some(
            "Send a JSON body with Content-Type: application/json (see /api-doc/openapi.json)."
                .to_string(),
        ),
    }
}

/// Pull the field name out of serde's "missing field `x`" / "unknown field `x`" messages.
fn extract_field_from_serde_message(msg: &str) -> Option<String> {
    ["missing field `", "unknown field `"]
        .iter()
        .find_map(|pattern| {
            let start = msg.find(pattern)? + pattern.len();
            let rest = &msg[start..];
            rest.find('`').map(|end| rest[..end].to_string())
        })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use tower::ServiceExt;

    use super::*;

    #[test]
    fn extracts_missing_field_name() {
        let msg = "Failed to deserialize: missing field `signals` at line 1 column 2";
        assert_eq!(extract_field_from_serde_message(msg), Some("signals".to_string()));
    }

    #[test]
    fn extracts_unknown_field_name() {
        let msg = "unknown field `foo`, expected one of `bar`, `baz`";
        assert_eq!(extract_field_from_serde_message(msg), Some("foo".to_string()));
    }

    #[test]
    fn returns_none_for_generic_error() {
        assert_eq!(
            extract_field_from_serde_message("expected value at line 1 column 1"),
            None
        );
    }

    async fn echo(AppJson(value): AppJson<serde_json::Value>) -> String {
        value.to_string()
    }

    #[tokio::test]
    async fn malformed_json_becomes_validation_error() {
        let app = Router::new().route("/echo", post(echo));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/echo")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        let value: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(value["error"], "validation_failed");
        assert_eq!(value["field"], "body");
    }
}
