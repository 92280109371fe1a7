use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;

use crate::auth::USER_ID_HEADER;

/// Build a CORS layer for the configured origins.
///
/// - Methods: GET, POST, OPTIONS
/// - Headers: Content-Type and the gateway identity header
/// - Max age: 3600s
///
/// Origins that aren't valid header values are skipped.
pub fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static(USER_ID_HEADER),
        ])
        .max_age(std::time::Duration::from_secs(3600))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use super::*;

    async fn ok() -> StatusCode {
        StatusCode::OK
    }

    #[tokio::test]
    async fn allows_configured_origin() {
        let app = Router::new()
            .route("/health", get(ok))
            .layer(build_cors_layer(&["https://app.example.com".to_string()]));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", "https://app.example.com")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");

        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .expect("allow-origin header should exist"),
            "https://app.example.com"
        );
    }

    #[tokio::test]
    async fn ignores_unknown_origin() {
        let app = Router::new()
            .route("/health", get(ok))
            .layer(build_cors_layer(&["https://app.example.com".to_string()]));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", "https://evil.example.com")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");

        assert!(response.headers().get("access-control-allow-origin").is_none());
    }
}
