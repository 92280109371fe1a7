use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::AppError;

/// Header set by the upstream auth gateway once it has verified the caller.
pub const USER_ID_HEADER: &str = "x-lumen-user-id";

/// Caller identity resolved by the auth gateway in front of this service.
///
/// Credentials never reach this service; the gateway strips them and forwards
/// the verified user id in `x-lumen-user-id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

fn user_id_from_headers(headers: &HeaderMap) -> Result<Uuid, AppError> {
    let raw = headers
        .get(USER_ID_HEADER)
        .ok_or_else(|| AppError::Unauthorized {
            message: format!("Missing {USER_ID_HEADER} header"),
            docs_hint: Some(
                "Requests must pass through the auth gateway, which sets the caller's user id."
                    .to_string(),
            ),
        })?
        .to_str()
        .map_err(|_| AppError::Unauthorized {
            message: format!("{USER_ID_HEADER} must be a valid UTF-8 string"),
            docs_hint: None,
        })?;

    Uuid::parse_str(raw.trim()).map_err(|_| AppError::Unauthorized {
        message: format!("{USER_ID_HEADER} must be a valid UUID"),
        docs_hint: Some(
            "Use a valid UUID, e.g. 'a1b2c3d4-e5f6-7890-abcd-ef1234567890'".to_string(),
        ),
    })
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = user_id_from_headers(&parts.headers)?;
        tracing::debug!(user_id = %user_id, "caller identity resolved");
        Ok(Self { user_id })
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use super::*;

    async fn whoami(auth: AuthenticatedUser) -> String {
        auth.user_id.to_string()
    }

    fn app() -> Router {
        Router::new().route("/whoami", get(whoami))
    }

    #[tokio::test]
    async fn resolves_user_from_gateway_header() {
        let user_id = "0190f1a2-7c3e-7d4b-9a10-5b6c7d8e9f00";
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(USER_ID_HEADER, user_id)
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        assert_eq!(&body[..], user_id.as_bytes());
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn malformed_uuid_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, "not-a-uuid".parse().unwrap());
        assert!(matches!(
            user_id_from_headers(&headers),
            Err(AppError::Unauthorized { .. })
        ));
    }
}
