use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lumen_core::error::{self, ApiError, InsightError};

/// Internal error type that converts to structured API responses
#[derive(Debug)]
pub enum AppError {
    /// Validation error (400)
    Validation {
        message: String,
        field: Option<String>,
        received: Option<serde_json::Value>,
        docs_hint: Option<String>,
    },
    /// Missing or malformed caller identity (401)
    Unauthorized {
        message: String,
        docs_hint: Option<String>,
    },
    /// Database error (500)
    Database(sqlx::Error),
    /// A stored record failed validation on the way into the engine (500)
    Record(InsightError),
}

impl AppError {
    fn status_and_body(self, request_id: String) -> (StatusCode, ApiError) {
        match self {
            AppError::Validation {
                message,
                field,
                received,
                docs_hint,
            } => (
                StatusCode::BAD_REQUEST,
                ApiError {
                    error: error::codes::VALIDATION_FAILED.to_string(),
                    message,
                    field,
                    received,
                    request_id,
                    docs_hint,
                },
            ),
            AppError::Unauthorized { message, docs_hint } => (
                StatusCode::UNAUTHORIZED,
                ApiError {
                    error: error::codes::UNAUTHORIZED.to_string(),
                    message,
                    field: None,
                    received: None,
                    request_id,
                    docs_hint,
                },
            ),
            AppError::Database(err) => {
                tracing::error!(request_id = %request_id, "Database error: {:?}", err);
                internal(request_id)
            }
            AppError::Record(err) => {
                tracing::error!(request_id = %request_id, "Invalid stored record: {}", err);
                internal(request_id)
            }
        }
    }
}

/// Generic 500 body. Details stay in the logs.
fn internal(request_id: String) -> (StatusCode, ApiError) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ApiError {
            error: error::codes::INTERNAL_ERROR.to_string(),
            message: "An internal error occurred".to_string(),
            field: None,
            received: None,
            request_id,
            docs_hint: None,
        },
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::now_v7().to_string();
        let (status, api_error) = self.status_and_body(request_id);
        (status, Json(api_error)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}

impl From<InsightError> for AppError {
    fn from(err: InsightError) -> Self {
        AppError::Record(err)
    }
}
