use serde::Serialize;
use utoipa::ToSchema;

/// Structured error response. Every error carries a machine-readable code,
/// a readable message and, where it helps, the offending field and value.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    /// Machine-readable error code (e.g. "validation_failed", "unauthorized")
    pub error: String,
    /// Human-readable description of what went wrong
    pub message: String,
    /// Which field caused the error (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// The value that was received (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<serde_json::Value>,
    /// Request ID for tracing and debugging
    pub request_id: String,
    /// Hint about what the correct usage looks like
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_hint: Option<String>,
}

/// Error codes used across the API
pub mod codes {
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const INTERNAL_ERROR: &str = "internal_error";
    pub const UNAUTHORIZED: &str = "unauthorized";
}

/// A stored record could not be turned into an engine input.
///
/// Raised while converting untyped storage rows; the engine itself never
/// fails once it holds validated records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InsightError {
    #[error("check-in {day_key} has {found} ratings, expected 5")]
    RatingArity { day_key: String, found: usize },
    #[error("check-in {day_key} has rating {value} at position {index}, expected 1-5")]
    RatingOutOfRange {
        day_key: String,
        index: usize,
        value: i32,
    },
    #[error("check-in {day_key} has percentage {value}, expected 0-100")]
    PercentageOutOfRange { day_key: String, value: i32 },
    #[error("quest progress {value} is outside 0-100")]
    ProgressOutOfRange { value: i32 },
    #[error("unknown quest duration '{value}'")]
    UnknownDuration { value: String },
}
