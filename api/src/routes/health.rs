use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router, routing::get};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when insight reads would fail
    pub status: String,
    pub version: String,
    pub database: bool,
}

impl HealthResponse {
    fn from_reachability(database: bool) -> (StatusCode, Self) {
        let (status, code) = match database {
            true => ("ok", StatusCode::OK),
            false => ("degraded", StatusCode::SERVICE_UNAVAILABLE),
        };
        (
            code,
            Self {
                status: status.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                database,
            },
        )
    }
}

/// Liveness of the API and the database the insight map reads from
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Insight reads can be served", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await
    {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(error = %err, "health check could not reach the database");
            false
        }
    };

    let (code, body) = HealthResponse::from_reachability(database);
    (code, Json(body))
}
