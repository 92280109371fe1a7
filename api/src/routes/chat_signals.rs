use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use lumen_core::error::ApiError;
use lumen_core::signals::{ExtractedSignal, normalize, tally_signals};

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/chat-signals", post(record_chat_signals))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatSignalsResponse {
    /// Day the signals were tallied under (UTC)
    pub day_key: String,
    /// Sanitized signals, at most one per type. Empty when nothing was recognized.
    pub signals: Vec<ExtractedSignal>,
}

pub fn day_key(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Record signals extracted from one chat turn
///
/// Accepts the extractor's raw output (an array, or an object with a
/// `signals` or `data` array), normalizes it, and adds one count per
/// recognized signal type to today's tallies. Unrecognized or malformed
/// entries are dropped rather than rejected.
#[utoipa::path(
    post,
    path = "/v1/chat-signals",
    request_body(content = Object, description = "Raw extractor payload"),
    params(
        ("x-lumen-user-id" = String, Header, description = "Caller id set by the auth gateway")
    ),
    responses(
        (status = 200, description = "Signals normalized and tallied", body = ChatSignalsResponse),
        (status = 400, description = "Body is not valid JSON", body = ApiError),
        (status = 401, description = "Missing or malformed caller identity", body = ApiError)
    ),
    tag = "insights"
)]
pub async fn record_chat_signals(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppJson(payload): AppJson<serde_json::Value>,
) -> Result<Json<ChatSignalsResponse>, AppError> {
    let user_id = auth.user_id;
    let now = Utc::now();
    let today = day_key(now);

    let signals = normalize(&payload);
    let tallies = tally_signals(&signals, now);

    if !tallies.is_empty() {
        let mut tx = state.db.begin().await?;
        for tally in &tallies {
            sqlx::query(
                r#"
                INSERT INTO chat_signal_tallies (user_id, day_key, keyword, count, date)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (user_id, day_key, keyword)
                DO UPDATE SET count = chat_signal_tallies.count + EXCLUDED.count,
                              date = EXCLUDED.date
                "#,
            )
            .bind(user_id)
            .bind(&today)
            .bind(&tally.keyword)
            .bind(tally.count)
            .bind(tally.date)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
    }

    tracing::info!(
        user_id = %user_id,
        day_key = %today,
        recognized = signals.len(),
        "chat signals tallied"
    );

    Ok(Json(ChatSignalsResponse {
        day_key: today,
        signals,
    }))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn day_key_uses_utc_calendar_date() {
        let late = Utc.with_ymd_and_hms(2024, 1, 15, 23, 59, 59).unwrap();
        assert_eq!(day_key(late), "2024-01-15");
    }

    #[test]
    fn response_serializes_camel_case() {
        let response = ChatSignalsResponse {
            day_key: "2024-01-15".to_string(),
            signals: normalize(&serde_json::json!([{"type": "stressed", "confidence": 0.9}])),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["dayKey"], "2024-01-15");
        assert_eq!(value["signals"][0]["signalType"], "stress");
        assert_eq!(value["signals"][0]["intensity"], 3);
    }
}
