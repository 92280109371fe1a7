use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use lumen_core::error::{ApiError, InsightError};
use lumen_core::insight_map::{InsightInputs, InsightMap, build_insight_map};
use lumen_core::records::{ChatSignalTally, CheckInRecord, QuestRecord};

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::state::AppState;

/// Check-ins and chat tallies are read this far back; covers both week windows.
pub const LOOKBACK_DAYS: i64 = 14;
/// Level shown for users without a profile row yet.
pub const DEFAULT_LEVEL: i64 = 1;

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/insight-map", get(get_insight_map))
}

#[derive(sqlx::FromRow)]
struct CheckInRow {
    day_key: String,
    date: DateTime<Utc>,
    ratings: Vec<i32>,
    percentage: i32,
}

impl CheckInRow {
    fn into_record(self) -> Result<CheckInRecord, InsightError> {
        CheckInRecord::try_new(self.day_key, self.date, &self.ratings, self.percentage)
    }
}

#[derive(sqlx::FromRow)]
struct QuestRow {
    goal: String,
    duration: String,
    progress: i32,
    completed: bool,
    date: DateTime<Utc>,
}

impl QuestRow {
    fn into_record(self) -> Result<QuestRecord, InsightError> {
        QuestRecord::try_new(
            self.goal,
            &self.duration,
            self.progress,
            self.completed,
            self.date,
        )
    }
}

#[derive(sqlx::FromRow)]
struct ChatSignalTallyRow {
    keyword: String,
    count: i64,
    date: DateTime<Utc>,
}

impl From<ChatSignalTallyRow> for ChatSignalTally {
    fn from(row: ChatSignalTallyRow) -> Self {
        ChatSignalTally {
            keyword: row.keyword,
            count: row.count,
            date: row.date,
        }
    }
}

async fn fetch_check_ins(
    db: &PgPool,
    user_id: Uuid,
    since: DateTime<Utc>,
) -> Result<Vec<CheckInRow>, sqlx::Error> {
    sqlx::query_as::<_, CheckInRow>(
        r#"
        SELECT day_key, date, ratings, percentage
        FROM check_ins
        WHERE user_id = $1 AND date >= $2
        ORDER BY date DESC
        "#,
    )
    .bind(user_id)
    .bind(since)
    .fetch_all(db)
    .await
}

async fn fetch_quests(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<QuestRow>, sqlx::Error> {
    sqlx::query_as::<_, QuestRow>(
        r#"
        SELECT goal, duration, progress, completed, date
        FROM quests
        WHERE user_id = $1
        ORDER BY date DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(db)
    .await
}

async fn fetch_chat_tallies(
    db: &PgPool,
    user_id: Uuid,
    since: DateTime<Utc>,
) -> Result<Vec<ChatSignalTallyRow>, sqlx::Error> {
    sqlx::query_as::<_, ChatSignalTallyRow>(
        r#"
        SELECT keyword, count, date
        FROM chat_signal_tallies
        WHERE user_id = $1 AND date >= $2
        "#,
    )
    .bind(user_id)
    .bind(since)
    .fetch_all(db)
    .await
}

async fn fetch_level(db: &PgPool, user_id: Uuid) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT level FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(db)
        .await
}

fn assemble_inputs(
    check_ins: Vec<CheckInRow>,
    quests: Vec<QuestRow>,
    tallies: Vec<ChatSignalTallyRow>,
    level: Option<i32>,
) -> Result<InsightInputs, InsightError> {
    Ok(InsightInputs {
        check_ins: check_ins
            .into_iter()
            .map(CheckInRow::into_record)
            .collect::<Result<_, _>>()?,
        quests: quests
            .into_iter()
            .map(QuestRow::into_record)
            .collect::<Result<_, _>>()?,
        chat_signal_tallies: tallies.into_iter().map(ChatSignalTally::from).collect(),
        user_level: level.map(i64::from).unwrap_or(DEFAULT_LEVEL),
    })
}

/// Synthesize the caller's insight map
///
/// Aggregates the last two weeks of check-ins, recent quests and chat signal
/// tallies into a small graph around the user: up to five category nodes,
/// the edges between them, one highlighted connection and an optional
/// growth path. Computed fresh on every call.
#[utoipa::path(
    get,
    path = "/v1/insight-map",
    params(
        ("x-lumen-user-id" = String, Header, description = "Caller id set by the auth gateway")
    ),
    responses(
        (status = 200, description = "Synthesized insight map", body = InsightMap),
        (status = 401, description = "Missing or malformed caller identity", body = ApiError),
        (status = 500, description = "Stored data could not be aggregated", body = ApiError)
    ),
    tag = "insights"
)]
pub async fn get_insight_map(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<InsightMap>, AppError> {
    let user_id = auth.user_id;
    let now = Utc::now();
    let since = now - Duration::days(LOOKBACK_DAYS);

    // independent reads; the engine waits for all of them
    let (check_ins, quests, tallies, level) = tokio::try_join!(
        fetch_check_ins(&state.db, user_id, since),
        fetch_quests(&state.db, user_id, state.quest_limit),
        fetch_chat_tallies(&state.db, user_id, since),
        fetch_level(&state.db, user_id),
    )?;

    let inputs = assemble_inputs(check_ins, quests, tallies, level)?;
    let map = build_insight_map(&inputs, now);

    tracing::info!(
        user_id = %user_id,
        check_ins = inputs.check_ins.len(),
        quests = inputs.quests.len(),
        tallies = inputs.chat_signal_tallies.len(),
        nodes = map.nodes.len(),
        edges = map.edges.len(),
        growth_path = map.growth_path.is_some(),
        "insight map synthesized"
    );

    Ok(Json(map))
}
