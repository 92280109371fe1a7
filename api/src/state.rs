use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Most recent quests read per insight map
    pub quest_limit: i64,
}
