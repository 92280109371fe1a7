use std::net::SocketAddr;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod auth;
mod config;
mod error;
mod extract;
mod middleware;
mod routes;
mod state;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lumen Insights API",
        version = "0.1.0",
        description = "Insight map synthesis over check-ins, quests and chat signals."
    ),
    paths(
        routes::health::health_check,
        routes::insight_map::get_insight_map,
        routes::chat_signals::record_chat_signals,
    ),
    components(schemas(
        routes::health::HealthResponse,
        routes::chat_signals::ChatSignalsResponse,
        lumen_core::error::ApiError,
        lumen_core::insight_map::InsightMap,
        lumen_core::insight_map::CenterNode,
        lumen_core::graph::InsightNode,
        lumen_core::graph::NodeKind,
        lumen_core::graph::NodeState,
        lumen_core::graph::RoutineKind,
        lumen_core::graph::InsightEdge,
        lumen_core::graph::EdgeStrength,
        lumen_core::highlight::Highlight,
        lumen_core::highlight::GrowthPath,
        lumen_core::cooccurrence::WeeklyEvolution,
        lumen_core::cooccurrence::SignalCategory,
        lumen_core::cooccurrence::HabitKind,
        lumen_core::records::QuestDuration,
        lumen_core::signals::ExtractedSignal,
        lumen_core::signals::SignalType,
    ))
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lumen_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = config::AppConfig::from_env().expect("Invalid configuration");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let app_state = state::AppState {
        db: pool,
        quest_limit: config.quest_limit,
    };

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(routes::health::router())
        .merge(routes::insight_map::router())
        .merge(routes::chat_signals::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::cors::build_cors_layer(&config.cors_origins)),
        )
        .with_state(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Lumen API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app)
        .await
        .expect("Server error");
}
