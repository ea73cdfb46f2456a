use anyhow::Context;
use axum::Router;
use dotenvy::dotenv;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_swagger_ui::SwaggerUi;

mod api;
mod app_state;
mod config;
mod db;
mod realtime;
mod utils;

use crate::app_state::AppState;
use crate::config::Config;
use crate::db::queries::chat::ChatDoc;
use crate::db::queries::collaboration::CollaborationDoc;
use crate::db::queries::declined::DeclinedDoc;
use crate::db::queries::evaluation::EvaluationDoc;
use crate::db::queries::feedback::FeedbackDoc;
use crate::db::queries::notification::NotificationDoc;
use crate::db::queries::requests::RequestDoc;
use crate::db::queries::stats::StatsDoc;
use crate::db::queries::user::UserDoc;
use crate::realtime::EventHub;

/// Buffered realtime events per connected client before it counts as lagged.
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    Config::init();

    tracing_subscriber::fmt().with_target(true).init();

    let config = Config::get();
    let pool = db::pool::get_db_pool(&config)
        .await
        .context("Failed to connect to the database")?;
    let events = EventHub::new(EVENT_CHANNEL_CAPACITY);
    let state = AppState {
        pool: pool.clone(),
        events,
    };

    let merged_doc = RequestDoc::openapi()
        .merge_from(DeclinedDoc::openapi())
        .merge_from(CollaborationDoc::openapi())
        .merge_from(NotificationDoc::openapi())
        .merge_from(ChatDoc::openapi())
        .merge_from(FeedbackDoc::openapi())
        .merge_from(EvaluationDoc::openapi())
        .merge_from(StatsDoc::openapi())
        .merge_from(UserDoc::openapi());

    let app = Router::new()
        .merge(api::health::health_routes())
        .merge(api::requests::request_routes())
        .merge(api::collaboration::collaboration_routes())
        .merge(api::notification::notification_routes())
        .merge(api::chat::chat_routes())
        .merge(api::feedback::feedback_routes())
        .merge(api::evaluation::evaluation_routes())
        .merge(api::stats::stats_routes())
        .merge(api::user::user_routes())
        .merge(api::ws::ws_routes())
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", merged_doc.clone()))
        .merge(RapiDoc::with_openapi("/api-docs/rapidoc.json", merged_doc).path("/rapidoc"))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    run_server(app, &config.server_addr, shutdown_tx, pool).await?;

    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal(mut shutdown_rx: broadcast::Receiver<()>, pool: PgPool) {
    tokio::select! {
        _ = signal::ctrl_c() => tracing::info!("received Ctrl+C, shutting down"),
        _ = shutdown_rx.recv() => tracing::info!("received shutdown signal"),
    }
    tracing::info!("closing database pool");
    pool.close().await;
}

async fn run_server(
    app: Router,
    addr: &str,
    shutdown_tx: broadcast::Sender<()>,
    pool: PgPool,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("server running at http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx.subscribe(), pool))
        .await
        .context("Server encountered an error")
}
