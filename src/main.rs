use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chatquiz::{api, broadcast, config::QuizConfig, questions, state::AppState, twitch, ws};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chatquiz=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting chatquiz...");

    let config = QuizConfig::from_env();
    let source = questions::source_for(&config.questions);
    tracing::info!("Questions from {}", source.describe());

    let addr = config.bind;
    let static_dir = config.static_dir.clone();
    let twitch_config = config.twitch();

    let state = Arc::new(AppState::new(config, source));

    // Chat transport feeds a single consumer; without a channel there is no chat
    if let Some(twitch_config) = twitch_config {
        let (tx, rx) = mpsc::unbounded_channel();
        twitch::spawn_chat_worker(twitch_config, tx);
        broadcast::spawn_chat_consumer(state.clone(), rx);
    }

    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .merge(api::routes())
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
