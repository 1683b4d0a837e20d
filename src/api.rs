//! Read-only HTTP endpoints.
//!
//! Screens that can't hold a WebSocket (e.g. an OBS browser source) poll these.

use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

use crate::protocol::GameView;
use crate::state::AppState;
use crate::types::ChatEntry;

/// GET /api/state
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<GameView> {
    Json(state.game_view().await)
}

/// GET /api/chat
///
/// The last hundred chat lines, newest first.
pub async fn get_chat(State(state): State<Arc<AppState>>) -> Json<Vec<ChatEntry>> {
    Json(state.recent_chat().await)
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/state", get(get_state))
        .route("/api/chat", get(get_chat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuizConfig;
    use crate::game::tests::make_records;
    use crate::questions::StaticSource;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn create_state() -> Arc<AppState> {
        let config = QuizConfig {
            audio: false,
            ..QuizConfig::default()
        };
        Arc::new(AppState::with_seed(
            config,
            Arc::new(StaticSource::new(make_records(2))),
            3,
        ))
    }

    async fn get_json(state: Arc<AppState>, uri: &str) -> serde_json::Value {
        let response = routes()
            .with_state(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_state_endpoint() {
        let state = create_state();
        state.start_game().await.unwrap();

        let json = get_json(state, "/api/state").await;
        assert_eq!(json["started"], true);
        assert_eq!(json["question_count"], 2);
        assert_eq!(json["status"], "playing");
        assert!(json["question"]["correct"].is_null());
    }

    #[tokio::test]
    async fn test_chat_endpoint() {
        let state = create_state();
        state
            .on_chat_message(ChatEntry {
                user: "ann".to_string(),
                text: "B".to_string(),
                timestamp_ms: 1,
            })
            .await;

        let json = get_json(state, "/api/chat").await;
        assert_eq!(json[0]["user"], "ann");
        assert_eq!(json[0]["text"], "B");
    }
}
