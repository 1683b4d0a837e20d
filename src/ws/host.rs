//! Host-only command handlers
//!
//! Authorization is checked in the dispatch layer before calling these.
//! State changes reach every client through the broadcast channel, so a
//! successful command usually has no direct reply.

use crate::protocol::ServerMessage;
use crate::state::{AppState, ShowError};
use crate::types::AnswerKey;
use std::sync::Arc;

fn error_reply(e: ShowError) -> Option<ServerMessage> {
    Some(ServerMessage::Error {
        code: e.code().to_string(),
        msg: e.to_string(),
    })
}

fn reply(result: Result<(), ShowError>) -> Option<ServerMessage> {
    result.err().and_then(error_reply)
}

pub async fn handle_start_game(state: &Arc<AppState>) -> Option<ServerMessage> {
    tracing::info!("Host starting game");
    reply(state.start_game().await)
}

pub async fn handle_prepare_answer(state: &Arc<AppState>, key: AnswerKey) -> Option<ServerMessage> {
    tracing::info!("Host picked {}", key.as_str());
    reply(state.prepare_answer(key).await)
}

pub async fn handle_confirm_answer(state: &Arc<AppState>) -> Option<ServerMessage> {
    match state.confirm_answer().await {
        // AnswerResult already went out on the broadcast
        Ok(_) => None,
        Err(e) => error_reply(e),
    }
}

pub async fn handle_cancel_answer(state: &Arc<AppState>) -> Option<ServerMessage> {
    state.cancel_answer().await;
    None
}

pub async fn handle_fifty_fifty(state: &Arc<AppState>) -> Option<ServerMessage> {
    match state.use_fifty_fifty().await {
        Ok(_) => None,
        Err(e) => error_reply(e),
    }
}

pub async fn handle_ask_audience(state: &Arc<AppState>) -> Option<ServerMessage> {
    reply(state.ask_audience().await)
}

pub async fn handle_close_audience(state: &Arc<AppState>) -> Option<ServerMessage> {
    state.close_audience().await;
    None
}

pub async fn handle_phone_friend(state: &Arc<AppState>) -> Option<ServerMessage> {
    match state.phone_friend().await {
        Ok(candidates) => {
            tracing::info!("Phone-a-friend offering {} chatters", candidates.len());
            None
        }
        Err(e) => error_reply(e),
    }
}

pub async fn handle_choose_friend(state: &Arc<AppState>, name: String) -> Option<ServerMessage> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Some(ServerMessage::Error {
            code: "INVALID_NAME".to_string(),
            msg: "Friend name must not be empty".to_string(),
        });
    }
    reply(state.choose_friend(name).await)
}

pub async fn handle_close_phone(state: &Arc<AppState>) -> Option<ServerMessage> {
    state.close_phone().await;
    None
}

pub async fn handle_restart(state: &Arc<AppState>) -> Option<ServerMessage> {
    tracing::info!("Host restarting game");
    reply(state.restart_game().await)
}

pub async fn handle_continue_after_loss(state: &Arc<AppState>) -> Option<ServerMessage> {
    tracing::info!("Host continuing after loss");
    reply(state.continue_after_loss().await)
}
