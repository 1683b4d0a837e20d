//! WebSocket message dispatch
//!
//! Authorization is checked here, then dispatched to the host handlers.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use crate::types::Role;
use std::sync::Arc;

use super::host;

/// Macro to check host authorization and return early if unauthorized
macro_rules! check_host {
    ($role:expr, $action:expr) => {
        if *$role != Role::Host {
            return Some(ServerMessage::Error {
                code: "UNAUTHORIZED".to_string(),
                msg: format!("Only host can {}", $action),
            });
        }
    };
}

/// Handle client messages and return optional response
pub async fn handle_message(
    msg: ClientMessage,
    role: &Role,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::ClipDone { clip_id, error } => {
            check_host!(role, "report audio");
            state.clip_done(clip_id, error).await;
            None
        }

        ClientMessage::StartGame => {
            check_host!(role, "start the game");
            host::handle_start_game(state).await
        }

        ClientMessage::PrepareAnswer { key } => {
            check_host!(role, "answer");
            host::handle_prepare_answer(state, key).await
        }

        ClientMessage::ConfirmAnswer => {
            check_host!(role, "confirm an answer");
            host::handle_confirm_answer(state).await
        }

        ClientMessage::CancelAnswer => {
            check_host!(role, "cancel an answer");
            host::handle_cancel_answer(state).await
        }

        ClientMessage::UseFiftyFifty => {
            check_host!(role, "use fifty-fifty");
            host::handle_fifty_fifty(state).await
        }

        ClientMessage::AskAudience => {
            check_host!(role, "ask the audience");
            host::handle_ask_audience(state).await
        }

        ClientMessage::CloseAudience => {
            check_host!(role, "close the audience vote");
            host::handle_close_audience(state).await
        }

        ClientMessage::PhoneFriend => {
            check_host!(role, "phone a friend");
            host::handle_phone_friend(state).await
        }

        ClientMessage::ChooseFriend { name } => {
            check_host!(role, "choose a friend");
            host::handle_choose_friend(state, name).await
        }

        ClientMessage::ClosePhone => {
            check_host!(role, "hang up");
            host::handle_close_phone(state).await
        }

        ClientMessage::Restart => {
            check_host!(role, "restart the game");
            host::handle_restart(state).await
        }

        ClientMessage::ContinueAfterLoss => {
            check_host!(role, "continue the game");
            host::handle_continue_after_loss(state).await
        }
    }
}
