use crate::state::AppState;
use crate::types::ChatEntry;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// Spawn the single consumer that feeds chat lines into the show
pub fn spawn_chat_consumer(
    state: Arc<AppState>,
    mut rx: UnboundedReceiver<ChatEntry>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(entry) = rx.recv().await {
            tracing::debug!("Chat from {}: {}", entry.user, entry.text);
            state.on_chat_message(entry).await;
        }
        tracing::info!("Chat stream ended");
    })
}
