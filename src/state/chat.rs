use super::AppState;
use crate::protocol::ServerMessage;
use crate::types::ChatEntry;

impl AppState {
    /// Feed one chat line into the history and any open audience vote
    pub async fn on_chat_message(&self, entry: ChatEntry) {
        let mut show = self.show.write().await;
        if let Some(poll) = show.audience.as_mut() {
            if let Some(key) = poll.record(&entry.text) {
                tracing::debug!("Audience vote {} from {}", key.as_str(), entry.user);
            }
        }
        show.chat.record(entry.clone());
        drop(show);

        self.broadcast_to_all(ServerMessage::ChatLine { entry });
    }

    /// Stored chat, newest first
    pub async fn recent_chat(&self) -> Vec<ChatEntry> {
        self.show.read().await.chat.messages().cloned().collect()
    }
}
