//! Recent chat history
//!
//! Keeps the last hundred lines (newest first) and the last hundred distinct
//! speakers (most recent first). Phone-a-friend samples and filters from here.

use std::collections::VecDeque;

use crate::types::ChatEntry;

pub const CHAT_HISTORY: usize = 100;

#[derive(Debug, Default)]
pub struct ChatLog {
    chatters: VecDeque<String>,
    messages: VecDeque<ChatEntry>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: ChatEntry) {
        if let Some(pos) = self.chatters.iter().position(|name| *name == entry.user) {
            self.chatters.remove(pos);
        }
        self.chatters.push_front(entry.user.clone());
        self.chatters.truncate(CHAT_HISTORY);

        self.messages.push_front(entry);
        self.messages.truncate(CHAT_HISTORY);
    }

    /// Distinct speakers, most recent first
    pub fn recent_chatters(&self) -> impl Iterator<Item = &str> {
        self.chatters.iter().map(String::as_str)
    }

    /// Stored lines, newest first
    pub fn messages(&self) -> impl Iterator<Item = &ChatEntry> {
        self.messages.iter()
    }

    /// Up to `limit` texts said by `user`, newest first
    pub fn messages_by(&self, user: &str, limit: usize) -> Vec<String> {
        self.messages
            .iter()
            .filter(|m| m.user == user)
            .take(limit)
            .map(|m| m.text.clone())
            .collect()
    }
}
