//! Phone-a-friend: pick a friend from recent chatters and follow what they say

use rand::Rng;
use std::time::Duration;

use crate::chat::ChatLog;
use crate::random;

pub const PHONE_CANDIDATES: usize = 8;
pub const FRIEND_FEED_LIMIT: usize = 25;
pub const PHONE_REFRESH: Duration = Duration::from_secs(2);

/// Sample up to eight distinct recent chatters
pub fn pick_candidates<R: Rng + ?Sized>(chat: &ChatLog, rng: &mut R) -> Vec<String> {
    let pool: Vec<String> = chat.recent_chatters().map(str::to_string).collect();
    random::draw(pool, PHONE_CANDIDATES, rng)
}

/// One activation of the phone lifeline
#[derive(Debug, Clone, Default)]
pub struct PhoneCall {
    candidates: Vec<String>,
    selected: Option<String>,
    feed: Vec<String>,
}

impl PhoneCall {
    pub fn new(candidates: Vec<String>) -> Self {
        Self {
            candidates,
            selected: None,
            feed: Vec::new(),
        }
    }

    /// Select a friend and load their latest messages
    pub fn choose(&mut self, name: String, chat: &ChatLog) {
        self.selected = Some(name);
        self.refresh(chat);
    }

    /// Re-read the selected friend's messages
    pub fn refresh(&mut self, chat: &ChatLog) {
        if let Some(name) = &self.selected {
            self.feed = chat.messages_by(name, FRIEND_FEED_LIMIT);
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn feed(&self) -> &[String] {
        &self.feed
    }
}
