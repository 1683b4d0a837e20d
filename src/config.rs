//! Runtime configuration from environment variables

use std::net::SocketAddr;
use std::time::Duration;

use crate::lifeline::DEFAULT_AUDIENCE_WINDOW;
use crate::twitch::TwitchConfig;

pub const DEFAULT_CLIP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct QuizConfig {
    /// Question document: file path or http(s) URL
    pub questions: String,
    pub bind: SocketAddr,
    pub static_dir: String,
    /// Prefix for clip resource names sent to the audio capability
    pub asset_base: String,
    pub audience_window: Duration,
    /// False when the host has no way to play audio
    pub audio: bool,
    /// Longest wait for a player to report an effect finished
    pub clip_timeout: Duration,
    /// Chat channel to join. There is no default; unset means no chat.
    pub twitch_channel: Option<String>,
    /// Login to use; anonymous when unset
    pub twitch_nick: Option<String>,
    pub twitch_token: Option<String>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            questions: "assets/questions.json".to_string(),
            bind: SocketAddr::from(([0, 0, 0, 0], 5050)),
            static_dir: "static".to_string(),
            asset_base: "assets/".to_string(),
            audience_window: DEFAULT_AUDIENCE_WINDOW,
            audio: true,
            clip_timeout: DEFAULT_CLIP_TIMEOUT,
            twitch_channel: None,
            twitch_nick: None,
            twitch_token: None,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

impl QuizConfig {
    /// Chat transport settings, if a channel is configured
    pub fn twitch(&self) -> Option<TwitchConfig> {
        self.twitch_channel.as_ref().map(|channel| TwitchConfig {
            channel: channel.clone(),
            nick: self.twitch_nick.clone(),
            token: self.twitch_token.clone(),
        })
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind = match non_empty_var("QUIZ_BIND") {
            Some(raw) => raw.parse::<SocketAddr>().unwrap_or_else(|e| {
                tracing::warn!("Invalid QUIZ_BIND {:?} ({}), using {}", raw, e, defaults.bind);
                defaults.bind
            }),
            None => defaults.bind,
        };

        let audience_window = non_empty_var("QUIZ_AUDIENCE_SECONDS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.audience_window);

        let audio = non_empty_var("QUIZ_AUDIO")
            .map(|v| v != "0" && v.to_lowercase() != "false")
            .unwrap_or(true);

        let clip_timeout = non_empty_var("QUIZ_CLIP_TIMEOUT_SECONDS")
            .and_then(|s| s.parse().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.clip_timeout);

        let twitch_channel = non_empty_var("TWITCH_CHANNEL");
        if twitch_channel.is_none() {
            tracing::warn!("TWITCH_CHANNEL not set - chat lifelines will see an empty chat");
        }

        Self {
            questions: non_empty_var("QUIZ_QUESTIONS").unwrap_or(defaults.questions),
            bind,
            static_dir: non_empty_var("QUIZ_STATIC_DIR").unwrap_or(defaults.static_dir),
            asset_base: non_empty_var("QUIZ_ASSET_BASE").unwrap_or(defaults.asset_base),
            audience_window,
            audio,
            clip_timeout,
            twitch_channel,
            twitch_nick: non_empty_var("TWITCH_NICK"),
            twitch_token: non_empty_var("TWITCH_OAUTH_TOKEN"),
        }
    }
}
