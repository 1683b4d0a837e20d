// Public API for integration tests and potential library usage

pub mod api;
pub mod audio;
pub mod chat;
pub mod config;
pub mod game;
pub mod lifeline;
pub mod protocol;
pub mod questions;
pub mod random;
pub mod state;
pub mod twitch;
pub mod types;
pub mod ws;

// Chat consumer task, public for testing
pub mod broadcast;
