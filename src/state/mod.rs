mod chat;
mod flow;
mod lifelines;
mod timers;

pub use flow::AUTO_ADVANCE_DELAY;
pub use timers::{TimerSlot, Timers};

use crate::audio::{AudioSequencer, RemoteAudio};
use crate::chat::ChatLog;
use crate::config::QuizConfig;
use crate::game::GameSession;
use crate::lifeline::{AudiencePoll, PhoneCall};
use crate::protocol::*;
use crate::questions::{LoadError, QuestionSource};
use crate::random::{self, GameRng};
use crate::types::*;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Reasons a host command is turned down. The show is left untouched.
#[derive(Debug, thiserror::Error)]
pub enum ShowError {
    #[error("The game has not been started")]
    NotStarted,

    #[error("The game is over")]
    NotPlaying,

    #[error("The answer is already locked in")]
    Locked,

    #[error("No answer is waiting for confirmation")]
    NoPendingAnswer,

    #[error("The {0} lifeline has already been used")]
    LifelineUsed(&'static str),

    #[error("Phone-a-friend is not open")]
    PhoneClosed,

    #[error("Can only continue after a wrong answer")]
    NotLost,

    #[error(transparent)]
    Load(#[from] LoadError),
}

impl ShowError {
    /// Stable code for `ServerMessage::Error`
    pub fn code(&self) -> &'static str {
        match self {
            ShowError::NotStarted => "NOT_STARTED",
            ShowError::NotPlaying => "NOT_PLAYING",
            ShowError::Locked => "LOCKED",
            ShowError::NoPendingAnswer => "NO_PENDING_ANSWER",
            ShowError::LifelineUsed(_) => "LIFELINE_USED",
            ShowError::PhoneClosed => "PHONE_CLOSED",
            ShowError::NotLost => "NOT_LOST",
            ShowError::Load(_) => "LOAD_FAILED",
        }
    }
}

/// Everything that changes during a show. Guarded by one lock so every
/// event applies as a whole.
pub struct Show {
    pub session: GameSession,
    pub chat: ChatLog,
    pub audience: Option<AudiencePoll>,
    pub phone: Option<PhoneCall>,
    pub audio: AudioSequencer,
    pub timers: Timers,
    pub rng: GameRng,
    pub started: bool,
    pub loading: bool,
    pub pending_answer: Option<AnswerKey>,
    pub last_result: Option<LastResult>,
}

impl Show {
    fn new(session: GameSession, rng: GameRng, audio: AudioSequencer) -> Self {
        Self {
            session,
            chat: ChatLog::new(),
            audience: None,
            phone: None,
            audio,
            timers: Timers::default(),
            rng,
            started: false,
            loading: false,
            pending_answer: None,
            last_result: None,
        }
    }

    fn ensure_playing(&self) -> Result<(), ShowError> {
        if !self.started {
            return Err(ShowError::NotStarted);
        }
        if self.session.status() != GameStatus::Playing {
            return Err(ShowError::NotPlaying);
        }
        Ok(())
    }

    fn close_audience(&mut self) {
        self.timers.audience.cancel();
        if let Some(mut poll) = self.audience.take() {
            poll.stop();
            tracing::info!("Audience closed with {} votes", poll.tally().total());
        }
    }

    fn close_phone(&mut self) {
        self.timers.phone.cancel();
        if self.phone.take().is_some() {
            tracing::info!("Phone-a-friend closed");
        }
    }

    /// Status moved to won or lost
    fn leave_playing(&mut self) {
        self.close_audience();
        self.close_phone();
        self.timers.advance.cancel();
        self.audio.stop();
    }

    /// Nothing left over from a previous game may hold narration back
    fn reset_audio(&mut self) {
        self.timers.cancel_effects();
        self.audio.reset();
    }

    /// A new question is on screen (advance, restart, continue)
    fn question_changed(&mut self) {
        self.last_result = None;
        if self.started && self.session.current().is_some() {
            self.audio.play_narration(self.session.index());
        }
    }

    pub fn view(&self) -> GameView {
        let session = &self.session;
        let index = session.index();

        let question = session.current().map(|q| QuestionView {
            id: q.id.clone(),
            prompt: q.prompt.clone(),
            options: AnswerKey::ALL
                .iter()
                .map(|key| OptionView {
                    key: *key,
                    text: q.answer(*key).to_string(),
                    hidden: session.hidden().contains(key),
                })
                .collect(),
            correct: session.locked().then_some(q.correct),
        });

        let audience = self.audience.as_ref().map(|poll| {
            let tally = poll.tally();
            AudienceView {
                collecting: poll.is_collecting(),
                remaining_ms: poll.remaining().as_millis() as u64,
                total: tally.total(),
                shares: AnswerKey::ALL
                    .iter()
                    .map(|key| VoteShare {
                        key: *key,
                        votes: tally.get(*key),
                        percent: tally.percent(*key),
                    })
                    .collect(),
            }
        });

        let phone = self.phone.as_ref().map(|call| PhoneView {
            candidates: call.candidates().to_vec(),
            selected: call.selected().map(str::to_string),
            feed: call.feed().to_vec(),
        });

        GameView {
            game_id: session.id().to_string(),
            started: self.started,
            loading: self.loading,
            status: session.status(),
            index,
            question_count: session.question_count(),
            prize: session
                .is_loaded()
                .then(|| prize_for(index))
                .flatten()
                .map(str::to_string),
            question,
            locked: session.locked(),
            lifelines: session.lifelines(),
            pending_answer: self.pending_answer,
            last_result: self.last_result,
            active_friend: session.active_friend().map(str::to_string),
            audience,
            phone,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub show: Arc<RwLock<Show>>,
    /// Every connected client receives these
    pub broadcast: broadcast::Sender<ServerMessage>,
    /// Host sockets only; carries the audio commands
    pub host_broadcast: broadcast::Sender<ServerMessage>,
    pub config: Arc<QuizConfig>,
    pub source: Arc<dyn QuestionSource>,
}

impl AppState {
    pub fn new(config: QuizConfig, source: Arc<dyn QuestionSource>) -> Self {
        Self::build(config, source, GameSession::new(), random::from_os())
    }

    /// Reproducible answer placement and sampling, for tests
    pub fn with_seed(config: QuizConfig, source: Arc<dyn QuestionSource>, seed: u64) -> Self {
        Self::build(
            config,
            source,
            GameSession::with_seed(seed),
            random::seeded(seed.wrapping_add(1)),
        )
    }

    fn build(
        config: QuizConfig,
        source: Arc<dyn QuestionSource>,
        session: GameSession,
        rng: GameRng,
    ) -> Self {
        let (tx, _rx) = broadcast::channel(256);
        let (host_tx, _host_rx) = broadcast::channel(64);

        let audio = if config.audio {
            AudioSequencer::new(
                Box::new(RemoteAudio::new(host_tx.clone())),
                config.asset_base.clone(),
            )
        } else {
            tracing::info!("Audio disabled");
            AudioSequencer::disabled()
        };

        Self {
            show: Arc::new(RwLock::new(Show::new(session, rng, audio))),
            broadcast: tx,
            host_broadcast: host_tx,
            config: Arc::new(config),
            source,
        }
    }

    /// Swap in a recording audio capability
    #[cfg(test)]
    pub(crate) async fn set_audio_output(&self, output: Box<dyn crate::audio::AudioOutput>) {
        let mut show = self.show.write().await;
        show.timers.cancel_effects();
        show.audio = AudioSequencer::new(output, self.config.asset_base.clone());
    }

    pub async fn game_view(&self) -> GameView {
        self.show.read().await.view()
    }

    /// Send to every connected client
    pub fn broadcast_to_all(&self, msg: ServerMessage) {
        // No receivers connected is fine
        let _ = self.broadcast.send(msg);
    }

    fn publish(&self, show: &Show) {
        self.broadcast_to_all(ServerMessage::GameState { game: show.view() });
    }
}
