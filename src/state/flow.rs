use std::time::Duration;

use super::{AppState, ShowError};
use crate::protocol::ServerMessage;
use crate::types::*;

/// Pause between a correct answer and the next question
pub const AUTO_ADVANCE_DELAY: Duration = Duration::from_millis(1500);

impl AppState {
    // =========================================================================
    // Starting
    // =========================================================================

    /// Fetch the question pool and put the first question on screen.
    ///
    /// A failed fetch leaves the previous game (if any) untouched.
    pub async fn start_game(&self) -> Result<(), ShowError> {
        {
            let mut show = self.show.write().await;
            if show.loading {
                tracing::debug!("Start requested while questions are already loading");
                return Ok(());
            }
            show.loading = true;
            self.publish(&show);
        }

        tracing::info!("Loading questions from {}", self.source.describe());
        let fetched = self.source.fetch().await;

        let mut show = self.show.write().await;
        let show = &mut *show;
        show.loading = false;

        let loaded = fetched.and_then(|records| show.session.load_questions(records));
        if let Err(e) = loaded {
            tracing::error!("Failed to start game: {}", e);
            self.publish(show);
            return Err(e.into());
        }

        show.timers.cancel_all();
        show.audience = None;
        show.phone = None;
        show.pending_answer = None;
        show.last_result = None;
        show.started = true;

        show.reset_audio();
        self.play_effect(show, EffectClip::Intro);
        show.audio.play_narration(show.session.index());

        tracing::info!(
            "Game {} started with {} questions",
            show.session.id(),
            show.session.question_count()
        );
        self.publish(show);
        Ok(())
    }

    // =========================================================================
    // Answering
    // =========================================================================

    /// Pick an answer and ask the host to confirm it
    pub async fn prepare_answer(&self, key: AnswerKey) -> Result<(), ShowError> {
        let mut show = self.show.write().await;
        let show = &mut *show;
        show.ensure_playing()?;
        if show.session.locked() {
            return Err(ShowError::Locked);
        }

        show.pending_answer = Some(key);
        self.play_effect(show, EffectClip::FinalAnswer);
        self.publish(show);
        Ok(())
    }

    pub async fn cancel_answer(&self) {
        let mut show = self.show.write().await;
        if show.pending_answer.take().is_some() {
            self.publish(&show);
        }
    }

    /// Lock in the pending answer
    pub async fn confirm_answer(&self) -> Result<AnswerOutcome, ShowError> {
        let mut show = self.show.write().await;
        let show = &mut *show;
        show.ensure_playing()?;
        let key = show.pending_answer.take().ok_or(ShowError::NoPendingAnswer)?;

        let Some(outcome) = show.session.submit_answer(key) else {
            return Err(ShowError::Locked);
        };

        if outcome.correct {
            show.last_result = Some(LastResult::Correct);
            self.play_effect(show, EffectClip::Correct);
        } else {
            show.last_result = Some(LastResult::Incorrect);
            self.play_effect(show, EffectClip::Wrong);
        }

        if outcome.status == GameStatus::Playing {
            self.arm_advance(show);
        } else {
            show.leave_playing();
        }

        self.broadcast_to_all(ServerMessage::AnswerResult {
            correct: outcome.correct,
            status: outcome.status,
        });
        self.publish(show);
        Ok(outcome)
    }

    /// Fired by the advance timer
    pub(super) async fn auto_advance(&self, id: u64) {
        let mut show = self.show.write().await;
        if !show.timers.advance.is_armed(id) {
            return;
        }
        show.timers.advance.release(id);

        if show.session.advance() {
            show.close_audience();
            show.close_phone();
            show.question_changed();
            tracing::info!("Advanced to question {}", show.session.index() + 1);
            self.publish(&show);
        }
    }

    // =========================================================================
    // Restart / continue
    // =========================================================================

    /// Back to question one with a fresh deal and all lifelines
    pub async fn restart_game(&self) -> Result<(), ShowError> {
        let mut show = self.show.write().await;
        if !show.session.restart() {
            return Err(ShowError::NotStarted);
        }

        show.timers.cancel_all();
        show.audience = None;
        show.phone = None;
        show.pending_answer = None;
        show.reset_audio();
        show.question_changed();

        tracing::info!("Game restarted as {}", show.session.id());
        self.publish(&show);
        Ok(())
    }

    /// Retry the question that was just missed
    pub async fn continue_after_loss(&self) -> Result<(), ShowError> {
        let mut show = self.show.write().await;
        if !show.session.continue_after_loss() {
            return Err(ShowError::NotLost);
        }

        show.pending_answer = None;
        show.question_changed();
        self.publish(&show);
        Ok(())
    }

    // =========================================================================
    // Audio
    // =========================================================================

    pub async fn clip_done(&self, clip: ClipId, error: Option<String>) {
        if let Some(e) = error {
            tracing::warn!("Clip {} reported an error: {}", clip, e);
        }
        let mut show = self.show.write().await;
        show.timers.effect_finished(clip);
        show.audio.clip_done(clip);
    }

    /// Fired when a player never reported an effect finished
    pub(super) async fn clip_expired(&self, clip: ClipId) {
        let mut show = self.show.write().await;
        if !show.timers.take_effect_deadline(clip) {
            return;
        }
        tracing::warn!(
            "Clip {} not reported after {:?}; treating it as done",
            clip,
            self.config.clip_timeout
        );
        show.audio.clip_done(clip);
    }

    /// A host socket closed. With no host left, nobody will report the clips
    /// in flight, so they all count as done.
    pub async fn host_disconnected(&self) {
        if self.host_broadcast.receiver_count() > 0 {
            return;
        }
        let mut show = self.show.write().await;
        show.timers.cancel_effects();
        show.audio.complete_all();
    }
}
