use super::{AppState, ShowError};
use crate::lifeline::{pick_candidates, AudiencePoll, PhoneCall, AUDIENCE_TICK};
use crate::types::AnswerKey;

impl AppState {
    // =========================================================================
    // Fifty-fifty
    // =========================================================================

    pub async fn use_fifty_fifty(&self) -> Result<[AnswerKey; 2], ShowError> {
        let mut show = self.show.write().await;
        show.ensure_playing()?;
        let hidden = show
            .session
            .use_fifty_fifty()
            .ok_or(ShowError::LifelineUsed("fifty-fifty"))?;

        tracing::info!("Fifty-fifty hid {} and {}", hidden[0].as_str(), hidden[1].as_str());
        self.publish(&show);
        Ok(hidden)
    }

    // =========================================================================
    // Ask the audience
    // =========================================================================

    /// Open the chat vote for the configured window
    pub async fn ask_audience(&self) -> Result<(), ShowError> {
        let mut show = self.show.write().await;
        let show = &mut *show;
        show.ensure_playing()?;
        if !show.session.claim_audience() {
            return Err(ShowError::LifelineUsed("audience"));
        }

        show.audience = Some(AudiencePoll::start(self.config.audience_window));
        self.arm_audience(show);

        tracing::info!(
            "Audience vote open for {}s",
            self.config.audience_window.as_secs()
        );
        self.publish(show);
        Ok(())
    }

    /// One countdown step. Returns false once the timer should stop.
    pub(super) async fn audience_tick(&self, id: u64) -> bool {
        let mut show = self.show.write().await;
        let show = &mut *show;
        if !show.timers.audience.is_armed(id) {
            return false;
        }
        let Some(poll) = show.audience.as_mut() else {
            show.timers.audience.release(id);
            return false;
        };

        let collecting = poll.tick(AUDIENCE_TICK);
        if !collecting {
            tracing::info!("Audience vote closed with {} votes", poll.tally().total());
            show.timers.audience.release(id);
        }
        self.publish(show);
        collecting
    }

    /// Stop the vote and hide the panel
    pub async fn close_audience(&self) {
        let mut show = self.show.write().await;
        show.close_audience();
        self.publish(&show);
    }

    // =========================================================================
    // Phone a friend
    // =========================================================================

    /// Offer a handful of recent chatters to call
    pub async fn phone_friend(&self) -> Result<Vec<String>, ShowError> {
        let mut show = self.show.write().await;
        let show = &mut *show;
        show.ensure_playing()?;
        if !show.session.claim_phone() {
            return Err(ShowError::LifelineUsed("phone"));
        }

        let candidates = pick_candidates(&show.chat, &mut show.rng);
        if candidates.is_empty() {
            tracing::warn!("Phone-a-friend opened with nobody in chat");
        }
        show.phone = Some(PhoneCall::new(candidates.clone()));
        self.publish(show);
        Ok(candidates)
    }

    /// Put one chatter on the line and follow what they write
    pub async fn choose_friend(&self, name: String) -> Result<(), ShowError> {
        let mut show = self.show.write().await;
        let show = &mut *show;
        let Some(phone) = show.phone.as_mut() else {
            return Err(ShowError::PhoneClosed);
        };

        phone.choose(name.clone(), &show.chat);
        tracing::info!("Calling {}", name);
        show.session.set_active_friend(Some(name));
        self.arm_phone(show);
        self.publish(show);
        Ok(())
    }

    /// Pull the friend's latest lines. Returns false once the timer should stop.
    pub(super) async fn phone_refresh(&self, id: u64) -> bool {
        let mut show = self.show.write().await;
        let show = &mut *show;
        if !show.timers.phone.is_armed(id) {
            return false;
        }
        let Some(phone) = show.phone.as_mut() else {
            show.timers.phone.release(id);
            return false;
        };

        phone.refresh(&show.chat);
        self.publish(show);
        true
    }

    pub async fn close_phone(&self) {
        let mut show = self.show.write().await;
        show.close_phone();
        self.publish(&show);
    }
}
