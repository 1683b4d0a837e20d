//! Cancelable background timers
//!
//! Each timer task carries the id it was armed with. A task whose id is no
//! longer the one in its slot has been replaced or cancelled and must not
//! touch the show, even if it woke up before `abort` reached it.

use std::collections::HashMap;
use std::future::Future;
use tokio::task::JoinHandle;

use super::{AppState, Show, AUTO_ADVANCE_DELAY};
use crate::lifeline::{AUDIENCE_TICK, PHONE_REFRESH};
use crate::types::{ClipId, EffectClip};

#[derive(Default)]
pub struct TimerSlot {
    armed: Option<(u64, JoinHandle<()>)>,
}

impl TimerSlot {
    fn arm(&mut self, id: u64, handle: JoinHandle<()>) {
        self.cancel();
        self.armed = Some((id, handle));
    }

    pub fn cancel(&mut self) {
        if let Some((_, handle)) = self.armed.take() {
            handle.abort();
        }
    }

    pub fn is_armed(&self, id: u64) -> bool {
        matches!(self.armed, Some((armed, _)) if armed == id)
    }

    pub fn is_active(&self) -> bool {
        self.armed.is_some()
    }

    /// Called by the task itself when it is done; the handle is dropped, not aborted
    pub(super) fn release(&mut self, id: u64) {
        if self.is_armed(id) {
            self.armed = None;
        }
    }
}

#[derive(Default)]
pub struct Timers {
    next_id: u64,
    pub audience: TimerSlot,
    pub advance: TimerSlot,
    pub phone: TimerSlot,
    /// Completion deadlines for effects still playing
    effects: HashMap<ClipId, JoinHandle<()>>,
}

impl Timers {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Game timers only; effect deadlines go with the audio
    pub fn cancel_all(&mut self) {
        self.audience.cancel();
        self.advance.cancel();
        self.phone.cancel();
    }

    pub fn cancel_effects(&mut self) {
        for (_, handle) in self.effects.drain() {
            handle.abort();
        }
    }

    /// The clip reported in; its deadline is moot
    pub(super) fn effect_finished(&mut self, clip: ClipId) {
        if let Some(handle) = self.effects.remove(&clip) {
            handle.abort();
        }
    }

    /// Called by the deadline task itself. False when the clip already finished.
    pub(super) fn take_effect_deadline(&mut self, clip: ClipId) -> bool {
        self.effects.remove(&clip).is_some()
    }

    pub fn effect_deadlines(&self) -> usize {
        self.effects.len()
    }
}

fn spawn<F>(make: impl FnOnce(u64) -> F, show: &mut Show) -> (u64, JoinHandle<()>)
where
    F: Future<Output = ()> + Send + 'static,
{
    let id = show.timers.next_id();
    (id, tokio::spawn(make(id)))
}

// Arming happens while the caller holds the show lock, so a task can never
// observe its slot before the slot knows about it.
impl AppState {
    pub(super) fn arm_advance(&self, show: &mut Show) {
        let state = self.clone();
        let (id, handle) = spawn(
            |id| async move {
                tokio::time::sleep(AUTO_ADVANCE_DELAY).await;
                state.auto_advance(id).await;
            },
            show,
        );
        show.timers.advance.arm(id, handle);
    }

    pub(super) fn arm_audience(&self, show: &mut Show) {
        let state = self.clone();
        let (id, handle) = spawn(
            |id| async move {
                loop {
                    tokio::time::sleep(AUDIENCE_TICK).await;
                    if !state.audience_tick(id).await {
                        break;
                    }
                }
            },
            show,
        );
        show.timers.audience.arm(id, handle);
    }

    pub(super) fn arm_phone(&self, show: &mut Show) {
        let state = self.clone();
        let (id, handle) = spawn(
            |id| async move {
                loop {
                    tokio::time::sleep(PHONE_REFRESH).await;
                    if !state.phone_refresh(id).await {
                        break;
                    }
                }
            },
            show,
        );
        show.timers.phone.arm(id, handle);
    }

    /// Start an effect and give the player a bounded time to report it done
    pub(super) fn play_effect(&self, show: &mut Show, effect: EffectClip) {
        let Some(clip) = show.audio.play_effect(effect) else {
            return;
        };
        let state = self.clone();
        let timeout = self.config.clip_timeout;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            state.clip_expired(clip).await;
        });
        show.timers.effects.insert(clip, handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rearm_aborts_previous() {
        let mut slot = TimerSlot::default();
        let first = tokio::spawn(std::future::pending::<()>());
        slot.arm(1, first);
        let second = tokio::spawn(std::future::pending::<()>());
        slot.arm(2, second);

        assert!(!slot.is_armed(1));
        assert!(slot.is_armed(2));
        slot.cancel();
        assert!(!slot.is_active());
    }

    #[tokio::test]
    async fn test_release_ignores_stale_id() {
        let mut slot = TimerSlot::default();
        slot.arm(5, tokio::spawn(async {}));
        slot.release(4);
        assert!(slot.is_armed(5));
        slot.release(5);
        assert!(!slot.is_active());
    }

    #[tokio::test]
    async fn test_effect_deadline_taken_once() {
        let mut timers = Timers::default();
        timers
            .effects
            .insert(3, tokio::spawn(std::future::pending::<()>()));
        assert!(timers.take_effect_deadline(3));
        assert!(!timers.take_effect_deadline(3));

        timers
            .effects
            .insert(4, tokio::spawn(std::future::pending::<()>()));
        timers.effect_finished(4);
        assert!(!timers.take_effect_deadline(4));
        assert_eq!(timers.effect_deadlines(), 0);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut timers = Timers::default();
        let a = timers.next_id();
        let b = timers.next_id();
        assert_ne!(a, b);
    }
}
