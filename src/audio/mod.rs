//! Audio sequencing
//!
//! Effects (intro, final-answer chime, correct, wrong) always win over
//! question narration: starting an effect cuts the narration, and a narration
//! requested while effects are still playing waits until the last one
//! reports completion. Only the newest waiting narration is kept.
//!
//! The sequencer never looks at game status. Callers decide when to request
//! narration and when to `stop`.

mod remote;

pub use remote::RemoteAudio;

use std::collections::HashSet;

use crate::types::{ClipId, EffectClip};

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("no client connected to play audio")]
    NoListener,

    #[error("playback failed: {0}")]
    Failed(String),
}

/// Host capability for playing named clips.
///
/// Completion (natural end or error) is reported back separately through
/// [`AudioSequencer::clip_done`] with the same id.
pub trait AudioOutput: Send + Sync {
    fn play(&mut self, clip: ClipId, resource: &str) -> Result<(), PlaybackError>;

    /// Stop a clip and rewind it
    fn stop(&mut self, clip: ClipId);
}

pub struct AudioSequencer {
    output: Option<Box<dyn AudioOutput>>,
    asset_base: String,
    next_clip: ClipId,
    active_effects: HashSet<ClipId>,
    pending_narration: Option<usize>,
    narration: Option<ClipId>,
}

impl AudioSequencer {
    pub fn new(output: Box<dyn AudioOutput>, asset_base: impl Into<String>) -> Self {
        Self {
            output: Some(output),
            asset_base: asset_base.into(),
            next_clip: 1,
            active_effects: HashSet::new(),
            pending_narration: None,
            narration: None,
        }
    }

    /// Sequencer for hosts without audio; every call is a no-op
    pub fn disabled() -> Self {
        Self {
            output: None,
            asset_base: String::new(),
            next_clip: 1,
            active_effects: HashSet::new(),
            pending_narration: None,
            narration: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.output.is_some()
    }

    /// Request narration for a 0-based question index
    pub fn play_narration(&mut self, index: usize) {
        if self.output.is_none() {
            return;
        }
        self.pending_narration = Some(index);
        self.try_start_narration();
    }

    /// Start an effect, cutting any narration.
    ///
    /// Returns the clip id while the effect is outstanding, `None` when it
    /// never started.
    pub fn play_effect(&mut self, effect: EffectClip) -> Option<ClipId> {
        if self.output.is_none() {
            return None;
        }
        self.stop_narration();

        let clip = self.allocate_clip();
        let resource = format!("{}{}", self.asset_base, effect.file_name());
        self.active_effects.insert(clip);
        tracing::debug!("Effect {:?} started as clip {}", effect, clip);

        let started = match self.output.as_mut() {
            Some(output) => output.play(clip, &resource),
            None => Ok(()),
        };
        if let Err(e) = started {
            tracing::warn!("Effect {} failed to start: {}", resource, e);
            self.clip_done(clip);
            return None;
        }
        Some(clip)
    }

    /// A clip ended or errored. Each clip counts once; unknown ids are ignored.
    pub fn clip_done(&mut self, clip: ClipId) {
        if self.active_effects.remove(&clip) {
            if self.active_effects.is_empty() {
                self.try_start_narration();
            }
        } else if self.narration == Some(clip) {
            self.narration = None;
        } else {
            tracing::debug!("Ignoring completion for unknown clip {}", clip);
        }
    }

    /// Cut narration and forget any waiting request. Effects keep playing.
    pub fn stop(&mut self) {
        self.pending_narration = None;
        self.stop_narration();
    }

    /// Count every outstanding clip as finished. Used when the player is
    /// gone and no completion will ever arrive.
    pub fn complete_all(&mut self) {
        self.narration = None;
        if self.active_effects.is_empty() {
            return;
        }
        tracing::info!(
            "Treating {} unfinished effects as done",
            self.active_effects.len()
        );
        self.active_effects.clear();
        self.try_start_narration();
    }

    /// Stop everything, effects included, and forget all waiting work
    pub fn reset(&mut self) {
        self.stop();
        let effects: Vec<ClipId> = self.active_effects.drain().collect();
        if let Some(output) = self.output.as_mut() {
            for clip in effects {
                output.stop(clip);
            }
        }
    }

    pub fn active_effect_count(&self) -> usize {
        self.active_effects.len()
    }

    pub fn pending_narration(&self) -> Option<usize> {
        self.pending_narration
    }

    pub fn narration_clip(&self) -> Option<ClipId> {
        self.narration
    }

    fn try_start_narration(&mut self) {
        if !self.active_effects.is_empty() {
            return;
        }
        if let Some(index) = self.pending_narration.take() {
            self.start_narration(index);
        }
    }

    fn start_narration(&mut self, index: usize) {
        self.stop_narration();

        let clip = self.allocate_clip();
        let resource = narration_resource(&self.asset_base, index);
        let Some(output) = self.output.as_mut() else {
            return;
        };

        match output.play(clip, &resource) {
            Ok(()) => {
                tracing::debug!("Narration {} started as clip {}", resource, clip);
                self.narration = Some(clip);
            }
            Err(e) => tracing::warn!("Narration {} failed to start: {}", resource, e),
        }
    }

    fn stop_narration(&mut self) {
        if let Some(clip) = self.narration.take() {
            if let Some(output) = self.output.as_mut() {
                output.stop(clip);
            }
        }
    }

    fn allocate_clip(&mut self) -> ClipId {
        let clip = self.next_clip;
        self.next_clip += 1;
        clip
    }
}

/// `question-07.mp3` for index 6
pub fn narration_resource(asset_base: &str, index: usize) -> String {
    format!("{}question-{:02}.mp3", asset_base, index + 1)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Call {
        Play(ClipId, String),
        Stop(ClipId),
    }

    /// Records every call; optionally refuses to start
    #[derive(Clone, Default)]
    pub(crate) struct RecordingOutput {
        pub calls: Arc<Mutex<Vec<Call>>>,
        pub fail: bool,
    }

    impl RecordingOutput {
        pub fn played(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter_map(|c| match c {
                    Call::Play(_, r) => Some(r.clone()),
                    Call::Stop(_) => None,
                })
                .collect()
        }

        pub fn clip_for(&self, resource: &str) -> ClipId {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find_map(|c| match c {
                    Call::Play(id, r) if r == resource => Some(*id),
                    _ => None,
                })
                .unwrap()
        }

        pub fn stopped(&self) -> Vec<ClipId> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter_map(|c| match c {
                    Call::Stop(id) => Some(*id),
                    Call::Play(..) => None,
                })
                .collect()
        }
    }

    impl AudioOutput for RecordingOutput {
        fn play(&mut self, clip: ClipId, resource: &str) -> Result<(), PlaybackError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Play(clip, resource.to_string()));
            if self.fail {
                Err(PlaybackError::Failed("refused".to_string()))
            } else {
                Ok(())
            }
        }

        fn stop(&mut self, clip: ClipId) {
            self.calls.lock().unwrap().push(Call::Stop(clip));
        }
    }

    fn sequencer() -> (AudioSequencer, RecordingOutput) {
        let output = RecordingOutput::default();
        (AudioSequencer::new(Box::new(output.clone()), ""), output)
    }

    #[test]
    fn test_narration_resource_is_zero_padded() {
        assert_eq!(narration_resource("assets/", 0), "assets/question-01.mp3");
        assert_eq!(narration_resource("", 14), "question-15.mp3");
    }

    #[test]
    fn test_narration_starts_immediately_when_idle() {
        let (mut seq, out) = sequencer();
        seq.play_narration(2);
        assert_eq!(out.played(), vec!["question-03.mp3"]);
        assert!(seq.pending_narration().is_none());
        assert!(seq.narration_clip().is_some());
    }

    #[test]
    fn test_effect_cuts_narration_and_starts_immediately() {
        let (mut seq, out) = sequencer();
        seq.play_narration(0);
        let narration = seq.narration_clip().unwrap();

        seq.play_effect(EffectClip::FinalAnswer);
        assert_eq!(out.stopped(), vec![narration]);
        assert_eq!(out.played(), vec!["question-01.mp3", "final.mp3"]);
        assert_eq!(seq.active_effect_count(), 1);
        assert!(seq.narration_clip().is_none());
    }

    #[test]
    fn test_narration_waits_for_effects() {
        let (mut seq, out) = sequencer();
        seq.play_effect(EffectClip::Intro);
        seq.play_narration(0);
        assert_eq!(out.played(), vec!["intro.mp3"]);
        assert_eq!(seq.pending_narration(), Some(0));

        seq.clip_done(out.clip_for("intro.mp3"));
        assert_eq!(out.played(), vec!["intro.mp3", "question-01.mp3"]);
        assert!(seq.pending_narration().is_none());
    }

    #[test]
    fn test_latest_pending_narration_wins() {
        let (mut seq, out) = sequencer();
        seq.play_effect(EffectClip::Correct);
        seq.play_narration(3);
        seq.play_narration(4);

        seq.clip_done(out.clip_for("correct.mp3"));
        assert_eq!(out.played(), vec!["correct.mp3", "question-05.mp3"]);
    }

    #[test]
    fn test_narration_waits_for_all_effects() {
        let (mut seq, out) = sequencer();
        seq.play_effect(EffectClip::Intro);
        seq.play_effect(EffectClip::FinalAnswer);
        seq.play_narration(0);

        seq.clip_done(out.clip_for("intro.mp3"));
        assert_eq!(seq.active_effect_count(), 1);
        assert_eq!(out.played().len(), 2);

        seq.clip_done(out.clip_for("final.mp3"));
        assert_eq!(out.played().last().unwrap(), "question-01.mp3");
    }

    #[test]
    fn test_completion_counts_once() {
        let (mut seq, out) = sequencer();
        seq.play_effect(EffectClip::Intro);
        seq.play_effect(EffectClip::Wrong);
        let intro = out.clip_for("intro.mp3");

        seq.clip_done(intro);
        seq.clip_done(intro);
        assert_eq!(seq.active_effect_count(), 1);
    }

    #[test]
    fn test_stop_clears_pending_but_not_effects() {
        let (mut seq, out) = sequencer();
        seq.play_effect(EffectClip::Wrong);
        seq.play_narration(1);

        seq.stop();
        assert!(seq.pending_narration().is_none());
        assert_eq!(seq.active_effect_count(), 1);

        seq.clip_done(out.clip_for("wrong.mp3"));
        assert_eq!(out.played(), vec!["wrong.mp3"]);
    }

    #[test]
    fn test_stop_cuts_running_narration() {
        let (mut seq, out) = sequencer();
        seq.play_narration(0);
        let clip = seq.narration_clip().unwrap();
        seq.stop();
        assert_eq!(out.stopped(), vec![clip]);
    }

    #[test]
    fn test_new_narration_replaces_running_one() {
        let (mut seq, out) = sequencer();
        seq.play_narration(0);
        let first = seq.narration_clip().unwrap();
        seq.play_narration(1);
        assert_eq!(out.stopped(), vec![first]);
        assert_eq!(out.played(), vec!["question-01.mp3", "question-02.mp3"]);
    }

    #[test]
    fn test_failed_effect_counts_as_done() {
        let output = RecordingOutput {
            fail: true,
            ..Default::default()
        };
        let mut seq = AudioSequencer::new(Box::new(output.clone()), "");
        seq.play_effect(EffectClip::Intro);
        assert_eq!(seq.active_effect_count(), 0);

        // Narration is attempted, fails quietly
        seq.play_narration(0);
        assert!(seq.narration_clip().is_none());
        assert_eq!(output.played(), vec!["intro.mp3", "question-01.mp3"]);
    }

    #[test]
    fn test_finished_narration_is_forgotten() {
        let (mut seq, out) = sequencer();
        seq.play_narration(0);
        seq.clip_done(out.clip_for("question-01.mp3"));
        assert!(seq.narration_clip().is_none());

        seq.play_effect(EffectClip::Correct);
        assert!(out.stopped().is_empty());
    }

    #[test]
    fn test_complete_all_releases_waiting_narration() {
        let (mut seq, out) = sequencer();
        seq.play_effect(EffectClip::Intro);
        seq.play_effect(EffectClip::FinalAnswer);
        seq.play_narration(2);

        seq.complete_all();
        assert_eq!(seq.active_effect_count(), 0);
        assert_eq!(out.played().last().unwrap(), "question-03.mp3");

        // A late report for a released clip changes nothing
        seq.clip_done(out.clip_for("intro.mp3"));
        assert!(seq.narration_clip().is_some());
    }

    #[test]
    fn test_reset_stops_effects_and_forgets_pending() {
        let (mut seq, out) = sequencer();
        let intro = seq.play_effect(EffectClip::Intro).unwrap();
        seq.play_narration(0);

        seq.reset();
        assert_eq!(out.stopped(), vec![intro]);
        assert_eq!(seq.active_effect_count(), 0);
        assert!(seq.pending_narration().is_none());

        seq.play_narration(1);
        assert_eq!(out.played().last().unwrap(), "question-02.mp3");
    }

    #[test]
    fn test_play_effect_reports_clip() {
        let (mut seq, out) = sequencer();
        let clip = seq.play_effect(EffectClip::Correct);
        assert_eq!(clip, Some(out.clip_for("correct.mp3")));

        let failing = RecordingOutput {
            fail: true,
            ..Default::default()
        };
        let mut seq = AudioSequencer::new(Box::new(failing), "");
        assert!(seq.play_effect(EffectClip::Correct).is_none());
    }

    #[test]
    fn test_disabled_sequencer_is_inert() {
        let mut seq = AudioSequencer::disabled();
        assert!(seq.play_effect(EffectClip::Intro).is_none());
        seq.play_narration(0);
        seq.clip_done(1);
        seq.stop();
        assert_eq!(seq.active_effect_count(), 0);
        assert!(seq.pending_narration().is_none());
        assert!(!seq.is_enabled());
    }
}
