//! Ask-the-audience: chat votes for A/B/C/D during a countdown window

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::AnswerKey;

pub const DEFAULT_AUDIENCE_WINDOW: Duration = Duration::from_secs(60);
pub const AUDIENCE_TICK: Duration = Duration::from_secs(1);

/// Votes per option, indexed by `AnswerKey::index`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudienceTally {
    counts: [u32; 4],
}

impl AudienceTally {
    pub fn get(&self, key: AnswerKey) -> u32 {
        self.counts[key.index()]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Rounded share of the vote, 0 when nobody voted
    pub fn percent(&self, key: AnswerKey) -> u32 {
        vote_percent(self.get(key), self.total())
    }

    fn add(&mut self, key: AnswerKey) {
        self.counts[key.index()] += 1;
    }
}

/// round(100 * count / total), halves rounding up
pub fn vote_percent(count: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let (count, total) = (u64::from(count), u64::from(total));
    ((200 * count + total) / (2 * total)) as u32
}

/// One activation of the audience lifeline
#[derive(Debug, Clone)]
pub struct AudiencePoll {
    tally: AudienceTally,
    collecting: bool,
    remaining: Duration,
}

impl AudiencePoll {
    /// Open a poll with zeroed counters
    pub fn start(window: Duration) -> Self {
        Self {
            tally: AudienceTally::default(),
            collecting: !window.is_zero(),
            remaining: window,
        }
    }

    /// Count a chat line if it is exactly one option letter
    pub fn record(&mut self, text: &str) -> Option<AnswerKey> {
        if !self.collecting {
            return None;
        }
        let key = AnswerKey::from_letter(&text.trim().to_uppercase())?;
        self.tally.add(key);
        Some(key)
    }

    /// Advance the countdown. Returns true while the poll is still collecting.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(elapsed);
        if self.remaining.is_zero() {
            self.collecting = false;
        }
        self.collecting
    }

    /// Freeze the counts
    pub fn stop(&mut self) {
        self.collecting = false;
    }

    pub fn tally(&self) -> &AudienceTally {
        &self.tally
    }

    pub fn is_collecting(&self) -> bool {
        self.collecting
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_counts_exact_letters() {
        let mut poll = AudiencePoll::start(DEFAULT_AUDIENCE_WINDOW);
        for _ in 0..5 {
            poll.record("A");
        }
        for text in ["b", " B ", "b\n"] {
            poll.record(text);
        }
        poll.record("D");
        poll.record("d");
        poll.record("hello");
        poll.record("A!");
        poll.record("a b");
        poll.record("");

        let tally = poll.tally();
        assert_eq!(tally.get(AnswerKey::A), 5);
        assert_eq!(tally.get(AnswerKey::B), 3);
        assert_eq!(tally.get(AnswerKey::C), 0);
        assert_eq!(tally.get(AnswerKey::D), 2);
        assert_eq!(tally.total(), 10);

        let percents: Vec<u32> = AnswerKey::ALL.iter().map(|k| tally.percent(*k)).collect();
        assert_eq!(percents, vec![50, 30, 0, 20]);
    }

    #[test]
    fn test_percent_without_votes() {
        let poll = AudiencePoll::start(DEFAULT_AUDIENCE_WINDOW);
        for key in AnswerKey::ALL {
            assert_eq!(poll.tally().percent(key), 0);
        }
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(vote_percent(1, 3), 33);
        assert_eq!(vote_percent(2, 3), 67);
        assert_eq!(vote_percent(1, 8), 13); // 12.5 rounds up
        assert_eq!(vote_percent(7, 7), 100);
    }

    #[test]
    fn test_countdown_stops_collection() {
        let mut poll = AudiencePoll::start(Duration::from_secs(3));
        assert!(poll.tick(AUDIENCE_TICK));
        assert!(poll.tick(AUDIENCE_TICK));
        poll.record("C");
        assert!(!poll.tick(AUDIENCE_TICK));
        assert_eq!(poll.remaining(), Duration::ZERO);

        // Frozen after expiry
        poll.record("C");
        assert_eq!(poll.tally().get(AnswerKey::C), 1);
    }

    #[test]
    fn test_stop_freezes() {
        let mut poll = AudiencePoll::start(DEFAULT_AUDIENCE_WINDOW);
        poll.record("a");
        poll.stop();
        assert_eq!(poll.record("a"), None);
        assert_eq!(poll.tally().get(AnswerKey::A), 1);
    }

    #[test]
    fn test_new_poll_starts_at_zero() {
        let mut first = AudiencePoll::start(DEFAULT_AUDIENCE_WINDOW);
        first.record("B");
        let second = AudiencePoll::start(DEFAULT_AUDIENCE_WINDOW);
        assert_eq!(second.tally().total(), 0);
    }
}
