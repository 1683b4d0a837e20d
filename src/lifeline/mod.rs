//! Lifeline engine
//!
//! Pure helpers behind the three assists. Whether a lifeline may still be
//! used is decided by `GameSession`, not here.

mod audience;
mod phone;

pub use audience::{
    vote_percent, AudiencePoll, AudienceTally, AUDIENCE_TICK, DEFAULT_AUDIENCE_WINDOW,
};
pub use phone::{pick_candidates, PhoneCall, FRIEND_FEED_LIMIT, PHONE_CANDIDATES, PHONE_REFRESH};

use rand::Rng;

use crate::random;
use crate::types::AnswerKey;

/// Pick the two wrong options to conceal
pub fn fifty_fifty<R: Rng + ?Sized>(correct: AnswerKey, rng: &mut R) -> [AnswerKey; 2] {
    let wrong: Vec<AnswerKey> = AnswerKey::ALL
        .into_iter()
        .filter(|k| *k != correct)
        .collect();
    let picked = random::draw(wrong, 2, rng);
    [picked[0], picked[1]]
}
