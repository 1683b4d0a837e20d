use serde::{Deserialize, Serialize};

pub type GameId = String;
pub type QuestionId = String;
pub type ClipId = u64;

/// One of the four answer slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnswerKey {
    A,
    B,
    C,
    D,
}

impl AnswerKey {
    pub const ALL: [AnswerKey; 4] = [AnswerKey::A, AnswerKey::B, AnswerKey::C, AnswerKey::D];

    /// Slot position (A = 0 ... D = 3)
    pub fn index(self) -> usize {
        match self {
            AnswerKey::A => 0,
            AnswerKey::B => 1,
            AnswerKey::C => 2,
            AnswerKey::D => 3,
        }
    }

    /// Exact letter match, no trimming or case folding
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "A" => Some(AnswerKey::A),
            "B" => Some(AnswerKey::B),
            "C" => Some(AnswerKey::C),
            "D" => Some(AnswerKey::D),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnswerKey::A => "A",
            AnswerKey::B => "B",
            AnswerKey::C => "C",
            AnswerKey::D => "D",
        }
    }
}

/// A question as stored in the question document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub id: QuestionId,
    pub prompt: String,
    pub correct_answer: String,
    pub wrong_answers: [String; 3],
}

/// A question as played in one game, with its options placed on the four keys
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundQuestion {
    pub id: QuestionId,
    pub prompt: String,
    /// Option texts indexed by `AnswerKey::index`
    pub answers: [String; 4],
    pub correct: AnswerKey,
}

impl RoundQuestion {
    pub fn answer(&self, key: AnswerKey) -> &str {
        &self.answers[key.index()]
    }

    /// The three keys that do not hold the correct answer, in key order
    pub fn wrong_keys(&self) -> Vec<AnswerKey> {
        AnswerKey::ALL
            .into_iter()
            .filter(|k| *k != self.correct)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

/// Returned by a submission that was actually evaluated
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub status: GameStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LastResult {
    Correct,
    Incorrect,
}

/// Which one-shot assists have been spent this game
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LifelineFlags {
    pub fifty_fifty: bool,
    pub audience: bool,
    pub phone: bool,
}

/// A normalized chat line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatEntry {
    pub user: String,
    pub text: String,
    pub timestamp_ms: i64,
}

/// Placeholder name for chat lines that carry neither a display name nor a login
pub const FALLBACK_CHAT_USER: &str = "user";

impl ChatEntry {
    /// Build an entry from whatever identity the transport could extract
    pub fn from_parts(
        display_name: Option<&str>,
        login: Option<&str>,
        text: impl Into<String>,
        timestamp_ms: i64,
    ) -> Self {
        let user = display_name
            .filter(|s| !s.is_empty())
            .or(login.filter(|s| !s.is_empty()))
            .unwrap_or(FALLBACK_CHAT_USER)
            .to_string();

        Self {
            user,
            text: text.into(),
            timestamp_ms,
        }
    }
}

/// Short fixed sounds layered over narration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EffectClip {
    Intro,
    FinalAnswer,
    Correct,
    Wrong,
}

impl EffectClip {
    pub fn file_name(self) -> &'static str {
        match self {
            EffectClip::Intro => "intro.mp3",
            EffectClip::FinalAnswer => "final.mp3",
            EffectClip::Correct => "correct.mp3",
            EffectClip::Wrong => "wrong.mp3",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Viewer,
}

/// Prize for each question, first question first
pub const MONEY_LADDER: [&str; 15] = [
    "£100",
    "£200",
    "£300",
    "£500",
    "£1,000",
    "£2,000",
    "£4,000",
    "£8,000",
    "£16,000",
    "£32,000",
    "£64,000",
    "£125,000",
    "£250,000",
    "£500,000",
    "£1,000,000",
];

/// Prize label for a 0-based question index, if the ladder reaches that far
pub fn prize_for(index: usize) -> Option<&'static str> {
    MONEY_LADDER.get(index).copied()
}
