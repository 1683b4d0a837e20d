use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    StartGame,
    /// Pick an answer; opens the final-answer confirmation
    PrepareAnswer {
        key: AnswerKey,
    },
    ConfirmAnswer,
    CancelAnswer,
    UseFiftyFifty,
    AskAudience,
    CloseAudience,
    PhoneFriend,
    ChooseFriend {
        name: String,
    },
    ClosePhone,
    Restart,
    ContinueAfterLoss,
    /// Sent by the page that played a clip, once it ended or failed
    ClipDone {
        clip_id: ClipId,
        #[serde(default)]
        error: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        role: Role,
        game: GameView,
        server_now: String,
    },
    GameState {
        game: GameView,
    },
    AnswerResult {
        correct: bool,
        status: GameStatus,
    },
    ChatLine {
        entry: ChatEntry,
    },
    PlayClip {
        clip_id: ClipId,
        resource: String,
    },
    StopClip {
        clip_id: ClipId,
    },
    Error {
        code: String,
        msg: String,
    },
}

/// Everything a screen needs to render the show
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameView {
    pub game_id: GameId,
    pub started: bool,
    pub loading: bool,
    pub status: GameStatus,
    pub index: usize,
    pub question_count: usize,
    pub prize: Option<String>,
    pub question: Option<QuestionView>,
    pub locked: bool,
    pub lifelines: LifelineFlags,
    pub pending_answer: Option<AnswerKey>,
    pub last_result: Option<LastResult>,
    pub active_friend: Option<String>,
    pub audience: Option<AudienceView>,
    pub phone: Option<PhoneView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: QuestionId,
    pub prompt: String,
    pub options: Vec<OptionView>,
    /// Only revealed once an answer has locked the question
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<AnswerKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionView {
    pub key: AnswerKey,
    pub text: String,
    pub hidden: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudienceView {
    pub collecting: bool,
    pub remaining_ms: u64,
    pub total: u32,
    pub shares: Vec<VoteShare>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoteShare {
    pub key: AnswerKey,
    pub votes: u32,
    pub percent: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoneView {
    pub candidates: Vec<String>,
    pub selected: Option<String>,
    pub feed: Vec<String>,
}
