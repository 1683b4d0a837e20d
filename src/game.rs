//! Game session state machine
//!
//! Owns the question list for one playthrough, the current position, the
//! answer lock and the lifeline bookkeeping. Everything here is synchronous;
//! timers, audio and chat are driven from `state`.

use crate::lifeline;
use crate::questions::LoadError;
use crate::random::{self, GameRng};
use crate::types::*;

pub struct GameSession {
    id: GameId,
    records: Vec<QuestionRecord>,
    questions: Vec<RoundQuestion>,
    index: usize,
    locked: bool,
    status: GameStatus,
    lifelines: LifelineFlags,
    hidden: Vec<AnswerKey>,
    active_friend: Option<String>,
    rng: GameRng,
}

impl GameSession {
    pub fn new() -> Self {
        Self::with_rng(random::from_os())
    }

    /// Session with reproducible answer placement and fifty-fifty picks
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(random::seeded(seed))
    }

    fn with_rng(rng: GameRng) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            records: Vec::new(),
            questions: Vec::new(),
            index: 0,
            locked: false,
            status: GameStatus::Playing,
            lifelines: LifelineFlags::default(),
            hidden: Vec::new(),
            active_friend: None,
            rng,
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Replace the question pool and start a fresh playthrough
    pub fn load_questions(&mut self, records: Vec<QuestionRecord>) -> Result<(), LoadError> {
        if records.is_empty() {
            return Err(LoadError::Empty);
        }

        self.records = records;
        self.start_playthrough();
        tracing::info!(
            "Loaded {} questions into game {}",
            self.records.len(),
            self.id
        );
        Ok(())
    }

    /// Re-deal the same pool. Returns false if nothing was ever loaded.
    pub fn restart(&mut self) -> bool {
        if self.records.is_empty() {
            return false;
        }
        self.start_playthrough();
        tracing::info!("Restarted as game {}", self.id);
        true
    }

    /// Soft continue after a wrong answer: keeps the position, refunds the lifelines
    pub fn continue_after_loss(&mut self) -> bool {
        if self.status != GameStatus::Lost {
            return false;
        }
        self.reset_question_state();
        self.status = GameStatus::Playing;
        self.lifelines = LifelineFlags::default();
        tracing::info!("Continuing game {} at question {}", self.id, self.index + 1);
        true
    }

    fn start_playthrough(&mut self) {
        self.id = ulid::Ulid::new().to_string();
        self.questions = self
            .records
            .iter()
            .map(|record| deal(record, &mut self.rng))
            .collect();
        self.index = 0;
        self.reset_question_state();
        self.status = GameStatus::Playing;
        self.lifelines = LifelineFlags::default();
    }

    fn reset_question_state(&mut self) {
        self.locked = false;
        self.hidden.clear();
        self.active_friend = None;
    }

    // =========================================================================
    // Answering
    // =========================================================================

    /// Evaluate an answer for the current question.
    ///
    /// Returns `None` without touching anything if the game is over, an answer
    /// is already being resolved, or there is no current question.
    pub fn submit_answer(&mut self, key: AnswerKey) -> Option<AnswerOutcome> {
        if self.status != GameStatus::Playing || self.locked {
            return None;
        }
        let correct = key == self.current()?.correct;
        self.locked = true;

        if !correct {
            self.status = GameStatus::Lost;
        } else if self.is_final_question() {
            self.status = GameStatus::Won;
        }

        tracing::info!(
            "Answer {} to question {}: correct={}, status={:?}",
            key.as_str(),
            self.index + 1,
            correct,
            self.status
        );

        Some(AnswerOutcome {
            correct,
            status: self.status,
        })
    }

    /// Move to the next question. Returns true if the index changed.
    pub fn advance(&mut self) -> bool {
        if self.status != GameStatus::Playing {
            return false;
        }
        let next = self.index + 1;
        if next >= self.questions.len() {
            return false;
        }
        self.index = next;
        self.reset_question_state();
        true
    }

    // =========================================================================
    // Lifelines
    // =========================================================================

    /// Conceal two wrong options. One use per game.
    pub fn use_fifty_fifty(&mut self) -> Option<[AnswerKey; 2]> {
        if self.lifelines.fifty_fifty {
            return None;
        }
        let question = self.questions.get(self.index)?;
        let hidden = lifeline::fifty_fifty(question.correct, &mut self.rng);

        self.hidden = hidden.to_vec();
        self.lifelines.fifty_fifty = true;
        Some(hidden)
    }

    /// Spend the ask-the-audience lifeline. Returns false if already spent.
    pub fn claim_audience(&mut self) -> bool {
        !std::mem::replace(&mut self.lifelines.audience, true)
    }

    /// Spend the phone-a-friend lifeline. Returns false if already spent.
    pub fn claim_phone(&mut self) -> bool {
        !std::mem::replace(&mut self.lifelines.phone, true)
    }

    pub fn set_active_friend(&mut self, name: Option<String>) {
        self.active_friend = name;
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn current(&self) -> Option<&RoundQuestion> {
        self.questions.get(self.index)
    }

    pub fn questions(&self) -> &[RoundQuestion] {
        &self.questions
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn is_loaded(&self) -> bool {
        !self.questions.is_empty()
    }

    pub fn is_final_question(&self) -> bool {
        self.index + 1 == self.questions.len()
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn lifelines(&self) -> LifelineFlags {
        self.lifelines
    }

    pub fn hidden(&self) -> &[AnswerKey] {
        &self.hidden
    }

    pub fn active_friend(&self) -> Option<&str> {
        self.active_friend.as_deref()
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Place a record's four texts on A-D in random order
fn deal(record: &QuestionRecord, rng: &mut GameRng) -> RoundQuestion {
    let pool: Vec<(&str, bool)> = std::iter::once((record.correct_answer.as_str(), true))
        .chain(record.wrong_answers.iter().map(|text| (text.as_str(), false)))
        .collect();
    let placed = random::shuffled(pool, rng);

    let mut correct = AnswerKey::A;
    let mut answers: [String; 4] = Default::default();
    for (key, (text, is_correct)) in AnswerKey::ALL.into_iter().zip(placed) {
        answers[key.index()] = text.to_string();
        if is_correct {
            correct = key;
        }
    }

    RoundQuestion {
        id: record.id.clone(),
        prompt: record.prompt.clone(),
        answers,
        correct,
    }
}
