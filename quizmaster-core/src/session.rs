use crate::{
    build_pool_with_rng, is_correct, normalize_quiz_id, record_presentation, score_percent,
    CardIdx, CoreError, Flashcard, MissedCard, ResultsLedger, RoundOutcome, RoundSummary,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The last round scored at or above the mastery threshold.
    Mastered,
    /// The user declined another round after a below-threshold score.
    Stopped,
    /// The user quit in the middle of a round.
    Quit,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum SessionState {
    NotStarted,
    InRound,
    RoundComplete,
    Finished(FinishReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Start {
    Started,
    NothingToRun,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Continue,
    Stop,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Answer(String),
    Quit,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Answered {
    pub card: CardIdx,
    pub correct: bool,
    pub expected: String,
    /// Present when this answer exhausted the round's pool.
    pub outcome: Option<RoundOutcome>,
}

/// Round-scoped state of one quiz session.
///
/// This is a plain snapshot: it owns no cards, only indices into the slice the
/// caller passes to every operation, so it can be serialized between
/// request/response exchanges and rehydrated later.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Session {
    quiz_id: String,
    state: SessionState,
    round_number: u32,
    pool: Vec<CardIdx>,
    index: usize,
    total_asked: u32,
    correct_count: u32,
    missed: Vec<MissedCard>,
    last_outcome: Option<RoundOutcome>,
}

impl Session {
    pub fn new(quiz_id: &str) -> Self {
        Self {
            quiz_id: normalize_quiz_id(quiz_id),
            state: SessionState::NotStarted,
            round_number: 0,
            pool: Vec::new(),
            index: 0,
            total_asked: 0,
            correct_count: 0,
            missed: Vec::new(),
            last_outcome: None,
        }
    }

    pub fn quiz_id(&self) -> &str {
        &self.quiz_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn pool(&self) -> &[CardIdx] {
        &self.pool
    }

    /// Zero-based position of the next card within the current pool.
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn answered_this_round(&self) -> (u32, u32) {
        (self.correct_count, self.total_asked)
    }

    /// Outcome of the last completed or quit-interrupted round.
    pub fn last_outcome(&self) -> Option<&RoundOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Finished(_))
    }

    pub fn awaiting_decision(&self) -> bool {
        self.state == SessionState::RoundComplete
    }

    pub fn current_card(&self) -> Option<CardIdx> {
        match self.state {
            SessionState::InRound => self.pool.get(self.index).copied(),
            _ => None,
        }
    }

    pub fn start<R: Rng + ?Sized>(
        &mut self,
        cards: &[Flashcard],
        rng: &mut R,
    ) -> Result<Start, CoreError> {
        if self.state != SessionState::NotStarted {
            return Err(CoreError::InvalidState("session already started"));
        }
        self.round_number = 1;
        Ok(self.begin_round(cards, rng))
    }

    pub fn answer(&mut self, cards: &mut [Flashcard], response: &str) -> Result<Answered, CoreError> {
        let idx = self
            .current_card()
            .ok_or(CoreError::InvalidState("no card is being presented"))?;
        let card = cards.get_mut(idx).ok_or(CoreError::NotFound("card"))?;

        let correct = is_correct(card, response);
        record_presentation(card, correct);
        let expected = card.answer.clone();

        self.total_asked += 1;
        if correct {
            self.correct_count += 1;
        } else {
            self.missed.push(MissedCard {
                card: idx,
                given: response.trim().to_string(),
            });
        }
        self.index += 1;

        let outcome = if self.index >= self.pool.len() {
            self.complete_round()
        } else {
            None
        };

        Ok(Answered {
            card: idx,
            correct,
            expected,
            outcome,
        })
    }

    /// Ends the session immediately. Returns the partial outcome when at least
    /// one card was answered in the interrupted round.
    pub fn quit(&mut self) -> Result<Option<RoundOutcome>, CoreError> {
        match self.state {
            SessionState::Finished(_) => Err(CoreError::InvalidState("session already finished")),
            SessionState::NotStarted => {
                self.state = SessionState::Finished(FinishReason::Quit);
                Ok(None)
            }
            SessionState::RoundComplete => {
                self.state = SessionState::Finished(FinishReason::Stopped);
                Ok(None)
            }
            SessionState::InRound => {
                let outcome = self.finalize_round();
                self.state = SessionState::Finished(FinishReason::Quit);
                debug!(quiz = %self.quiz_id, round = self.round_number, partial = outcome.is_some(), "round quit");
                Ok(outcome)
            }
        }
    }

    pub fn decide<R: Rng + ?Sized>(
        &mut self,
        decision: Decision,
        cards: &[Flashcard],
        rng: &mut R,
    ) -> Result<(), CoreError> {
        if self.state != SessionState::RoundComplete {
            return Err(CoreError::InvalidState("no round awaiting a decision"));
        }
        match decision {
            Decision::Stop => self.state = SessionState::Finished(FinishReason::Stopped),
            Decision::Continue => {
                self.round_number += 1;
                if self.begin_round(cards, rng) == Start::NothingToRun {
                    self.state = SessionState::Finished(FinishReason::Stopped);
                }
            }
        }
        Ok(())
    }

    // Every round re-weights the full card set from the latest counters.
    fn begin_round<R: Rng + ?Sized>(&mut self, cards: &[Flashcard], rng: &mut R) -> Start {
        self.pool = build_pool_with_rng(cards, rng);
        self.index = 0;
        self.total_asked = 0;
        self.correct_count = 0;
        self.missed.clear();
        if self.pool.is_empty() {
            return Start::NothingToRun;
        }
        self.state = SessionState::InRound;
        debug!(quiz = %self.quiz_id, round = self.round_number, pool = self.pool.len(), "round started");
        Start::Started
    }

    fn complete_round(&mut self) -> Option<RoundOutcome> {
        let outcome = self.finalize_round();
        self.state = SessionState::RoundComplete;
        if outcome.as_ref().is_some_and(RoundOutcome::is_mastered) {
            self.state = SessionState::Finished(FinishReason::Mastered);
        }
        outcome
    }

    fn finalize_round(&mut self) -> Option<RoundOutcome> {
        if self.total_asked == 0 {
            return None;
        }
        let outcome = RoundOutcome {
            round_number: self.round_number,
            total_asked: self.total_asked,
            correct_count: self.correct_count,
            score_percent: score_percent(self.correct_count, self.total_asked),
            missed: std::mem::take(&mut self.missed),
        };
        debug!(
            quiz = %self.quiz_id,
            round = outcome.round_number,
            asked = outcome.total_asked,
            correct = outcome.correct_count,
            score = outcome.score_percent,
            "round scored"
        );
        self.last_outcome = Some(outcome.clone());
        Some(outcome)
    }
}

/// Presentation side of a quiz front end.
pub trait Presenter {
    fn present(&mut self, card: &Flashcard) -> Response;

    fn show_history(&mut self, _quiz_id: &str, _history: &[RoundSummary]) {}
    fn round_started(&mut self, _round: u32, _pool_len: usize) {}
    fn feedback(&mut self, _card: &Flashcard, _correct: bool) {}
    fn round_finished(&mut self, _outcome: &RoundOutcome, _cards: &[Flashcard]) {}
}

/// Asked only after a round scored below the mastery threshold.
pub trait Continuation {
    fn decide(&mut self, outcome: &RoundOutcome) -> Decision;
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionReport {
    pub quiz_id: String,
    /// History as it stood before this session.
    pub previous: Vec<RoundSummary>,
    pub rounds: Vec<RoundOutcome>,
    /// `None` when there was nothing to run.
    pub finish: Option<FinishReason>,
}

impl SessionReport {
    pub fn final_score(&self) -> Option<f64> {
        self.rounds.last().map(|o| o.score_percent)
    }
}

/// Drives a whole session synchronously against the given collaborators,
/// appending one summary to `ledger` per scored round.
pub async fn run_session<P, C, R>(
    cards: &mut [Flashcard],
    quiz_id: &str,
    presenter: &mut P,
    continuation: &mut C,
    ledger: &dyn ResultsLedger,
    rng: &mut R,
) -> Result<SessionReport, CoreError>
where
    P: Presenter + ?Sized,
    C: Continuation + ?Sized,
    R: Rng + ?Sized,
{
    let mut session = Session::new(quiz_id);
    let mut report = SessionReport {
        quiz_id: session.quiz_id().to_string(),
        previous: Vec::new(),
        rounds: Vec::new(),
        finish: None,
    };
    if cards.is_empty() {
        return Ok(report);
    }

    report.previous = ledger.load(&report.quiz_id).await;
    presenter.show_history(&report.quiz_id, &report.previous);

    if session.start(cards, rng)? == Start::NothingToRun {
        return Ok(report);
    }
    presenter.round_started(session.round_number(), session.pool().len());

    loop {
        match session.state() {
            SessionState::InRound => {
                let idx = session
                    .current_card()
                    .ok_or(CoreError::InvalidState("no card is being presented"))?;
                let outcome = match presenter.present(&cards[idx]) {
                    Response::Quit => session.quit()?,
                    Response::Answer(text) => {
                        let answered = session.answer(cards, &text)?;
                        presenter.feedback(&cards[answered.card], answered.correct);
                        answered.outcome
                    }
                };
                if let Some(outcome) = outcome {
                    ledger.append(&report.quiz_id, &outcome.summary()).await?;
                    presenter.round_finished(&outcome, cards);
                    report.rounds.push(outcome);
                }
            }
            SessionState::RoundComplete => {
                let outcome = session
                    .last_outcome()
                    .cloned()
                    .ok_or(CoreError::InvalidState("round complete without outcome"))?;
                let decision = continuation.decide(&outcome);
                session.decide(decision, cards, rng)?;
                if session.state() == SessionState::InRound {
                    presenter.round_started(session.round_number(), session.pool().len());
                }
            }
            SessionState::Finished(reason) => {
                info!(quiz = %report.quiz_id, rounds = report.rounds.len(), ?reason, "session finished");
                report.finish = Some(reason);
                return Ok(report);
            }
            SessionState::NotStarted => {
                return Err(CoreError::InvalidState("session not started"));
            }
        }
    }
}
