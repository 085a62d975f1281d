use quizmaster_core::{Flashcard, HistoryStats, RoundOutcome, RoundSummary, Session, SessionState};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Deserialize, Default)]
pub struct StartIn {
    pub quiz_id: Option<String>,
}

#[derive(Deserialize)]
pub struct AnswerIn {
    pub answer: String,
}

#[derive(Deserialize)]
pub struct ContinueIn {
    #[serde(rename = "continue")]
    pub proceed: bool,
}

#[derive(Serialize, Debug)]
pub struct MissedOut {
    pub question: String,
    pub given: String,
    pub answer: String,
}

#[derive(Serialize, Debug)]
pub struct OutcomeOut {
    pub round: u32,
    pub total_asked: u32,
    pub correct_count: u32,
    pub score_percent: f64,
    pub missed: Vec<MissedOut>,
}

impl OutcomeOut {
    pub fn from_outcome(o: &RoundOutcome, cards: &[Flashcard]) -> Self {
        Self {
            round: o.round_number,
            total_asked: o.total_asked,
            correct_count: o.correct_count,
            score_percent: o.score_percent,
            missed: o
                .missed
                .iter()
                .filter_map(|m| {
                    cards.get(m.card).map(|c| MissedOut {
                        question: c.question.clone(),
                        given: m.given.clone(),
                        answer: c.answer.clone(),
                    })
                })
                .collect(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct SessionOut {
    pub id: Uuid,
    pub quiz_id: String,
    #[serde(flatten)]
    pub state: SessionState,
    pub round: u32,
    pub position: usize,
    pub pool_len: usize,
    pub question: Option<String>,
    pub last_outcome: Option<OutcomeOut>,
}

impl SessionOut {
    pub fn new(id: Uuid, session: &Session, cards: &[Flashcard]) -> Self {
        Self {
            id,
            quiz_id: session.quiz_id().to_string(),
            state: session.state(),
            round: session.round_number(),
            position: session.position(),
            pool_len: session.pool().len(),
            question: session
                .current_card()
                .and_then(|i| cards.get(i))
                .map(|c| c.question.clone()),
            last_outcome: session
                .last_outcome()
                .map(|o| OutcomeOut::from_outcome(o, cards)),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct AnswerOut {
    pub correct: bool,
    pub expected: String,
    /// Set when this answer completed the round.
    pub outcome: Option<OutcomeOut>,
    pub session: SessionOut,
}

#[derive(Serialize)]
pub struct HistoryOut {
    pub quiz_id: String,
    pub rounds: Vec<RoundSummary>,
    pub best_score: f64,
    pub average_score: f64,
    pub mastered_rounds: u32,
}

impl HistoryOut {
    pub fn new(quiz_id: String, rounds: Vec<RoundSummary>, stats: HistoryStats) -> Self {
        Self {
            quiz_id,
            rounds,
            best_score: stats.best_score,
            average_score: stats.average_score,
            mastered_rounds: stats.mastered_rounds,
        }
    }
}
