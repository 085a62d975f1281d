use crate::{RoundSummary, MASTERY_THRESHOLD};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistoryStats {
    pub rounds: u32,
    pub questions: u32,
    pub correct: u32,
    pub best_score: f64,
    pub last_score: f64,
    pub average_score: f64,
    pub mastered_rounds: u32,
}

impl HistoryStats {
    pub fn record(&mut self, s: &RoundSummary) {
        self.rounds += 1;
        self.questions += s.total_questions;
        self.correct += s.correct_answers;
        self.best_score = self.best_score.max(s.score_percent);
        self.last_score = s.score_percent;
        if s.score_percent >= MASTERY_THRESHOLD {
            self.mastered_rounds += 1;
        }
    }

    /// Fraction of all answered questions that were correct.
    pub fn accuracy(&self) -> f64 {
        if self.questions == 0 {
            0.0
        } else {
            self.correct as f64 / self.questions as f64
        }
    }
}

pub fn summarize_history(history: &[RoundSummary]) -> HistoryStats {
    let mut stats = HistoryStats::default();
    let mut total = 0.0;
    for s in history {
        stats.record(s);
        total += s.score_percent;
    }
    if stats.rounds > 0 {
        stats.average_score = total / stats.rounds as f64;
    }
    stats
}
