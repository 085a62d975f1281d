use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::CoreError;

/// Stable position of a card inside the caller-owned card slice.
pub type CardIdx = usize;

pub type QuizHistory = BTreeMap<String, Vec<RoundSummary>>;

pub const DEFAULT_QUIZ_ID: &str = "default_quiz";
pub const MASTERY_THRESHOLD: f64 = 80.0;
pub const MAX_EXTRA_COPIES: u32 = 3;

pub fn normalize_quiz_id(raw: &str) -> String {
    let id = raw.trim();
    if id.is_empty() {
        DEFAULT_QUIZ_ID.to_string()
    } else {
        id.to_string()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub times_seen: u32,
    #[serde(default)]
    pub times_correct: u32,
}

impl Flashcard {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Result<Self, CoreError> {
        let question = question.into();
        let answer = answer.into();
        if question.trim().is_empty() {
            return Err(CoreError::Invalid("empty question"));
        }
        if !question.trim_end().ends_with('?') {
            return Err(CoreError::Invalid("question must end with '?'"));
        }
        if answer.trim().is_empty() {
            return Err(CoreError::Invalid("empty answer"));
        }
        Ok(Self::with_counters(question, answer, 0, 0))
    }

    /// Builds a card as a card source hands it over, counters included.
    pub fn with_counters(
        question: impl Into<String>,
        answer: impl Into<String>,
        times_seen: u32,
        times_correct: u32,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            times_seen,
            times_correct,
        }
    }

    /// Times this card has been missed; never negative even if a source
    /// supplied more correct answers than presentations.
    pub fn mistakes(&self) -> u32 {
        self.times_seen.saturating_sub(self.times_correct)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MissedCard {
    pub card: CardIdx,
    pub given: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RoundOutcome {
    pub round_number: u32,
    pub total_asked: u32,
    pub correct_count: u32,
    pub score_percent: f64,
    pub missed: Vec<MissedCard>,
}

impl RoundOutcome {
    pub fn is_mastered(&self) -> bool {
        self.score_percent >= MASTERY_THRESHOLD
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary {
            round: self.round_number,
            total_questions: self.total_asked,
            correct_answers: self.correct_count,
            score_percent: self.score_percent,
            recorded_at: Some(Utc::now()),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RoundSummary {
    pub round: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub score_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl RoundSummary {
    pub fn new(round: u32, total_questions: u32, correct_answers: u32, score_percent: f64) -> Self {
        Self {
            round,
            total_questions,
            correct_answers,
            score_percent,
            recorded_at: None,
        }
    }
}

pub fn score_percent(correct: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * correct as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_card_validates_question_and_answer() {
        assert!(Flashcard::new("Capital of France?", "Paris").is_ok());
        assert_eq!(
            Flashcard::new("Capital of France", "Paris"),
            Err(CoreError::Invalid("question must end with '?'"))
        );
        assert_eq!(Flashcard::new("   ", "x"), Err(CoreError::Invalid("empty question")));
        assert_eq!(Flashcard::new("2+2?", " "), Err(CoreError::Invalid("empty answer")));
    }

    #[test]
    fn mistakes_clamp_at_zero() {
        let card = Flashcard::with_counters("a?", "b", 1, 4);
        assert_eq!(card.mistakes(), 0);
        let card = Flashcard::with_counters("a?", "b", 7, 2);
        assert_eq!(card.mistakes(), 5);
    }

    #[test]
    fn blank_quiz_id_falls_back_to_default() {
        assert_eq!(normalize_quiz_id("  "), DEFAULT_QUIZ_ID);
        assert_eq!(normalize_quiz_id(" exam1 "), "exam1");
    }

    #[test]
    fn summary_without_timestamp_deserializes() {
        let s: RoundSummary = serde_json::from_str(
            r#"{"round":1,"total_questions":2,"correct_answers":1,"score_percent":50.0}"#,
        )
        .unwrap();
        assert_eq!(s, RoundSummary::new(1, 2, 1, 50.0));
    }
}
