use crate::Flashcard;

pub fn record_presentation(card: &mut Flashcard, was_correct: bool) {
    card.times_seen = card.times_seen.saturating_add(1);
    if was_correct {
        card.times_correct = card.times_correct.saturating_add(1);
    }
}

/// Trimmed, case-insensitive exact match.
pub fn is_correct(card: &Flashcard, given_answer: &str) -> bool {
    card.answer.trim().to_lowercase() == given_answer.trim().to_lowercase()
}
