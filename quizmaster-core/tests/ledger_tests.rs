use quizmaster_core::{is_correct, record_presentation, Flashcard};

#[test]
fn counters_track_presentations() {
    let mut card = Flashcard::new("Capital of France?", "Paris").unwrap();
    record_presentation(&mut card, true);
    record_presentation(&mut card, false);
    assert_eq!(card.times_seen, 2);
    assert_eq!(card.times_correct, 1);
    assert_eq!(card.mistakes(), 1);
}

#[test]
fn answers_ignore_case_and_surrounding_space() {
    let card = Flashcard::new("Capital of France?", "Paris").unwrap();
    assert!(is_correct(&card, " paris "));
    assert!(is_correct(&card, "PARIS"));
    assert!(!is_correct(&card, "Pa ris"));
    assert!(!is_correct(&card, ""));
}
