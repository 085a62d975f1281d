//! Plain-text card format: a question line ending in `?` followed by its
//! answer line. Blank lines are ignored.

use crate::Flashcard;

pub fn parse_cards(text: &str) -> Vec<Flashcard> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let mut cards = Vec::new();
    while let Some(line) = lines.next() {
        if !line.ends_with('?') {
            continue;
        }
        let answer = lines.next().unwrap_or("");
        cards.push(Flashcard::with_counters(line, answer, 0, 0));
    }
    cards
}

pub fn format_cards(cards: &[Flashcard]) -> String {
    let mut out = String::new();
    for c in cards {
        out.push_str(c.question.trim());
        out.push('\n');
        out.push_str(c.answer.trim());
        out.push_str("\n\n");
    }
    out
}

/// Manual entry accepts questions without the trailing `?`.
pub fn complete_question(raw: &str) -> String {
    let q = raw.trim();
    if q.ends_with('?') {
        q.to_string()
    } else {
        format!("{q}?")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs_and_skips_noise() {
        let text = "\n  Capital of France?  \nParis\n\nstray line\n2+2?\n\n4\nLast one?\n";
        let cards = parse_cards(text);
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].question, "Capital of France?");
        assert_eq!(cards[0].answer, "Paris");
        assert_eq!(cards[1].answer, "4");
        assert_eq!(cards[2].question, "Last one?");
        assert_eq!(cards[2].answer, "");
    }

    #[test]
    fn answer_line_is_consumed_even_if_it_ends_with_question_mark() {
        let cards = parse_cards("What do you say?\nWhy?\nNext?\nok");
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].answer, "Why?");
        assert_eq!(cards[1].question, "Next?");
    }

    #[test]
    fn formatted_cards_parse_back() {
        let cards = vec![
            Flashcard::new("a?", "b").unwrap(),
            Flashcard::new("c?", "d").unwrap(),
        ];
        let text = format_cards(&cards);
        assert_eq!(text, "a?\nb\n\nc?\nd\n\n");
        assert_eq!(parse_cards(&text), cards);
    }

    #[test]
    fn completes_missing_question_mark() {
        assert_eq!(complete_question(" Capital of Peru "), "Capital of Peru?");
        assert_eq!(complete_question("2+2?"), "2+2?");
    }
}
