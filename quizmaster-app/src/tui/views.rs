use crate::tui::theme::*;
use quizmaster_core::{FinishReason, Flashcard, RoundOutcome, RoundSummary};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

/// Verdict on the previous answer, shown above the next question.
pub struct Feedback {
    pub correct: bool,
    pub question: String,
    pub expected: String,
}

pub struct Sidebar<'a> {
    pub quiz_id: &'a str,
    pub round: u32,
    pub position: usize,
    pub pool_len: usize,
    pub correct: u32,
    pub asked: u32,
    pub history: &'a [RoundSummary],
}

pub enum MainPane<'a> {
    Question {
        card: &'a Flashcard,
        input: &'a str,
        feedback: Option<&'a Feedback>,
    },
    Summary {
        outcome: &'a RoundOutcome,
        cards: &'a [Flashcard],
    },
    Finished {
        reason: FinishReason,
        outcome: Option<&'a RoundOutcome>,
        cards: &'a [Flashcard],
    },
    Empty(&'a str),
}

pub fn draw_ui(f: &mut Frame, area: Rect, side: Sidebar, main: MainPane) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(rows[0]);
    draw_sidebar(f, chunks[0], &side);
    let keys = footer_keys(&main);
    draw_main(f, chunks[1], main);

    let foot = Paragraph::new(Line::from(
        keys.iter().map(|k| Span::raw(format!(" {k}  "))).collect::<Vec<_>>(),
    ))
    .style(footer_style());
    f.render_widget(foot, rows[1]);
}

fn footer_keys(main: &MainPane) -> Vec<&'static str> {
    match main {
        MainPane::Question { .. } => vec!["type answer", "Enter submit", "Esc quit round"],
        MainPane::Summary { .. } => vec!["Enter/c next round", "q stop"],
        MainPane::Finished { .. } | MainPane::Empty(_) => vec!["any key exit"],
    }
}

fn draw_sidebar(f: &mut Frame, area: Rect, side: &Sidebar) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(1)])
        .split(area);

    let info = Paragraph::new(vec![
        Line::from(vec![Span::raw("quiz: ").style(hint_style()), Span::raw(side.quiz_id)]),
        Line::from(vec![
            Span::raw("round: ").style(hint_style()),
            Span::raw(side.round.to_string()),
        ]),
        Line::from(vec![
            Span::raw("card: ").style(hint_style()),
            Span::raw(format!("{}/{}", (side.position + 1).min(side.pool_len), side.pool_len)),
        ]),
        Line::from(vec![
            Span::raw("correct: ").style(hint_style()),
            Span::raw(format!("{}/{}", side.correct, side.asked)),
        ]),
    ])
    .block(Block::default().title("Session").borders(Borders::ALL));
    f.render_widget(info, parts[0]);

    let items: Vec<_> = side
        .history
        .iter()
        .map(|s| {
            ListItem::new(Line::from(format!(
                "Round {}: {}/{} ({:.1}%)",
                s.round, s.correct_answers, s.total_questions, s.score_percent
            )))
        })
        .collect();
    let list = List::new(items).block(Block::default().title("History").borders(Borders::ALL));
    f.render_widget(list, parts[1]);
}

fn draw_main(f: &mut Frame, area: Rect, pane: MainPane) {
    let block = Block::default().title("Quiz").borders(Borders::ALL);
    let text = match pane {
        MainPane::Empty(msg) => vec![Line::from(msg)],
        MainPane::Question { card, input, feedback } => {
            let mut lines = Vec::new();
            if let Some(fb) = feedback {
                if fb.correct {
                    lines.push(Line::from(Span::raw("Correct!").style(correct_style())));
                } else {
                    lines.push(Line::from(vec![
                        Span::raw("Incorrect. ").style(wrong_style()),
                        Span::raw(format!("{} -> {}", fb.question, fb.expected)),
                    ]));
                }
                lines.push(Line::from(""));
            }
            lines.push(Line::from(vec![
                Span::raw("Q: ").style(title_style()),
                Span::raw(card.question.as_str()),
            ]));
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::raw("> ").style(title_style()),
                Span::raw(input),
                Span::raw("_").style(hint_style()),
            ]));
            lines
        }
        MainPane::Summary { outcome, cards } => {
            let mut lines = outcome_lines(outcome, cards);
            lines.push(Line::from(""));
            lines.push(Line::from(
                Span::raw("Below 80%. Missed questions get extra weight next round.")
                    .style(hint_style()),
            ));
            lines
        }
        MainPane::Finished { reason, outcome, cards } => {
            let headline = match reason {
                FinishReason::Mastered => "You scored at least 80%. Nice work!",
                FinishReason::Stopped => "Stopping here. Keep practicing next time!",
                FinishReason::Quit => "Session ended.",
            };
            let mut lines = vec![Line::from(Span::raw(headline).style(title_style())), Line::from("")];
            match outcome {
                Some(o) => lines.extend(outcome_lines(o, cards)),
                None => lines.push(Line::from("No questions were answered.")),
            }
            lines
        }
    };
    let p = Paragraph::new(text).wrap(Wrap { trim: true }).block(block);
    f.render_widget(p, area);
}

fn outcome_lines<'a>(o: &'a RoundOutcome, cards: &'a [Flashcard]) -> Vec<Line<'a>> {
    let mut lines = vec![
        Line::from(Span::raw(format!("Round {} summary", o.round_number)).style(title_style())),
        Line::from(format!("answered: {}  correct: {}  score: {:.1}%", o.total_asked, o.correct_count, o.score_percent)),
    ];
    for m in &o.missed {
        if let Some(card) = cards.get(m.card) {
            lines.push(Line::from(vec![
                Span::raw("- ").style(wrong_style()),
                Span::raw(card.question.as_str()),
                Span::raw(format!("  yours: {}  correct: {}", m.given, card.answer)).style(hint_style()),
            ]));
        }
    }
    lines
}
