use crate::tui::{
    inputs::{map_event, Action},
    views::{self, Feedback, MainPane, Sidebar},
};
use crossterm::{
    event::{self},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use quizmaster_core::{
    Decision, Flashcard, ResultsLedger, RoundOutcome, RoundSummary, Session, SessionState, Start,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stdout, Stdout};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::warn;

pub struct TuiApp {
    ledger: Arc<dyn ResultsLedger>,
    rt: Arc<Runtime>,
    cards: Vec<Flashcard>,
    session: Session,
    history: Vec<RoundSummary>,
    input: String,
    feedback: Option<Feedback>,
}

impl TuiApp {
    pub fn new(ledger: Arc<dyn ResultsLedger>, rt: Arc<Runtime>, cards: Vec<Flashcard>, quiz_id: &str) -> Self {
        Self {
            ledger,
            rt,
            cards,
            session: Session::new(quiz_id),
            history: Vec::new(),
            input: String::new(),
            feedback: None,
        }
    }

    fn record(&mut self, outcome: Option<RoundOutcome>) {
        let Some(outcome) = outcome else { return };
        let summary = outcome.summary();
        let quiz_id = self.session.quiz_id().to_string();
        if let Err(e) = self.rt.block_on(self.ledger.append(&quiz_id, &summary)) {
            warn!(quiz = %quiz_id, error = %e, "could not record round");
        }
        self.history.push(summary);
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        self.history = self.rt.block_on(self.ledger.load(self.session.quiz_id()));
        let started = self.session.start(&self.cards, &mut rand::rng())?;

        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.mainloop(&mut terminal, started);

        disable_raw_mode().ok();
        let mut out: Stdout = std::io::stdout();
        execute!(out, LeaveAlternateScreen).ok();
        terminal.show_cursor().ok();

        res
    }

    fn mainloop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>, started: Start) -> anyhow::Result<()> {
        loop {
            terminal.draw(|f| {
                let (correct, asked) = self.session.answered_this_round();
                let side = Sidebar {
                    quiz_id: self.session.quiz_id(),
                    round: self.session.round_number(),
                    position: self.session.position(),
                    pool_len: self.session.pool().len(),
                    correct,
                    asked,
                    history: &self.history,
                };
                let main = if started == Start::NothingToRun {
                    MainPane::Empty("No questions available.")
                } else {
                    match self.session.state() {
                        SessionState::InRound => match self.session.current_card().and_then(|i| self.cards.get(i)) {
                            Some(card) => MainPane::Question {
                                card,
                                input: &self.input,
                                feedback: self.feedback.as_ref(),
                            },
                            None => MainPane::Empty("No cards in this round."),
                        },
                        SessionState::RoundComplete => match self.session.last_outcome() {
                            Some(outcome) => MainPane::Summary { outcome, cards: &self.cards },
                            None => MainPane::Empty("Round complete."),
                        },
                        SessionState::Finished(reason) => MainPane::Finished {
                            reason,
                            outcome: self.session.last_outcome(),
                            cards: &self.cards,
                        },
                        SessionState::NotStarted => MainPane::Empty("No questions available."),
                    }
                };
                views::draw_ui(f, f.size(), side, main);
            })?;

            if !event::poll(std::time::Duration::from_millis(100))? {
                continue;
            }
            let action = map_event(event::read()?);
            if action == Action::None {
                continue;
            }
            if action == Action::Interrupt {
                if self.session.state() == SessionState::InRound {
                    let outcome = self.session.quit()?;
                    self.record(outcome);
                }
                break;
            }

            match self.session.state() {
                SessionState::InRound => match action {
                    Action::Char(c) => self.input.push(c),
                    Action::Backspace => {
                        self.input.pop();
                    }
                    Action::Submit => {
                        let given = std::mem::take(&mut self.input);
                        let answered = self.session.answer(&mut self.cards, &given)?;
                        self.feedback = Some(Feedback {
                            correct: answered.correct,
                            question: self.cards[answered.card].question.clone(),
                            expected: answered.expected,
                        });
                        if answered.outcome.is_some() {
                            self.feedback = None;
                        }
                        self.record(answered.outcome);
                    }
                    Action::Cancel => {
                        let outcome = self.session.quit()?;
                        self.record(outcome);
                    }
                    _ => {}
                },
                SessionState::RoundComplete => {
                    let decision = match action {
                        Action::Submit | Action::Char('c') => Some(Decision::Continue),
                        Action::Cancel | Action::Char('q') => Some(Decision::Stop),
                        _ => None,
                    };
                    if let Some(d) = decision {
                        self.session.decide(d, &self.cards, &mut rand::rng())?;
                    }
                }
                SessionState::Finished(_) | SessionState::NotStarted => break,
            }
        }
        Ok(())
    }
}
