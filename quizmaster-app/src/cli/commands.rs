use crate::api::server as api_server;
use crate::cards::{append_to_log, load_cards, read_import_csv, save_cards_csv, supports_progress};
use crate::cli::opts::*;
use crate::tui::app::TuiApp;

use anyhow::{bail, Result};
use quizmaster_core::{
    complete_question, normalize_quiz_id, run_session, summarize_history, Continuation, Decision,
    FinishReason, Flashcard, Presenter, QuizHistory, ResultsLedger, Response, RoundOutcome,
    RoundSummary,
};
use quizmaster_json::paths::{data_root, default_results_file, manual_log_file};
use quizmaster_json::JsonLedger;
use quizmaster_sqlite::SqliteLedger;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{stdin, stdout, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

const QUIT_WORDS: [&str; 3] = ["quit", "q", "exit"];

pub async fn run_cli(args: Cli) -> Result<()> {
    let ledger = open_ledger(&args).await?;
    let quiz_id = normalize_quiz_id(&args.quiz);
    match args.cmd.clone() {
        Command::Quiz(cmd) => quiz_cmd(ledger, &quiz_id, cmd).await,
        Command::Add(cmd) => add_cmd(ledger, &quiz_id, cmd).await,
        Command::History => history_cmd(ledger, &quiz_id).await,
        Command::Export(cmd) => export_cmd(ledger, cmd).await,
        Command::Import(cmd) => import_cmd(cmd),
        Command::Api(api) => {
            let cards = load_cards(&card_path(&api.source))?;
            let addr: std::net::SocketAddr = api.addr.parse()?;
            api_server::run(ledger, cards, addr).await
        }
        Command::Tui(_) => bail!("the TUI runs outside the async CLI runtime"),
    }
}

pub fn run_tui(args: Cli, cmd: TuiCmd) -> Result<()> {
    let rt = Arc::new(Runtime::new()?);
    let ledger = rt.block_on(open_ledger(&args))?;
    let cards = load_cards(&card_path(&cmd.source))?;
    let mut app = TuiApp::new(ledger, rt, cards, &normalize_quiz_id(&args.quiz));
    app.run()
}

pub async fn open_ledger(args: &Cli) -> Result<Arc<dyn ResultsLedger>> {
    match args.store {
        StoreKind::Json => {
            let s = match &args.results_file {
                Some(file) => {
                    let backups = file.with_extension("backups");
                    JsonLedger::open_with(file.clone(), backups, args.max_backups).await?
                }
                None => {
                    let (file, backups) = default_results_file();
                    JsonLedger::open_with(file, backups, args.max_backups).await?
                }
            };
            Ok(Arc::new(s))
        }
        StoreKind::Sqlite => {
            let p = args
                .db_path
                .clone()
                .unwrap_or_else(|| data_root().join("quiz_results.sqlite3"));
            if let Some(parent) = p.parent() {
                std::fs::create_dir_all(parent).ok();
            }
            let s = SqliteLedger::open_file(&p).await?;
            Ok(Arc::new(s))
        }
    }
}

pub fn card_path(source: &CardSourceArgs) -> PathBuf {
    if source.manual_log {
        manual_log_file()
    } else {
        source.cards.clone()
    }
}

async fn quiz_cmd(ledger: Arc<dyn ResultsLedger>, quiz_id: &str, cmd: QuizCmd) -> Result<()> {
    let path = card_path(&cmd.source);
    if cmd.source.manual_log && !path.exists() {
        println!(
            "No manual log file found at {}. Try entering questions manually first (quizmaster add).",
            path.display()
        );
        return Ok(());
    }
    let mut cards = load_cards(&path)?;
    quiz_on(&*ledger, quiz_id, &mut cards, cmd.seed).await?;

    if cmd.save_progress {
        if supports_progress(&path) {
            save_cards_csv(&path, &cards)?;
            println!("progress saved to {}", path.display());
        } else {
            println!("progress is only saved for CSV card files");
        }
    }
    Ok(())
}

async fn quiz_on(
    ledger: &dyn ResultsLedger,
    quiz_id: &str,
    cards: &mut [Flashcard],
    seed: Option<u64>,
) -> Result<()> {
    if cards.is_empty() {
        println!("No questions available.");
        return Ok(());
    }
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };
    let mut io = ConsoleIo;
    let mut decide = ConsoleIo;
    let report = run_session(cards, quiz_id, &mut io, &mut decide, ledger, &mut rng).await?;

    match report.finish {
        Some(FinishReason::Mastered) => println!("\nYou scored at least 80%. Nice work!"),
        Some(FinishReason::Stopped) => println!("Okay, stopping here. Keep practicing next time!"),
        Some(FinishReason::Quit) if report.rounds.is_empty() => {
            println!("No questions were answered. Goodbye!")
        }
        Some(FinishReason::Quit) => println!("Round ended early."),
        None => println!("No questions available."),
    }
    if let Some(score) = report.final_score() {
        println!("final score: {score:.1}%");
    }
    Ok(())
}

async fn add_cmd(ledger: Arc<dyn ResultsLedger>, quiz_id: &str, cmd: AddCmd) -> Result<()> {
    println!("\n--- Manual Question Entry ---");
    let mut cards: Vec<Flashcard> = Vec::new();
    loop {
        let q = read_line("Question (or press Enter to stop): ")?;
        if q.trim().is_empty() {
            break;
        }
        let a = read_line("Answer: ")?;
        match Flashcard::new(complete_question(&q), a.trim()) {
            Ok(card) => {
                cards.push(card);
                println!("Added!\n");
            }
            Err(e) => {
                println!("{e}");
                continue;
            }
        }
        if !read_line("Do you want to add another question? (y/n): ")?
            .trim()
            .eq_ignore_ascii_case("y")
        {
            break;
        }
    }

    if cards.is_empty() {
        println!("No questions were added.");
        return Ok(());
    }

    let log = manual_log_file();
    append_to_log(&log, &cards)?;
    println!("Logged {} manually entered questions to {}", cards.len(), log.display());

    let start = cmd.quiz_now
        || read_line("Start a quiz with these questions now? (y/n): ")?
            .trim()
            .eq_ignore_ascii_case("y");
    if start {
        quiz_on(&*ledger, quiz_id, &mut cards, None).await?;
    }
    Ok(())
}

async fn history_cmd(ledger: Arc<dyn ResultsLedger>, quiz_id: &str) -> Result<()> {
    let history = ledger.load(quiz_id).await;
    if history.is_empty() {
        println!("no results recorded for {quiz_id}");
        return Ok(());
    }
    print_history(quiz_id, &history);
    let stats = summarize_history(&history);
    println!(
        "rounds={}\tbest={:.1}%\tlast={:.1}%\taverage={:.1}%\tmastered={}",
        stats.rounds, stats.best_score, stats.last_score, stats.average_score, stats.mastered_rounds
    );
    Ok(())
}

async fn export_cmd(ledger: Arc<dyn ResultsLedger>, cmd: ExportCmd) -> Result<()> {
    let mut all = QuizHistory::new();
    for id in ledger.quiz_ids().await {
        let rounds = ledger.load(&id).await;
        all.insert(id, rounds);
    }
    match cmd {
        ExportCmd::Json { path } => {
            let s = serde_json::to_string_pretty(&all)?;
            std::fs::write(&path, s)?;
            println!("wrote {}", path.display());
        }
        ExportCmd::Csv { path } => {
            let mut wtr = csv::Writer::from_path(&path)?;
            wtr.write_record(["quiz", "round", "total_questions", "correct_answers", "score_percent", "recorded_at"])?;
            for (quiz, rounds) in all {
                for r in rounds {
                    wtr.write_record([
                        quiz.clone(),
                        r.round.to_string(),
                        r.total_questions.to_string(),
                        r.correct_answers.to_string(),
                        format!("{:.1}", r.score_percent),
                        r.recorded_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
                    ])?;
                }
            }
            wtr.flush()?;
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}

fn import_cmd(cmd: ImportCmd) -> Result<()> {
    match cmd {
        ImportCmd::Csv { path, to } => {
            let cards = read_import_csv(&path)?;
            let target = to.unwrap_or_else(manual_log_file);
            append_to_log(&target, &cards)?;
            println!("imported {} cards into {}", cards.len(), target.display());
        }
    }
    Ok(())
}

// ===== Console I/O =====
struct ConsoleIo;

impl Presenter for ConsoleIo {
    fn present(&mut self, card: &Flashcard) -> Response {
        println!("\nQuestion: {}", card.question);
        match read_line("Your answer (or type 'quit' to stop): ") {
            Ok(line) if QUIT_WORDS.contains(&line.trim().to_lowercase().as_str()) => {
                println!("\nEnding this round early.");
                Response::Quit
            }
            Ok(line) => Response::Answer(line.trim().to_string()),
            Err(_) => Response::Quit,
        }
    }

    fn show_history(&mut self, quiz_id: &str, history: &[RoundSummary]) {
        if !history.is_empty() {
            print_history(quiz_id, history);
        }
    }

    fn round_started(&mut self, round: u32, _pool_len: usize) {
        println!("\n==============================");
        println!("        QUIZ ROUND {round}");
        println!("==============================");
    }

    fn feedback(&mut self, card: &Flashcard, correct: bool) {
        if correct {
            println!("Correct!");
        } else {
            println!("Incorrect.");
            println!("   Correct answer: {}", card.answer);
        }
    }

    fn round_finished(&mut self, outcome: &RoundOutcome, cards: &[Flashcard]) {
        println!("\n---------- Round Summary ----------");
        println!("Questions answered: {}", outcome.total_asked);
        println!("Correct answers:   {}", outcome.correct_count);
        println!("Score:             {:.1}%", outcome.score_percent);
        if outcome.missed.is_empty() {
            println!("\nPerfect round! Great job!");
            return;
        }
        println!("\nQuestions you missed this round:");
        for m in &outcome.missed {
            if let Some(card) = cards.get(m.card) {
                println!("- {}", card.question);
                println!("  Your answer:  {}", m.given);
                println!("  Correct:      {}", card.answer);
            }
        }
    }
}

impl Continuation for ConsoleIo {
    fn decide(&mut self, _outcome: &RoundOutcome) -> Decision {
        println!("\nYour score is below 80%. We'll prioritize the questions you missed in the next round.");
        match read_line("Press Enter to continue or type 'q' to quit: ") {
            Ok(line) if line.trim().eq_ignore_ascii_case("q") => Decision::Stop,
            Ok(_) => Decision::Continue,
            Err(_) => Decision::Stop,
        }
    }
}

// ===== Helpers =====
fn print_history(quiz_id: &str, history: &[RoundSummary]) {
    println!("\nPrevious sessions for {quiz_id}:");
    for s in history {
        println!(
            "  Round {}: {}/{} ({:.1}%)",
            s.round, s.correct_answers, s.total_questions, s.score_percent
        );
    }
    println!();
}

/// Reads one line; end of input is reported as an error so callers can stop.
fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    stdout().flush().ok();
    let mut s = String::new();
    if stdin().read_line(&mut s)? == 0 {
        bail!("end of input");
    }
    Ok(s)
}
