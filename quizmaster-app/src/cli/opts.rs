use clap::{Args, Parser, Subcommand, ValueEnum};
use quizmaster_core::DEFAULT_QUIZ_ID;
use std::path::PathBuf;

#[derive(Debug, Clone, ValueEnum)]
pub enum StoreKind {
    Json,
    Sqlite,
}

#[derive(Debug, Parser, Clone)]
#[command(name = "quizmaster", version, about = "QuizMaster: adaptive question/answer practice (CLI/TUI/API)")]
pub struct Cli {
    /// Results backend (applies to CLI/TUI/API)
    #[arg(long, value_enum, default_value_t = StoreKind::Json)]
    pub store: StoreKind,

    /// SQLite DB path when --store sqlite (defaults to app data dir)
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Results JSON file when --store json (defaults to app data dir)
    #[arg(long)]
    pub results_file: Option<PathBuf>,

    /// Timestamped backups kept next to the JSON results file
    #[arg(long, default_value_t = 10)]
    pub max_backups: usize,

    /// Name results are recorded under (e.g. "exam1", "bio_midterm")
    #[arg(long, global = true, default_value = DEFAULT_QUIZ_ID)]
    pub quiz: String,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run a console quiz session
    Quiz(QuizCmd),
    /// Enter questions manually (always appended to the manual log)
    Add(AddCmd),
    /// Show previous rounds of a quiz
    History,
    /// Export recorded results
    #[command(subcommand)]
    Export(ExportCmd),
    /// Import cards
    #[command(subcommand)]
    Import(ImportCmd),
    /// Launch Terminal UI
    Tui(TuiCmd),
    /// Launch Axum HTTP API
    Api(ApiCmd),
}

#[derive(Debug, Args, Clone)]
pub struct CardSourceArgs {
    /// Card file: text (`Question?` line then answer line) or CSV
    #[arg(long, default_value = "questions.txt", conflicts_with = "manual_log")]
    pub cards: PathBuf,

    /// Quiz on everything in the manual question log
    #[arg(long)]
    pub manual_log: bool,
}

#[derive(Debug, Args, Clone)]
pub struct QuizCmd {
    #[command(flatten)]
    pub source: CardSourceArgs,

    /// Write updated seen/correct counters back (CSV card files only)
    #[arg(long)]
    pub save_progress: bool,

    /// Fixed shuffle seed
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Args, Clone)]
pub struct AddCmd {
    /// Start a quiz on the entered questions without asking
    #[arg(long)]
    pub quiz_now: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum ExportCmd {
    Json { path: PathBuf },
    Csv { path: PathBuf },
}

#[derive(Debug, Subcommand, Clone)]
pub enum ImportCmd {
    /// `question,answer` CSV appended to a text card file
    Csv {
        path: PathBuf,
        /// Target card file (defaults to the manual log)
        #[arg(long)]
        to: Option<PathBuf>,
    },
}

#[derive(Debug, Args, Clone)]
pub struct TuiCmd {
    #[command(flatten)]
    pub source: CardSourceArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ApiCmd {
    #[command(flatten)]
    pub source: CardSourceArgs,

    /// Bind address (host:port)
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub addr: String,
}
