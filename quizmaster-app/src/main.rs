use anyhow::Result;
use clap::Parser; // needed for Cli::parse()
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use quizmaster_app::cli::commands::{run_cli, run_tui};
use quizmaster_app::cli::opts::{Cli, Command};

fn init_tracing() {
    let filter = EnvFilter::try_from_env("QUIZMASTER_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn,quizmaster_app=info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Cli::parse();

    match args.cmd.clone() {
        // Run TUI on its own thread/runtime (no nested Tokio)
        Command::Tui(cmd) => run_tui(args, cmd),
        // Everything else uses a single runtime here
        _ => {
            let rt = Runtime::new()?;
            rt.block_on(run_cli(args))
        }
    }
}
