//! Card sources for the front ends: text and CSV card files, plus the
//! append-only manual question log.

use anyhow::{bail, Context, Result};
use quizmaster_core::{format_cards, parse_cards, Flashcard};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Serialize, Deserialize)]
struct CsvCard {
    question: String,
    answer: String,
    #[serde(default)]
    times_seen: u32,
    #[serde(default)]
    times_correct: u32,
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

pub fn load_cards(path: &Path) -> Result<Vec<Flashcard>> {
    if !path.exists() {
        bail!("could not find file: {}", path.display());
    }
    let cards = if is_csv(path) {
        load_csv(path)?
    } else {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        parse_cards(&text)
    };
    info!(path = %path.display(), cards = cards.len(), "cards loaded");
    Ok(cards)
}

/// CSV rows carry counters, so a reloaded set keeps its mistake weighting.
fn load_csv(path: &Path) -> Result<Vec<Flashcard>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let mut cards = Vec::new();
    for (line, rec) in rdr.deserialize::<CsvCard>().enumerate() {
        let rec = rec.with_context(|| format!("{} row {}", path.display(), line + 2))?;
        let Ok(mut card) = Flashcard::new(rec.question.as_str(), rec.answer.as_str()) else {
            warn!(row = line + 2, question = %rec.question, "skipping invalid card");
            continue;
        };
        card.times_seen = rec.times_seen;
        card.times_correct = rec.times_correct.min(rec.times_seen);
        cards.push(card);
    }
    Ok(cards)
}

pub fn save_cards_csv(path: &Path, cards: &[Flashcard]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for c in cards {
        wtr.serialize(CsvCard {
            question: c.question.clone(),
            answer: c.answer.clone(),
            times_seen: c.times_seen,
            times_correct: c.times_correct,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn supports_progress(path: &Path) -> bool {
    is_csv(path)
}

/// Appends cards in the text card format, creating the file if needed.
pub fn append_to_log(path: &Path, cards: &[Flashcard]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    f.write_all(format_cards(cards).as_bytes())?;
    Ok(())
}

/// Reads `question,answer` rows; invalid rows are skipped.
pub fn read_import_csv(path: &Path) -> Result<Vec<Flashcard>> {
    load_csv(path)
}
