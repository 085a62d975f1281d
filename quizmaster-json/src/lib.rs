use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use quizmaster_core::{repo::ResultsLedger, CoreError, QuizHistory, RoundSummary};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::task;
use tracing::{debug, warn};

pub mod paths;

const FILE_VERSION: u32 = 1;
// Copies of corrupt files are never rotated away.
const CORRUPT_PREFIX: &str = "quiz_results-corrupt-";

#[derive(Clone, Serialize, Deserialize)]
struct FileImage {
    version: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    quizzes: QuizHistory,
}

impl FileImage {
    fn new_empty() -> Self {
        let now = Utc::now();
        Self {
            version: FILE_VERSION,
            created_at: now,
            updated_at: now,
            quizzes: QuizHistory::new(),
        }
    }
}

// Older result files are a bare `{ quiz_id: [summary, ...] }` map.
#[derive(Deserialize)]
#[serde(untagged)]
enum OnDisk {
    Image(FileImage),
    Bare(QuizHistory),
}

pub struct JsonLedger {
    path: PathBuf,
    backups_dir: PathBuf,
    max_backups: usize,
    write_lock: Arc<Mutex<()>>,
}

impl JsonLedger {
    pub async fn open_default() -> Result<Self, CoreError> {
        let (file, backups) = paths::default_results_file();
        Self::open_with(file, backups, 10).await
    }

    pub async fn open_with(path: PathBuf, backups_dir: PathBuf, max_backups: usize) -> Result<Self, CoreError> {
        ensure_parent_dirs(&path)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            path,
            backups_dir,
            max_backups: max_backups.max(1),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whole history as currently on disk.
    pub async fn history(&self) -> QuizHistory {
        let path = self.path.clone();
        task::spawn_blocking(move || read_image(&path).quizzes)
            .await
            .unwrap_or_default()
    }
}

fn ensure_parent_dirs(path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Ok(())
}

fn ensure_dir(path: &Path) -> Result<(), CoreError> {
    fs::create_dir_all(path).map_err(|_| CoreError::Storage("io"))
}

enum Loaded {
    Image(FileImage),
    Corrupt(serde_json::Error),
}

fn try_read_image(path: &Path) -> Result<Loaded, std::io::Error> {
    let buf = match fs::read(path) {
        Ok(buf) => buf,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Loaded::Image(FileImage::new_empty())),
        Err(e) => return Err(e),
    };
    Ok(match serde_json::from_slice::<OnDisk>(&buf) {
        Ok(OnDisk::Image(img)) => Loaded::Image(img),
        Ok(OnDisk::Bare(quizzes)) => Loaded::Image(FileImage {
            quizzes,
            ..FileImage::new_empty()
        }),
        Err(e) => Loaded::Corrupt(e),
    })
}

/// Missing, unreadable and corrupt files all read as an empty history.
fn read_image(path: &Path) -> FileImage {
    match try_read_image(path) {
        Ok(Loaded::Image(img)) => img,
        Ok(Loaded::Corrupt(e)) => {
            warn!(path = %path.display(), error = %e, "results file corrupt, treating as empty");
            FileImage::new_empty()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "results file unreadable, treating as empty");
            FileImage::new_empty()
        }
    }
}

/// Image to extend on append. A corrupt file is copied aside before it gets
/// overwritten; any other read failure aborts the append.
fn image_for_append(path: &Path, backups_dir: &Path) -> Result<FileImage, std::io::Error> {
    match try_read_image(path)? {
        Loaded::Image(img) => Ok(img),
        Loaded::Corrupt(e) => {
            fs::create_dir_all(backups_dir)?;
            let ts = chrono::Local::now().format("%Y%m%d-%H%M%S%.3f");
            let kept = backups_dir.join(format!("{CORRUPT_PREFIX}{ts}.json"));
            fs::copy(path, &kept)?;
            warn!(path = %path.display(), kept = %kept.display(), error = %e, "results file corrupt, starting fresh");
            Ok(FileImage::new_empty())
        }
    }
}

fn write_with_backup(path: &Path, backups_dir: &Path, max_backups: usize, img: &FileImage) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::create_dir_all(backups_dir)?;

    let json = serde_json::to_vec_pretty(img).map_err(std::io::Error::other)?;
    let mut tmp = NamedTempFile::new_in(path.parent().unwrap_or_else(|| Path::new(".")))?;
    tmp.write_all(&json)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;

    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S%.3f");
    let backup_path = backups_dir.join(format!("quiz_results-{ts}.json"));
    let mut btmp = NamedTempFile::new_in(backups_dir)?;
    btmp.write_all(&json)?;
    btmp.flush()?;
    btmp.persist(&backup_path).map_err(|e| e.error)?;

    rotate_backups(backups_dir, max_backups)?;

    Ok(())
}

fn rotate_backups(dir: &Path, keep: usize) -> Result<(), std::io::Error> {
    let mut entries: Vec<_> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("json"))
        .filter(|e| !e.file_name().to_string_lossy().starts_with(CORRUPT_PREFIX))
        .collect();
    entries.sort_by_key(|e| (e.metadata().and_then(|m| m.modified()).ok(), e.file_name()));
    if entries.len() > keep {
        for e in &entries[0..entries.len() - keep] {
            let _ = fs::remove_file(e.path());
        }
    }
    Ok(())
}

#[async_trait]
impl ResultsLedger for JsonLedger {
    async fn load(&self, quiz_id: &str) -> Vec<RoundSummary> {
        let path = self.path.clone();
        let quiz_id = quiz_id.to_string();
        task::spawn_blocking(move || read_image(&path).quizzes.remove(&quiz_id).unwrap_or_default())
            .await
            .unwrap_or_default()
    }

    async fn append(&self, quiz_id: &str, summary: &RoundSummary) -> Result<(), CoreError> {
        let path = self.path.clone();
        let backups = self.backups_dir.clone();
        let keep = self.max_backups;
        let lock = self.write_lock.clone();
        let quiz_id = quiz_id.to_string();
        let summary = summary.clone();

        // Read-modify-write of the whole file, serialized within this process.
        task::spawn_blocking(move || {
            let _guard = lock.lock();
            let mut img = image_for_append(&path, &backups)?;
            img.updated_at = Utc::now();
            img.quizzes.entry(quiz_id).or_default().push(summary);
            write_with_backup(&path, &backups, keep, &img)
        })
        .await
        .map_err(|_| CoreError::Storage("io"))?
        .map_err(|_| CoreError::Storage("io"))?;
        debug!(path = %self.path.display(), "results appended");
        Ok(())
    }

    async fn quiz_ids(&self) -> Vec<String> {
        self.history().await.into_keys().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn ledger_in(dir: &Path, keep: usize) -> JsonLedger {
        JsonLedger::open_with(dir.join("quiz_results.json"), dir.join("backups"), keep)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn append_then_load_in_order() {
        let dir = tempdir().unwrap();
        let ledger = ledger_in(dir.path(), 10).await;
        let s1 = RoundSummary::new(1, 2, 1, 50.0);
        let s2 = RoundSummary::new(2, 2, 2, 100.0);
        ledger.append("exam1", &s1).await.unwrap();
        ledger.append("exam1", &s2).await.unwrap();

        assert_eq!(ledger.load("exam1").await, vec![s1, s2]);
        assert!(ledger.load("unknown_quiz").await.is_empty());
        assert_eq!(ledger.quiz_ids().await, vec!["exam1".to_string()]);
    }

    #[tokio::test]
    async fn history_survives_reopen() {
        let dir = tempdir().unwrap();
        let s1 = RoundSummary::new(1, 4, 3, 75.0);
        ledger_in(dir.path(), 10).await.append("bio", &s1).await.unwrap();

        let reopened = ledger_in(dir.path(), 10).await;
        assert_eq!(reopened.load("bio").await, vec![s1]);
    }

    fn corrupt_copies(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir.join("backups"))
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.file_name().unwrap().to_string_lossy().starts_with(CORRUPT_PREFIX))
            .collect()
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_empty_and_is_kept_aside_on_append() {
        let dir = tempdir().unwrap();
        let ledger = ledger_in(dir.path(), 10).await;
        fs::write(ledger.path(), "{ not json").unwrap();

        assert!(ledger.load("exam1").await.is_empty());

        let s1 = RoundSummary::new(1, 1, 1, 100.0);
        ledger.append("exam1", &s1).await.unwrap();
        assert_eq!(ledger.load("exam1").await, vec![s1]);

        let kept = corrupt_copies(dir.path());
        assert_eq!(kept.len(), 1);
        assert_eq!(fs::read_to_string(&kept[0]).unwrap(), "{ not json");
    }

    #[tokio::test]
    async fn invalid_utf8_history_survives_in_a_backup() {
        let dir = tempdir().unwrap();
        let ledger = ledger_in(dir.path(), 1).await;
        ledger.append("exam1", &RoundSummary::new(1, 2, 1, 50.0)).await.unwrap();
        ledger.append("bio", &RoundSummary::new(1, 4, 4, 100.0)).await.unwrap();

        let mut bytes = fs::read(ledger.path()).unwrap();
        let at = bytes.windows(4).position(|w| w == b"exam").unwrap();
        bytes.insert(at, 0xFF);
        fs::write(ledger.path(), &bytes).unwrap();

        ledger.append("exam2", &RoundSummary::new(1, 1, 0, 0.0)).await.unwrap();
        // Rotation with max_backups = 1 must not drop the corrupt copy.
        ledger.append("exam2", &RoundSummary::new(2, 1, 1, 100.0)).await.unwrap();

        let kept = corrupt_copies(dir.path());
        assert_eq!(kept.len(), 1);
        assert_eq!(fs::read(&kept[0]).unwrap(), bytes);
        assert_eq!(ledger.load("exam2").await.len(), 2);
    }

    #[tokio::test]
    async fn unreadable_file_fails_append_and_is_left_alone() {
        let dir = tempdir().unwrap();
        let ledger = ledger_in(dir.path(), 10).await;
        // A directory in place of the results file cannot be read.
        fs::create_dir(ledger.path()).unwrap();

        assert!(ledger.load("exam1").await.is_empty());
        let err = ledger
            .append("exam1", &RoundSummary::new(1, 1, 1, 100.0))
            .await
            .unwrap_err();
        assert_eq!(err, CoreError::Storage("io"));
        assert!(ledger.path().is_dir());
    }

    #[tokio::test]
    async fn bare_map_files_are_understood() {
        let dir = tempdir().unwrap();
        let ledger = ledger_in(dir.path(), 10).await;
        fs::write(
            ledger.path(),
            r#"{"exam1": [{"round": 1, "total_questions": 2, "correct_answers": 1, "score_percent": 50.0}]}"#,
        )
        .unwrap();

        assert_eq!(ledger.load("exam1").await, vec![RoundSummary::new(1, 2, 1, 50.0)]);
    }

    #[tokio::test]
    async fn backups_are_rotated() {
        let dir = tempdir().unwrap();
        let ledger = ledger_in(dir.path(), 2).await;
        for round in 1..=5 {
            ledger
                .append("exam1", &RoundSummary::new(round, 1, 1, 100.0))
                .await
                .unwrap();
        }
        let backups = fs::read_dir(dir.path().join("backups")).unwrap().count();
        assert!(backups <= 2);
        assert_eq!(ledger.load("exam1").await.len(), 5);
    }
}
