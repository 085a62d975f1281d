use directories::ProjectDirs;
use std::path::PathBuf;

pub fn data_root() -> PathBuf {
    if let Some(pd) = ProjectDirs::from("com", "quizmaster", "QuizMaster") {
        pd.data_dir().to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

/// Results file and its backups directory.
pub fn default_results_file() -> (PathBuf, PathBuf) {
    let root = data_root();
    (root.join("quiz_results.json"), root.join("backups"))
}

/// Append-only log of manually entered questions.
pub fn manual_log_file() -> PathBuf {
    data_root().join("manual_questions_log.txt")
}
