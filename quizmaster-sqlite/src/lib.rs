use chrono::{DateTime, Utc};
use quizmaster_core::{repo::ResultsLedger, CoreError, RoundSummary};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Row, SqlitePool,
};
use std::path::Path;
use tracing::warn;

pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    pub async fn open_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let opts = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .map_err(|_| CoreError::Storage("sqlite connect"))?;
        let repo = Self { pool };
        repo.ensure_schema().await?;
        Ok(repo)
    }

    pub async fn open_memory() -> Result<Self, CoreError> {
        // Each in-memory connection is its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|_| CoreError::Storage("sqlite connect"))?;
        let repo = Self { pool };
        repo.ensure_schema().await?;
        Ok(repo)
    }

    async fn ensure_schema(&self) -> Result<(), CoreError> {
        const STMT: &str = r#"
        CREATE TABLE IF NOT EXISTS results (
          seq              INTEGER PRIMARY KEY AUTOINCREMENT,
          quiz_id          TEXT    NOT NULL,
          round            INTEGER NOT NULL,
          total_questions  INTEGER NOT NULL,
          correct_answers  INTEGER NOT NULL,
          score_percent    REAL    NOT NULL,
          recorded_at      TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_results_quiz_seq ON results (quiz_id, seq);
        "#;

        for chunk in STMT.split(';') {
            let sql = chunk.trim();
            if sql.is_empty() {
                continue;
            }
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|_| CoreError::Storage("sqlite schema"))?;
        }
        Ok(())
    }

    async fn try_load(&self, quiz_id: &str) -> Result<Vec<RoundSummary>, CoreError> {
        let rows = sqlx::query(
            "SELECT round,total_questions,correct_answers,score_percent,recorded_at \
             FROM results WHERE quiz_id=? ORDER BY seq ASC",
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|_| CoreError::Storage("list results"))?;
        rows.into_iter().map(row_into_summary).collect()
    }
}

#[async_trait::async_trait]
impl ResultsLedger for SqliteLedger {
    async fn load(&self, quiz_id: &str) -> Vec<RoundSummary> {
        match self.try_load(quiz_id).await {
            Ok(v) => v,
            Err(e) => {
                warn!(quiz = quiz_id, error = %e, "results unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    async fn append(&self, quiz_id: &str, summary: &RoundSummary) -> Result<(), CoreError> {
        sqlx::query(
            "INSERT INTO results (quiz_id,round,total_questions,correct_answers,score_percent,recorded_at) \
             VALUES (?,?,?,?,?,?)",
        )
        .bind(quiz_id)
        .bind(summary.round as i64)
        .bind(summary.total_questions as i64)
        .bind(summary.correct_answers as i64)
        .bind(summary.score_percent)
        .bind(summary.recorded_at.map(dt_to_str))
        .execute(&self.pool)
        .await
        .map_err(|_| CoreError::Storage("insert result"))?;
        Ok(())
    }

    async fn quiz_ids(&self) -> Vec<String> {
        sqlx::query("SELECT DISTINCT quiz_id FROM results ORDER BY quiz_id ASC")
            .fetch_all(&self.pool)
            .await
            .map(|rows| rows.iter().map(|r| r.get::<String, _>("quiz_id")).collect())
            .unwrap_or_default()
    }
}

// ===== Helpers =====
fn dt_to_str(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn dt_from_str(s: String) -> Result<DateTime<Utc>, CoreError> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map_err(|_| CoreError::Invalid("datetime"))
        .map(|dt| dt.with_timezone(&Utc))
}

fn row_into_summary(row: sqlx::sqlite::SqliteRow) -> Result<RoundSummary, CoreError> {
    Ok(RoundSummary {
        round: row.get::<i64, _>("round") as u32,
        total_questions: row.get::<i64, _>("total_questions") as u32,
        correct_answers: row.get::<i64, _>("correct_answers") as u32,
        score_percent: row.get::<f64, _>("score_percent"),
        recorded_at: row
            .get::<Option<String>, _>("recorded_at")
            .map(dt_from_str)
            .transpose()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_and_load_in_memory() {
        let ledger = SqliteLedger::open_memory().await.unwrap();
        let s1 = RoundSummary::new(1, 2, 1, 50.0);
        let mut s2 = RoundSummary::new(2, 3, 3, 100.0);
        s2.recorded_at = Some(DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z").unwrap().with_timezone(&Utc));
        ledger.append("exam1", &s1).await.unwrap();
        ledger.append("exam2", &s1).await.unwrap();
        ledger.append("exam1", &s2).await.unwrap();

        assert_eq!(ledger.load("exam1").await, vec![s1, s2]);
        assert!(ledger.load("unknown_quiz").await.is_empty());
        assert_eq!(ledger.quiz_ids().await, vec!["exam1".to_string(), "exam2".to_string()]);
    }

    #[tokio::test]
    async fn file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.sqlite3");
        let s1 = RoundSummary::new(1, 4, 4, 100.0);
        SqliteLedger::open_file(&path).await.unwrap().append("bio", &s1).await.unwrap();

        let reopened = SqliteLedger::open_file(&path).await.unwrap();
        assert_eq!(reopened.load("bio").await, vec![s1]);
    }
}
