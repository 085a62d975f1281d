use crate::{CoreError, QuizHistory, RoundSummary};
use async_trait::async_trait;
use parking_lot::RwLock;

#[derive(Default)]
pub struct MemoryLedger {
    history: RwLock<QuizHistory>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_history(history: QuizHistory) -> Self {
        Self {
            history: RwLock::new(history),
        }
    }

    pub fn snapshot(&self) -> QuizHistory {
        self.history.read().clone()
    }
}

#[async_trait]
impl crate::repo::ResultsLedger for MemoryLedger {
    async fn load(&self, quiz_id: &str) -> Vec<RoundSummary> {
        self.history.read().get(quiz_id).cloned().unwrap_or_default()
    }

    async fn append(&self, quiz_id: &str, summary: &RoundSummary) -> Result<(), CoreError> {
        self.history
            .write()
            .entry(quiz_id.to_string())
            .or_default()
            .push(summary.clone());
        Ok(())
    }

    async fn quiz_ids(&self) -> Vec<String> {
        self.history.read().keys().cloned().collect()
    }
}
