use crate::{CoreError, RoundSummary};
use async_trait::async_trait;

pub mod memory;

pub use memory::MemoryLedger;

/// Durable, append-only history of round summaries keyed by quiz id.
#[async_trait]
pub trait ResultsLedger: Send + Sync {
    /// Unknown ids and unreadable storage both yield an empty history.
    async fn load(&self, quiz_id: &str) -> Vec<RoundSummary>;

    async fn append(&self, quiz_id: &str, summary: &RoundSummary) -> Result<(), CoreError>;

    async fn quiz_ids(&self) -> Vec<String>;
}
