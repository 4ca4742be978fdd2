//! Persistence for sets, finished games and live session snapshots.
//!
//! The game core never touches a store. [`crate::state::AppState`] holds one
//! behind `Arc<dyn SetStore>` and writes to it after the core has changed.

mod file;
mod memory;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::game::GameSession;
use crate::types::{GameId, GameRecord, SetDocument, SetId, SetSummary};

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Set not found: {0}")]
    NotFound(String),

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Change notifications for anyone observing the store
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    SetSaved(SetId),
    GameRecorded(GameId),
    SnapshotSaved(GameId),
}

#[async_trait]
pub trait SetStore: Send + Sync {
    async fn load_set(&self, id: &str) -> StoreResult<SetDocument>;

    async fn list_sets(&self) -> StoreResult<Vec<SetSummary>>;

    /// Insert or replace a set (drafts included)
    async fn save_set(&self, doc: &SetDocument) -> StoreResult<()>;

    async fn save_game(&self, record: &GameRecord) -> StoreResult<()>;

    /// Overwrite the live-session snapshot
    async fn save_snapshot(&self, session: &GameSession) -> StoreResult<()>;

    /// The last snapshot saved, if any
    async fn load_snapshot(&self) -> StoreResult<Option<GameSession>>;

    fn observe(&self) -> broadcast::Receiver<StoreEvent>;

    /// Name for log lines
    fn name(&self) -> &str;
}

/// Ids become file names, so only allow a conservative character set
pub(crate) fn check_id(id: &str) -> StoreResult<()> {
    let ok = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_string()))
    }
}
