use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};

use super::{check_id, SetStore, StoreError, StoreEvent, StoreResult};
use crate::game::GameSession;
use crate::types::{GameId, GameRecord, SetDocument, SetId, SetSummary};

/// Process-local store; everything is gone on restart
pub struct MemoryStore {
    sets: RwLock<HashMap<SetId, SetDocument>>,
    games: RwLock<HashMap<GameId, GameRecord>>,
    snapshot: RwLock<Option<GameSession>>,
    events: broadcast::Sender<StoreEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _rx) = broadcast::channel(100);
        Self {
            sets: RwLock::new(HashMap::new()),
            games: RwLock::new(HashMap::new()),
            snapshot: RwLock::new(None),
            events,
        }
    }

    /// Seed the store with sets, e.g. in tests
    pub async fn with_sets(sets: impl IntoIterator<Item = SetDocument>) -> Self {
        let store = Self::new();
        {
            let mut map = store.sets.write().await;
            for doc in sets {
                map.insert(doc.id.clone(), doc);
            }
        }
        store
    }

    pub async fn games(&self) -> Vec<GameRecord> {
        self.games.read().await.values().cloned().collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SetStore for MemoryStore {
    async fn load_set(&self, id: &str) -> StoreResult<SetDocument> {
        self.sets
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn list_sets(&self) -> StoreResult<Vec<SetSummary>> {
        let mut summaries: Vec<SetSummary> =
            self.sets.read().await.values().map(SetSummary::from).collect();
        summaries.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(summaries)
    }

    async fn save_set(&self, doc: &SetDocument) -> StoreResult<()> {
        check_id(&doc.id)?;
        self.sets.write().await.insert(doc.id.clone(), doc.clone());
        // No receivers is fine
        let _ = self.events.send(StoreEvent::SetSaved(doc.id.clone()));
        Ok(())
    }

    async fn save_game(&self, record: &GameRecord) -> StoreResult<()> {
        self.games
            .write()
            .await
            .insert(record.game_id.clone(), record.clone());
        let _ = self
            .events
            .send(StoreEvent::GameRecorded(record.game_id.clone()));
        Ok(())
    }

    async fn save_snapshot(&self, session: &GameSession) -> StoreResult<()> {
        *self.snapshot.write().await = Some(session.clone());
        let _ = self.events.send(StoreEvent::SnapshotSaved(session.id.clone()));
        Ok(())
    }

    async fn load_snapshot(&self) -> StoreResult<Option<GameSession>> {
        Ok(self.snapshot.read().await.clone())
    }

    fn observe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn name(&self) -> &str {
        "memory"
    }
}
