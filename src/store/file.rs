use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;

use super::{check_id, SetStore, StoreError, StoreEvent, StoreResult};
use crate::game::GameSession;
use crate::types::{GameRecord, SetDocument, SetSummary};

const SNAPSHOT_FILE: &str = "snapshot.json";

/// One pretty-printed JSON file per set and per finished game.
///
/// ```text
/// <root>/sets/<set id>.json
/// <root>/games/<game id>.json
/// <root>/snapshot.json
/// ```
pub struct JsonFileStore {
    root: PathBuf,
    events: broadcast::Sender<StoreEvent>,
}

impl JsonFileStore {
    /// Open a store rooted at `root`, creating its directories
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(root.join("sets")).await?;
        tokio::fs::create_dir_all(root.join("games")).await?;
        tracing::info!("Using JSON file store at {}", root.display());
        let (events, _rx) = broadcast::channel(100);
        Ok(Self { root, events })
    }

    fn set_path(&self, id: &str) -> PathBuf {
        self.root.join("sets").join(format!("{}.json", id))
    }

    fn game_path(&self, id: &str) -> PathBuf {
        self.root.join("games").join(format!("{}.json", id))
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    let json = serde_json::to_vec_pretty(value)?;
    // Write next to the target and rename so readers never see half a file
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> StoreResult<T> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl SetStore for JsonFileStore {
    async fn load_set(&self, id: &str) -> StoreResult<SetDocument> {
        check_id(id)?;
        match read_json(&self.set_path(id)).await {
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(id.to_string()))
            }
            other => other,
        }
    }

    async fn list_sets(&self) -> StoreResult<Vec<SetSummary>> {
        let mut summaries = Vec::new();
        let mut entries = tokio::fs::read_dir(self.root.join("sets")).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_json::<SetDocument>(&path).await {
                Ok(doc) => summaries.push(SetSummary::from(&doc)),
                Err(e) => tracing::warn!("Skipping unreadable set {}: {}", path.display(), e),
            }
        }
        summaries.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(summaries)
    }

    async fn save_set(&self, doc: &SetDocument) -> StoreResult<()> {
        check_id(&doc.id)?;
        write_json(&self.set_path(&doc.id), doc).await?;
        let _ = self.events.send(StoreEvent::SetSaved(doc.id.clone()));
        Ok(())
    }

    async fn save_game(&self, record: &GameRecord) -> StoreResult<()> {
        check_id(&record.game_id)?;
        write_json(&self.game_path(&record.game_id), record).await?;
        let _ = self
            .events
            .send(StoreEvent::GameRecorded(record.game_id.clone()));
        Ok(())
    }

    async fn save_snapshot(&self, session: &GameSession) -> StoreResult<()> {
        write_json(&self.root.join(SNAPSHOT_FILE), session).await?;
        let _ = self.events.send(StoreEvent::SnapshotSaved(session.id.clone()));
        Ok(())
    }

    async fn load_snapshot(&self) -> StoreResult<Option<GameSession>> {
        match read_json(&self.root.join(SNAPSHOT_FILE)).await {
            Ok(session) => Ok(Some(session)),
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn observe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn name(&self) -> &str {
        "json-file"
    }
}
