use crate::protocol::ServerMessage;
use crate::state::AppState;
use crate::store::StoreEvent;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Spawn a background task that follows the store and pushes a fresh set
/// list to every client whenever a set is saved
pub fn spawn_store_watcher(state: Arc<AppState>) -> JoinHandle<()> {
    let mut events = state.store.observe();
    tracing::info!("Watching {} store for changes", state.store.name());

    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(StoreEvent::SetSaved(id)) => {
                    tracing::debug!("Set {} saved", id);
                    match state.list_sets().await {
                        Ok(sets) => state.broadcast_to_all(ServerMessage::Sets { sets }),
                        Err(e) => tracing::warn!("Could not refresh set list: {}", e),
                    }
                }
                Ok(StoreEvent::GameRecorded(id)) => tracing::info!("Game {} recorded", id),
                Ok(StoreEvent::SnapshotSaved(id)) => tracing::trace!("Snapshot of {} saved", id),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Store watcher lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
