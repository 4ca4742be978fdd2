mod build;
pub mod export;
mod play;
mod puzzle;

use crate::game::{GameError, GameSession, SetBuilder};
use crate::protocol::ServerMessage;
use crate::store::{MemoryStore, SetStore, StoreError};
use crate::types::Team;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};

pub use build::BuilderView;
pub use puzzle::{PuzzleKey, PuzzleRun, PuzzleView};

pub type StateResult<T> = Result<T, StateError>;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("No game is running")]
    NoActiveGame,

    #[error("Unknown team: {0}")]
    UnknownTeam(String),

    #[error("No puzzle is running")]
    NoActivePuzzle,

    #[error("Import rejected: {0}")]
    InvalidImport(String),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl StateError {
    /// Stable code sent to clients in `ServerMessage::Error`
    pub fn code(&self) -> &'static str {
        match self {
            StateError::NoActiveGame => "NO_ACTIVE_GAME",
            StateError::UnknownTeam(_) => "UNKNOWN_TEAM",
            StateError::NoActivePuzzle => "NO_ACTIVE_PUZZLE",
            StateError::InvalidImport(_) => "INVALID_IMPORT",
            StateError::Game(e) => e.code(),
            StateError::Store(StoreError::NotFound(_)) => "SET_NOT_FOUND",
            StateError::Store(_) => "STORE_ERROR",
        }
    }
}

impl From<StateError> for ServerMessage {
    fn from(e: StateError) -> Self {
        ServerMessage::Error {
            code: e.code().to_string(),
            msg: e.to_string(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The game being played, if any
    pub session: Arc<RwLock<Option<GameSession>>>,
    /// Teams waiting for the next game
    pub roster: Arc<RwLock<Vec<Team>>>,
    /// The set being authored
    pub builder: Arc<RwLock<SetBuilder>>,
    pub puzzle: Arc<RwLock<Option<PuzzleRun>>>,
    pub store: Arc<dyn SetStore>,
    /// Broadcast channel for every connected client (host and board)
    pub broadcast: broadcast::Sender<ServerMessage>,
    /// Bumped on every session change, under the session write lock
    revision: Arc<AtomicU64>,
    /// Revision of the newest snapshot written to the store
    persisted: Arc<Mutex<u64>>,
}

impl AppState {
    pub fn new(store: Arc<dyn SetStore>) -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self {
            session: Arc::new(RwLock::new(None)),
            roster: Arc::new(RwLock::new(Vec::new())),
            builder: Arc::new(RwLock::new(SetBuilder::new())),
            puzzle: Arc::new(RwLock::new(None)),
            store,
            broadcast: tx,
            revision: Arc::new(AtomicU64::new(0)),
            persisted: Arc::new(Mutex::new(0)),
        }
    }

    /// Pick up a game that was running when the server went down
    pub async fn restore_snapshot(&self) -> StateResult<bool> {
        let Some(session) = self.store.load_snapshot().await? else {
            return Ok(false);
        };
        if session.is_finished() {
            tracing::info!("Last game {} already finished, not restoring", session.id);
            return Ok(false);
        }
        session.check_shape().map_err(StateError::InvalidImport)?;
        tracing::info!(
            "Restored game {} ({:?}, step {})",
            session.id,
            session.phase(),
            session.ledger().step()
        );
        *self.roster.write().await = session.ledger().teams().cloned().collect();
        *self.session.write().await = Some(session);
        Ok(true)
    }

    /// Send to every client. No receivers connected is fine.
    pub fn broadcast_to_all(&self, msg: ServerMessage) {
        let _ = self.broadcast.send(msg);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }
}
