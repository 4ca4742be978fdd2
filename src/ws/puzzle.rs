use crate::protocol::ServerMessage;
use crate::state::{AppState, PuzzleKey};
use std::sync::Arc;

pub async fn handle_start(
    state: &Arc<AppState>,
    clue: String,
    answer: String,
) -> Option<ServerMessage> {
    if answer.trim().is_empty() {
        return Some(ServerMessage::Error {
            code: "INVALID_PUZZLE".to_string(),
            msg: "Puzzle answer cannot be empty".to_string(),
        });
    }
    let puzzle = state.start_puzzle(clue, answer).await;
    Some(ServerMessage::Puzzle { puzzle })
}

/// The view is broadcast to everyone, so the presser gets no extra reply
pub async fn handle_key(state: &Arc<AppState>, key: PuzzleKey) -> Option<ServerMessage> {
    match state.press_puzzle_key(key).await {
        Ok(_) => None,
        Err(e) => Some(e.into()),
    }
}
