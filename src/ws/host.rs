//! Host-only command handlers
//!
//! All handlers in this module require the Host role.
//! Authorization is checked in the main dispatch layer before calling these.

use crate::game::{FinalRoundStage, GameSnapshot};
use crate::protocol::ServerMessage;
use crate::state::{AppState, StateResult};
use crate::types::{Coordinate, SetId, Team, TeamId};
use std::sync::Arc;

/// Reply to the host with the new snapshot. The board already got it by broadcast.
pub fn snapshot_reply(result: StateResult<GameSnapshot>) -> Option<ServerMessage> {
    Some(match result {
        Ok(snapshot) => ServerMessage::GameState {
            snapshot: Box::new(snapshot),
        },
        Err(e) => {
            tracing::warn!("Host command failed: {}", e);
            e.into()
        }
    })
}

pub fn roster_reply(result: StateResult<Vec<Team>>) -> Option<ServerMessage> {
    Some(match result {
        Ok(teams) => ServerMessage::Roster { teams },
        Err(e) => e.into(),
    })
}

pub async fn handle_add_team(
    state: &Arc<AppState>,
    name: String,
    members: Vec<String>,
    color: String,
) -> Option<ServerMessage> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Some(ServerMessage::Error {
            code: "INVALID_TEAM".to_string(),
            msg: "Team name cannot be empty".to_string(),
        });
    }
    tracing::info!("Host adding team {}", name);
    match state.add_team(name, members, color).await {
        Ok(_) => Some(ServerMessage::Roster {
            teams: state.get_roster().await,
        }),
        Err(e) => Some(e.into()),
    }
}

pub async fn handle_remove_team(state: &Arc<AppState>, team_id: TeamId) -> Option<ServerMessage> {
    tracing::info!("Host removing team {}", team_id);
    roster_reply(state.remove_team(&team_id).await)
}

pub async fn handle_load_set(state: &Arc<AppState>, set_id: SetId) -> Option<ServerMessage> {
    tracing::info!("Host loading set {}", set_id);
    snapshot_reply(state.load_set(&set_id).await)
}

pub async fn handle_open_clue(state: &Arc<AppState>, at: Coordinate) -> Option<ServerMessage> {
    tracing::debug!("Host opening clue {:?}", at);
    snapshot_reply(state.open_clue(at).await)
}

/// Resolve the open clue; if that cleared the board, tell everyone the phase moved
pub async fn handle_resolve_clue(state: &Arc<AppState>) -> Option<ServerMessage> {
    match state.resolve_clue().await {
        Ok((Some(phase), snapshot)) => {
            tracing::info!("Board cleared, now in {:?}", phase);
            state.broadcast_to_all(ServerMessage::PhaseChanged { phase });
            snapshot_reply(Ok(snapshot))
        }
        Ok((None, snapshot)) => snapshot_reply(Ok(snapshot)),
        Err(e) => snapshot_reply(Err(e)),
    }
}

pub async fn handle_advance_phase(state: &Arc<AppState>) -> Option<ServerMessage> {
    tracing::info!("Host advancing phase");
    match state.advance_phase().await {
        Ok(snapshot) => {
            state.broadcast_to_all(ServerMessage::PhaseChanged {
                phase: snapshot.phase,
            });
            snapshot_reply(Ok(snapshot))
        }
        Err(e) => snapshot_reply(Err(e)),
    }
}

pub async fn handle_edit_score(
    state: &Arc<AppState>,
    team_id: TeamId,
    delta: i64,
) -> Option<ServerMessage> {
    tracing::info!("Host adjusting score of {} by {}", team_id, delta);
    snapshot_reply(state.edit_score(&team_id, delta).await)
}

pub async fn handle_advance_final_stage(state: &Arc<AppState>) -> Option<ServerMessage> {
    match state.advance_final_stage().await {
        Ok((stage, snapshot)) => {
            tracing::info!("Final round moved to {:?}", stage);
            state.broadcast_to_all(ServerMessage::FinalStage { stage });
            if stage == FinalRoundStage::Podium {
                tracing::info!("Game {} finished, podium {:?}", snapshot.game_id, snapshot.podium);
            }
            snapshot_reply(Ok(snapshot))
        }
        Err(e) => snapshot_reply(Err(e)),
    }
}

pub async fn handle_end_game(state: &Arc<AppState>) -> Option<ServerMessage> {
    match state.end_game().await {
        Ok(()) => Some(ServerMessage::Roster {
            teams: state.get_roster().await,
        }),
        Err(e) => Some(e.into()),
    }
}
