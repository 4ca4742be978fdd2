//! Routes each client message to its handler.
//!
//! The board may read state, list sets and type into the puzzle. Every
//! other command is host-only and is refused here before any state is touched.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::{AppState, PuzzleKey};
use crate::types::Role;
use std::sync::Arc;

use super::{builder, host, puzzle};

/// Bail out with UNAUTHORIZED unless the sender is the host
macro_rules! check_host {
    ($role:expr, $action:expr) => {
        if *$role != Role::Host {
            return Some(ServerMessage::Error {
                code: "UNAUTHORIZED".to_string(),
                msg: format!("Only host can {}", $action),
            });
        }
    };
}

/// `None` means the result reaches the client by broadcast instead
pub async fn handle_message(
    msg: ClientMessage,
    role: &Role,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        // Any role
        ClientMessage::RequestState => Some(match state.get_snapshot().await {
            Some(snapshot) => ServerMessage::GameState {
                snapshot: Box::new(snapshot),
            },
            None => ServerMessage::Roster {
                teams: state.get_roster().await,
            },
        }),

        ClientMessage::ListSets => Some(match state.list_sets().await {
            Ok(sets) => ServerMessage::Sets { sets },
            Err(e) => e.into(),
        }),

        ClientMessage::PuzzleLetter { letter } => {
            puzzle::handle_key(state, PuzzleKey::Letter(letter)).await
        }
        ClientMessage::PuzzleBackspace => puzzle::handle_key(state, PuzzleKey::Backspace).await,
        ClientMessage::PuzzleEnter => puzzle::handle_key(state, PuzzleKey::Enter).await,
        ClientMessage::PuzzleGiveUp => puzzle::handle_key(state, PuzzleKey::GiveUp).await,

        // Host-only: roster
        ClientMessage::HostAddTeam {
            name,
            members,
            color,
        } => {
            check_host!(role, "add teams");
            host::handle_add_team(state, name, members, color).await
        }

        ClientMessage::HostRemoveTeam { team_id } => {
            check_host!(role, "remove teams");
            host::handle_remove_team(state, team_id).await
        }

        ClientMessage::HostRenameTeam { team_id, name } => {
            check_host!(role, "rename teams");
            host::roster_reply(state.rename_team(&team_id, name).await)
        }

        ClientMessage::HostRecolorTeam { team_id, color } => {
            check_host!(role, "recolor teams");
            host::roster_reply(state.recolor_team(&team_id, color).await)
        }

        ClientMessage::HostAddMember { team_id, member } => {
            check_host!(role, "edit team members");
            host::roster_reply(state.add_member(&team_id, member).await)
        }

        ClientMessage::HostRemoveMember { team_id, member } => {
            check_host!(role, "edit team members");
            host::roster_reply(state.remove_member(&team_id, member).await)
        }

        // Host-only: live game
        ClientMessage::HostLoadSet { set_id } => {
            check_host!(role, "load sets");
            host::handle_load_set(state, set_id).await
        }

        ClientMessage::HostOpenClue { at } => {
            check_host!(role, "open clues");
            host::handle_open_clue(state, at).await
        }

        ClientMessage::HostMarkCorrect { team_id } => {
            check_host!(role, "mark answers");
            host::snapshot_reply(state.mark_correct(&team_id).await)
        }

        ClientMessage::HostMarkIncorrect { team_id } => {
            check_host!(role, "mark answers");
            host::snapshot_reply(state.mark_incorrect(&team_id).await)
        }

        ClientMessage::HostSetDailyDoubleWager { wager } => {
            check_host!(role, "set wagers");
            host::snapshot_reply(state.set_daily_double_wager(wager).await)
        }

        ClientMessage::HostMarkDailyDouble { correct } => {
            check_host!(role, "mark answers");
            host::snapshot_reply(state.mark_daily_double(correct).await)
        }

        ClientMessage::HostResolveClue => {
            check_host!(role, "resolve clues");
            host::handle_resolve_clue(state).await
        }

        ClientMessage::HostAdvancePhase => {
            check_host!(role, "advance the game");
            host::handle_advance_phase(state).await
        }

        ClientMessage::HostEditScore { team_id, delta } => {
            check_host!(role, "edit scores");
            host::handle_edit_score(state, team_id, delta).await
        }

        ClientMessage::HostSelectTeam { team_id } => {
            check_host!(role, "select teams");
            host::snapshot_reply(state.select_team(&team_id).await)
        }

        ClientMessage::HostRandomDailyDoubles => {
            check_host!(role, "place daily doubles");
            host::snapshot_reply(state.randomize_daily_doubles().await)
        }

        ClientMessage::HostSetFinalWager { team_id, wager } => {
            check_host!(role, "set wagers");
            host::snapshot_reply(state.set_final_wager(&team_id, wager).await)
        }

        ClientMessage::HostSubmitFinalAnswer { team_id, answer } => {
            check_host!(role, "submit answers");
            host::snapshot_reply(state.submit_final_answer(&team_id, answer).await)
        }

        ClientMessage::HostMarkFinal { team_id, correct } => {
            check_host!(role, "mark answers");
            host::snapshot_reply(state.mark_final(&team_id, correct).await)
        }

        ClientMessage::HostAdvanceFinalStage => {
            check_host!(role, "advance the final round");
            host::handle_advance_final_stage(state).await
        }

        ClientMessage::HostResetGame => {
            check_host!(role, "reset the game");
            host::snapshot_reply(state.reset_game().await)
        }

        ClientMessage::HostEndGame => {
            check_host!(role, "end the game");
            host::handle_end_game(state).await
        }

        ClientMessage::HostStartPuzzle { clue, answer } => {
            check_host!(role, "start the puzzle");
            puzzle::handle_start(state, clue, answer).await
        }

        // Host-only: builder
        build_msg => {
            check_host!(role, "build sets");
            builder::handle_build_message(state, build_msg).await
        }
    }
}
