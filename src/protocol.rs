use crate::game::{BuildStage, FinalRoundStage, GameSnapshot};
use crate::state::{BuilderView, PuzzleView};
use crate::types::*;
use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Ask for the current game snapshot (any role)
    RequestState,
    ListSets,

    // Host-only: lobby roster
    HostAddTeam {
        name: String,
        #[serde(default)]
        members: Vec<String>,
        color: String,
    },
    HostRemoveTeam {
        team_id: TeamId,
    },
    HostRenameTeam {
        team_id: TeamId,
        name: String,
    },
    HostRecolorTeam {
        team_id: TeamId,
        color: String,
    },
    HostAddMember {
        team_id: TeamId,
        member: String,
    },
    HostRemoveMember {
        team_id: TeamId,
        member: String,
    },

    // Host-only: live game
    HostLoadSet {
        set_id: SetId,
    },
    HostOpenClue {
        at: Coordinate,
    },
    HostMarkCorrect {
        team_id: TeamId,
    },
    HostMarkIncorrect {
        team_id: TeamId,
    },
    HostSetDailyDoubleWager {
        wager: i64,
    },
    HostMarkDailyDouble {
        correct: bool,
    },
    HostResolveClue,
    HostAdvancePhase,
    HostEditScore {
        team_id: TeamId,
        delta: i64,
    },
    HostSelectTeam {
        team_id: TeamId,
    },
    HostRandomDailyDoubles,
    HostSetFinalWager {
        team_id: TeamId,
        /// Raw text as typed; validated when the wager stage closes
        wager: String,
    },
    HostSubmitFinalAnswer {
        team_id: TeamId,
        answer: String,
    },
    HostMarkFinal {
        team_id: TeamId,
        correct: bool,
    },
    HostAdvanceFinalStage,
    HostResetGame,
    HostEndGame,

    // Host-only: set builder
    BuildNew,
    BuildEdit {
        set_id: SetId,
    },
    BuildSetTitle {
        title: String,
    },
    /// Space-separated
    BuildAddTags {
        tags: String,
    },
    BuildRemoveTag {
        tag: String,
    },
    BuildSetCategoryName {
        round: RoundNumber,
        category: usize,
        name: String,
    },
    BuildSetClue {
        round: RoundNumber,
        at: Coordinate,
        clue: String,
        response: String,
    },
    BuildSwapClues {
        round: RoundNumber,
        category: usize,
        a: usize,
        b: usize,
    },
    BuildAddCategory {
        round: RoundNumber,
    },
    BuildSubtractCategory {
        round: RoundNumber,
    },
    BuildToggleDailyDouble {
        round: RoundNumber,
        at: Coordinate,
    },
    BuildRandomDailyDoubles {
        round: RoundNumber,
    },
    BuildClearDailyDoubles {
        round: RoundNumber,
    },
    BuildSetFinal {
        category: String,
        clue: String,
        response: String,
    },
    BuildSetHasTwoRounds {
        has_two_rounds: bool,
    },
    BuildNext,
    BuildBack,
    BuildJumpTo {
        stage: BuildStage,
    },
    BuildSaveDraft,
    BuildPublish,

    // Host-only: daily puzzle
    HostStartPuzzle {
        clue: String,
        answer: String,
    },

    // Daily puzzle keys (any role, the board is where it's played)
    PuzzleLetter {
        letter: char,
    },
    PuzzleBackspace,
    PuzzleEnter,
    PuzzleGiveUp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        role: Role,
        #[serde(skip_serializing_if = "Option::is_none")]
        game: Option<Box<GameSnapshot>>,
        teams: Vec<Team>,
        server_now: String,
    },
    GameState {
        snapshot: Box<GameSnapshot>,
    },
    /// A clue closed and the board moved on to a new phase
    PhaseChanged {
        phase: GamePhase,
    },
    FinalStage {
        stage: FinalRoundStage,
    },
    GameClosed {
        game_id: GameId,
    },
    Roster {
        teams: Vec<Team>,
    },
    Sets {
        sets: Vec<SetSummary>,
    },
    Build {
        view: Box<BuilderView>,
    },
    SetSaved {
        set: SetSummary,
    },
    Puzzle {
        puzzle: PuzzleView,
    },
    Error {
        code: String,
        msg: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_tags() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"host_open_clue","at":{"category":2,"clue":4}}"#).unwrap();
        assert!(matches!(
            msg,
            ClientMessage::HostOpenClue { at } if at == Coordinate::new(2, 4)
        ));

        let msg: ClientMessage = serde_json::from_str(
            r#"{"t":"build_set_clue","round":"two","at":{"category":0,"clue":1},"clue":"Q","response":"A"}"#,
        )
        .unwrap();
        assert!(matches!(
            msg,
            ClientMessage::BuildSetClue { round: RoundNumber::Two, .. }
        ));

        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"host_add_team","name":"Owls","color":"blue"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::HostAddTeam { members, .. } if members.is_empty()));

        assert!(serde_json::from_str::<ClientMessage>(r#"{"t":"host_buzz"}"#).is_err());
    }

    #[test]
    fn test_server_message_shape() {
        let json = serde_json::to_value(ServerMessage::Error {
            code: "NO_ACTIVE_GAME".to_string(),
            msg: "No game is running".to_string(),
        })
        .unwrap();
        assert_eq!(json["t"], "error");
        assert_eq!(json["code"], "NO_ACTIVE_GAME");

        let json = serde_json::to_value(ServerMessage::PhaseChanged {
            phase: GamePhase::FinalRound,
        })
        .unwrap();
        assert_eq!(json["t"], "phase_changed");
        assert_eq!(json["phase"], "FINAL_ROUND");
    }
}
