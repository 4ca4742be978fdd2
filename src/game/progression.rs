//! Live-play phase order and final-round sub-stages.

use crate::types::GamePhase;
use serde::{Deserialize, Serialize};

impl GamePhase {
    /// The phase that follows this one, or `None` once in the final round.
    /// Single-round sets go straight from the first board to the final round.
    pub fn next(self, has_two_rounds: bool) -> Option<GamePhase> {
        match self {
            GamePhase::Round1 if has_two_rounds => Some(GamePhase::Round2),
            GamePhase::Round1 | GamePhase::Round2 => Some(GamePhase::FinalRound),
            GamePhase::FinalRound => None,
        }
    }
}

/// Steps inside the final round
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FinalRoundStage {
    #[default]
    MakeWager,
    SubmitAnswer,
    RevealResponse,
    Podium,
}

impl FinalRoundStage {
    pub fn next(self) -> Option<FinalRoundStage> {
        match self {
            FinalRoundStage::MakeWager => Some(FinalRoundStage::SubmitAnswer),
            FinalRoundStage::SubmitAnswer => Some(FinalRoundStage::RevealResponse),
            FinalRoundStage::RevealResponse => Some(FinalRoundStage::Podium),
            FinalRoundStage::Podium => None,
        }
    }
}
