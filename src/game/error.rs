use std::fmt;

/// Result type for game-core operations
pub type GameResult<T> = Result<T, GameError>;

/// Errors the game core can return. None of them leave state half-applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Malformed set: {0}")]
    MalformedSet(String),

    #[error("Invalid wager for team {team}: {reason}")]
    InvalidWager { team: usize, reason: WagerRejection },

    #[error("No eligible daily double clue found after {attempts} attempts")]
    NoEligibleDailyDouble { attempts: u32 },

    #[error("Illegal transition: {0}")]
    IllegalTransition(String),
}

impl GameError {
    /// Stable code for protocol error messages
    pub fn code(&self) -> &'static str {
        match self {
            GameError::MalformedSet(_) => "MALFORMED_SET",
            GameError::InvalidWager { .. } => "INVALID_WAGER",
            GameError::NoEligibleDailyDouble { .. } => "NO_ELIGIBLE_DAILY_DOUBLE",
            GameError::IllegalTransition(_) => "ILLEGAL_TRANSITION",
        }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        GameError::MalformedSet(msg.into())
    }

    pub(crate) fn illegal(msg: impl Into<String>) -> Self {
        GameError::IllegalTransition(msg.into())
    }
}

/// Why a wager was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WagerRejection {
    NotANumber,
    Negative,
    ExceedsLimit { wager: i64, limit: i64 },
}

impl fmt::Display for WagerRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WagerRejection::NotANumber => write!(f, "wager is not a whole number"),
            WagerRejection::Negative => write!(f, "wager cannot be negative"),
            WagerRejection::ExceedsLimit { wager, limit } => {
                write!(f, "wager {} exceeds the limit of {}", wager, limit)
            }
        }
    }
}
