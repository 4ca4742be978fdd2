//! Synchronous game core: board, scoring, daily doubles, phase machines.
//!
//! Nothing in here performs I/O or awaits. The host in [`crate::state`]
//! wraps a [`GameSession`] in a lock and persists snapshots on its own.

pub mod board;
pub mod build;
pub mod daily_double;
pub mod error;
pub mod ledger;
pub mod progression;
pub mod puzzle;
pub mod session;
pub mod set;
pub mod wager;

pub use board::Board;
pub use build::{BuildStage, SetBuilder};
pub use daily_double::DailyDoubles;
pub use error::{GameError, GameResult, WagerRejection};
pub use ledger::ScoreLedger;
pub use progression::FinalRoundStage;
pub use puzzle::{puzzle_score, DailyPuzzle};
pub use session::{ActiveClue, GameSession, GameSnapshot};
pub use set::TriviaSet;
pub use wager::Placing;
