//! The daily word puzzle, played on the board between games

use super::{AppState, StateError, StateResult};
use crate::game::puzzle::{LetterOutcome, PuzzleStatus};
use crate::game::DailyPuzzle;
use crate::protocol::ServerMessage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// A puzzle plus the clock it is scored against
#[derive(Debug, Clone)]
pub struct PuzzleRun {
    pub puzzle: DailyPuzzle,
    pub started: Instant,
}

/// What the board shows. The answer only appears once the puzzle is over.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PuzzleView {
    pub clue: String,
    pub length: usize,
    pub status: PuzzleStatus,
    pub current: String,
    pub attempts: Vec<String>,
    pub feedback: Vec<Vec<LetterOutcome>>,
    pub keyboard: BTreeMap<char, LetterOutcome>,
    pub score: Option<f64>,
    pub answer: Option<String>,
}

impl From<&DailyPuzzle> for PuzzleView {
    fn from(puzzle: &DailyPuzzle) -> Self {
        Self {
            clue: puzzle.clue.clone(),
            length: puzzle.target_len(),
            status: puzzle.status,
            current: puzzle.current.clone(),
            attempts: puzzle.attempts.clone(),
            feedback: puzzle.attempts.iter().map(|a| puzzle.outcomes(a)).collect(),
            keyboard: puzzle.keyboard.clone(),
            score: puzzle.score,
            answer: puzzle.reveal().map(str::to_string),
        }
    }
}

/// Keys a puzzle client can press
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PuzzleKey {
    Letter(char),
    Backspace,
    Enter,
    GiveUp,
}

impl AppState {
    pub async fn start_puzzle(&self, clue: String, answer: String) -> PuzzleView {
        let mut puzzle = DailyPuzzle::new(clue, answer.trim());
        puzzle.start();
        let view = PuzzleView::from(&puzzle);
        *self.puzzle.write().await = Some(PuzzleRun {
            puzzle,
            started: Instant::now(),
        });
        tracing::info!("Daily puzzle started ({} letters)", view.length);
        self.broadcast_to_all(ServerMessage::Puzzle { puzzle: view.clone() });
        view
    }

    /// Apply one key press; solving or giving up scores the puzzle
    pub async fn press_puzzle_key(&self, key: PuzzleKey) -> StateResult<PuzzleView> {
        let view = {
            let mut guard = self.puzzle.write().await;
            let run = guard.as_mut().ok_or(StateError::NoActivePuzzle)?;
            let was_running = run.puzzle.status == PuzzleStatus::Ongoing;
            match key {
                PuzzleKey::Letter(c) if c.is_alphabetic() => run.puzzle.push_letter(c),
                PuzzleKey::Letter(c) => tracing::debug!("Ignoring puzzle key {:?}", c),
                PuzzleKey::Backspace => run.puzzle.pop_letter(),
                PuzzleKey::Enter => {
                    run.puzzle.enter_guess();
                }
                PuzzleKey::GiveUp => run.puzzle.give_up(),
            }
            if was_running && run.puzzle.status != PuzzleStatus::Ongoing {
                let elapsed = run.started.elapsed().as_secs_f64();
                let score = run.puzzle.finish(elapsed);
                tracing::info!(
                    "Daily puzzle over ({:?}) after {} attempts, score {}",
                    run.puzzle.status,
                    run.puzzle.attempts.len(),
                    score
                );
            }
            PuzzleView::from(&run.puzzle)
        };
        self.broadcast_to_all(ServerMessage::Puzzle { puzzle: view.clone() });
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn type_word(state: &AppState, word: &str) -> PuzzleView {
        for c in word.chars() {
            state.press_puzzle_key(PuzzleKey::Letter(c)).await.unwrap();
        }
        state.press_puzzle_key(PuzzleKey::Enter).await.unwrap()
    }

    #[tokio::test]
    async fn test_puzzle_requires_start() {
        let state = AppState::default();
        assert!(matches!(
            state.press_puzzle_key(PuzzleKey::Enter).await,
            Err(StateError::NoActivePuzzle)
        ));
    }

    #[tokio::test]
    async fn test_solve_scores_and_reveals() {
        let state = AppState::default();
        let view = state
            .start_puzzle("Fruit of knowledge".to_string(), "apple".to_string())
            .await;
        assert_eq!(view.length, 5);
        assert_eq!(view.answer, None);

        let view = type_word(&state, "apply").await;
        assert_eq!(view.status, PuzzleStatus::Ongoing);
        assert_eq!(view.feedback[0][4], LetterOutcome::NotInWord);
        assert_eq!(view.score, None);

        let view = type_word(&state, "apple").await;
        assert_eq!(view.status, PuzzleStatus::Solved);
        assert_eq!(view.answer.as_deref(), Some("APPLE"));
        assert!(view.score.is_some_and(|s| s > 0.0));
    }

    #[tokio::test]
    async fn test_give_up_and_ignored_keys() {
        let state = AppState::default();
        state
            .start_puzzle("Clue".to_string(), "moon".to_string())
            .await;
        let view = state.press_puzzle_key(PuzzleKey::Letter('7')).await.unwrap();
        assert_eq!(view.current, "");

        let view = state.press_puzzle_key(PuzzleKey::GiveUp).await.unwrap();
        assert_eq!(view.status, PuzzleStatus::GaveUp);
        assert_eq!(view.answer.as_deref(), Some("MOON"));
        // No full attempt, nothing to score
        assert_eq!(view.score, Some(0.0));
    }
}
