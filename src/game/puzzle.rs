//! Single-player daily word puzzle and its score formula.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Score for a finished puzzle, rounded to two decimals.
///
/// An exact letter is worth 1, a letter found elsewhere in the target 0.5.
/// More attempts and more time both shrink the score logarithmically. A guess
/// of the wrong length, or no attempts at all, scores zero.
pub fn puzzle_score(target: &str, guess: &str, attempts: u32, seconds: f64) -> f64 {
    let target: Vec<char> = target.to_uppercase().chars().collect();
    let guess: Vec<char> = guess.to_uppercase().chars().collect();
    if attempts == 0 || target.is_empty() || guess.len() != target.len() {
        return 0.0;
    }

    let credit: f64 = guess
        .iter()
        .zip(target.iter())
        .map(|(g, t)| {
            if g == t {
                1.0
            } else if target.contains(g) {
                0.5
            } else {
                0.0
            }
        })
        .sum();

    let correctness = credit / target.len() as f64;
    let attempt_ratio = 1.0 / (f64::from(attempts).ln() * 0.1 + 1.0);
    // Sub-second solves would otherwise push the ratio above 1
    let seconds_ratio = 1.0 / (seconds.max(1.0).ln() * 0.05 + 1.0);

    let score = 5000.0 * correctness * attempt_ratio * seconds_ratio;
    (score * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LetterOutcome {
    Correct,
    Misplaced,
    NotInWord,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PuzzleStatus {
    #[default]
    NotStarted,
    Ongoing,
    Solved,
    GaveUp,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyPuzzle {
    pub clue: String,
    target: String,
    pub status: PuzzleStatus,
    /// Letters typed since the last entered guess
    pub current: String,
    pub attempts: Vec<String>,
    /// Best known outcome per letter tried so far
    pub keyboard: BTreeMap<char, LetterOutcome>,
    pub score: Option<f64>,
}

impl DailyPuzzle {
    pub fn new(clue: impl Into<String>, target: &str) -> Self {
        Self {
            clue: clue.into(),
            target: target.to_uppercase(),
            status: PuzzleStatus::NotStarted,
            current: String::new(),
            attempts: Vec::new(),
            keyboard: BTreeMap::new(),
            score: None,
        }
    }

    pub fn target_len(&self) -> usize {
        self.target.chars().count()
    }

    pub fn start(&mut self) {
        if self.status == PuzzleStatus::NotStarted {
            self.status = PuzzleStatus::Ongoing;
        }
    }

    /// Type a letter; ignored once the guess is full or the puzzle isn't running
    pub fn push_letter(&mut self, letter: char) {
        if self.status == PuzzleStatus::Ongoing && self.current.chars().count() < self.target_len() {
            self.current.extend(letter.to_uppercase());
        }
    }

    pub fn pop_letter(&mut self) {
        self.current.pop();
    }

    /// Submit the typed guess. Only full-length guesses count.
    /// Returns true when the guess solves the puzzle.
    pub fn enter_guess(&mut self) -> bool {
        if self.status != PuzzleStatus::Ongoing || self.current.chars().count() != self.target_len() {
            return false;
        }
        let guess = std::mem::take(&mut self.current);
        for (letter, outcome) in guess.chars().zip(self.outcomes(&guess)) {
            match outcome {
                LetterOutcome::Correct => {
                    self.keyboard.insert(letter, LetterOutcome::Correct);
                }
                LetterOutcome::Misplaced => {
                    if self.keyboard.get(&letter) != Some(&LetterOutcome::Correct) {
                        self.keyboard.insert(letter, LetterOutcome::Misplaced);
                    }
                }
                LetterOutcome::NotInWord => {
                    self.keyboard.entry(letter).or_insert(LetterOutcome::NotInWord);
                }
            }
        }
        let solved = guess == self.target;
        self.attempts.push(guess);
        if solved {
            self.status = PuzzleStatus::Solved;
        }
        solved
    }

    /// Per-position outcome of a guess against the target
    pub fn outcomes(&self, guess: &str) -> Vec<LetterOutcome> {
        let target: Vec<char> = self.target.chars().collect();
        guess
            .chars()
            .enumerate()
            .map(|(i, letter)| {
                if target.get(i) == Some(&letter) {
                    LetterOutcome::Correct
                } else if target.contains(&letter) {
                    LetterOutcome::Misplaced
                } else {
                    LetterOutcome::NotInWord
                }
            })
            .collect()
    }

    pub fn give_up(&mut self) {
        if self.status == PuzzleStatus::Ongoing {
            self.status = PuzzleStatus::GaveUp;
        }
    }

    /// Score the puzzle against the last full attempt and remember the result
    pub fn finish(&mut self, elapsed_seconds: f64) -> f64 {
        let last = self.attempts.last().map(String::as_str).unwrap_or("");
        let score = puzzle_score(
            &self.target,
            last,
            u32::try_from(self.attempts.len()).unwrap_or(u32::MAX),
            elapsed_seconds,
        );
        self.score = Some(score);
        score
    }

    /// The answer, once the puzzle is over
    pub fn reveal(&self) -> Option<&str> {
        matches!(self.status, PuzzleStatus::Solved | PuzzleStatus::GaveUp)
            .then_some(self.target.as_str())
    }
}
