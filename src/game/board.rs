use crate::types::{Category, ClueStatus, Coordinate, PointValues, RoundNumber, CLUES_PER_CATEGORY};
use serde::{Deserialize, Serialize};

/// The grid currently being played
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Board {
    pub round: RoundNumber,
    pub categories: Vec<Category>,
    pub point_values: PointValues,
    /// `status[category][clue]`
    pub status: Vec<Vec<ClueStatus>>,
    pub finished_categories: Vec<bool>,
}

impl Board {
    /// Build a board from the first `round_length` categories
    pub fn load_round(
        round: RoundNumber,
        categories: &[Category],
        round_length: usize,
        point_values: PointValues,
    ) -> Self {
        let categories: Vec<Category> = categories.iter().take(round_length).cloned().collect();
        let status: Vec<Vec<ClueStatus>> = categories
            .iter()
            .map(|category| {
                category
                    .clues
                    .iter()
                    .map(|clue| {
                        if clue.is_empty() {
                            ClueStatus::Empty
                        } else {
                            ClueStatus::Incomplete
                        }
                    })
                    .collect()
            })
            .collect();

        let mut board = Self {
            round,
            finished_categories: vec![false; categories.len()],
            categories,
            point_values,
            status,
        };
        // A category with nothing to play is finished from the start
        for i in 0..board.categories.len() {
            if !board.status[i].contains(&ClueStatus::Incomplete) {
                board.finished_categories[i] = true;
            }
        }
        board
    }

    pub fn status(&self, at: Coordinate) -> Option<ClueStatus> {
        self.status
            .get(at.category)
            .and_then(|row| row.get(at.clue))
            .copied()
    }

    pub fn is_playable(&self, at: Coordinate) -> bool {
        self.status(at) == Some(ClueStatus::Incomplete)
    }

    pub fn value_at(&self, at: Coordinate) -> Option<i64> {
        self.point_values.get(at.clue).copied()
    }

    /// Highest regular point value on this board
    pub fn top_value(&self) -> i64 {
        self.point_values.iter().copied().max().unwrap_or(0)
    }

    /// Mark a cell as played. Empty, unknown and already complete cells are left alone.
    pub fn mark_clue_selected(&mut self, at: Coordinate) {
        let Some(cell) = self
            .status
            .get_mut(at.category)
            .and_then(|row| row.get_mut(at.clue))
        else {
            tracing::warn!("Ignoring selection outside the board: {:?}", at);
            return;
        };
        if *cell != ClueStatus::Incomplete {
            return;
        }
        *cell = ClueStatus::Complete;

        let done = self
            .status
            .get(at.category)
            .is_some_and(|row| row.iter().all(|s| *s != ClueStatus::Incomplete));
        if let Some(finished) = self.finished_categories.get_mut(at.category) {
            *finished = done;
        }
    }

    /// Every per-category vector lines up and every row has five cells
    pub fn check_shape(&self) -> Result<(), String> {
        let n = self.categories.len();
        if self.status.len() != n || self.finished_categories.len() != n {
            return Err(format!(
                "Board has {} categories, {} status rows and {} finished flags",
                n,
                self.status.len(),
                self.finished_categories.len()
            ));
        }
        for (i, (row, category)) in self.status.iter().zip(&self.categories).enumerate() {
            if row.len() != CLUES_PER_CATEGORY
                || category.clues.len() != CLUES_PER_CATEGORY
                || category.responses.len() != CLUES_PER_CATEGORY
            {
                return Err(format!("Board category {} does not have {} clues", i, CLUES_PER_CATEGORY));
            }
        }
        Ok(())
    }

    pub fn is_round_done(&self) -> bool {
        self.finished_categories.iter().all(|done| *done)
    }

    pub fn category_is_empty(&self, category: usize) -> bool {
        self.categories.get(category).is_none_or(Category::is_empty)
    }

    pub fn remaining(&self) -> usize {
        self.status
            .iter()
            .flatten()
            .filter(|s| **s == ClueStatus::Incomplete)
            .count()
    }
}
