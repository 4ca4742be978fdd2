//! Daily double placement: one coordinate on the first board, two on the second.

use super::error::{GameError, GameResult};
use crate::types::{Category, Coordinate, RoundNumber, CLUES_PER_CATEGORY};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Upper bound on rejection-sampling draws per coordinate
pub const MAX_SAMPLING_ATTEMPTS: u32 = 10_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DailyDoubles {
    pub round_one: Option<Coordinate>,
    /// Never two coordinates in the same category
    pub round_two: [Option<Coordinate>; 2],
}

fn eligible(categories: &[Category], at: Coordinate) -> bool {
    categories
        .get(at.category)
        .is_some_and(|category| category.has_clue(at.clue))
}

fn sample<R, F>(rng: &mut R, round_length: usize, accept: F) -> GameResult<Coordinate>
where
    R: Rng + ?Sized,
    F: Fn(Coordinate) -> bool,
{
    if round_length == 0 {
        return Err(GameError::NoEligibleDailyDouble { attempts: 0 });
    }
    for _ in 0..MAX_SAMPLING_ATTEMPTS {
        let at = Coordinate::new(
            rng.random_range(0..round_length),
            rng.random_range(0..CLUES_PER_CATEGORY),
        );
        if accept(at) {
            return Ok(at);
        }
    }
    Err(GameError::NoEligibleDailyDouble {
        attempts: MAX_SAMPLING_ATTEMPTS,
    })
}

impl DailyDoubles {
    /// Pick fresh coordinates for `round`. On error nothing is changed.
    pub fn assign_random<R: Rng + ?Sized>(
        &mut self,
        round: RoundNumber,
        categories: &[Category],
        round_length: usize,
        rng: &mut R,
    ) -> GameResult<()> {
        let round_length = round_length.min(categories.len());
        match round {
            RoundNumber::One => {
                let at = sample(rng, round_length, |at| eligible(categories, at))?;
                self.round_one = Some(at);
            }
            RoundNumber::Two => {
                let first = sample(rng, round_length, |at| eligible(categories, at))?;
                let second = sample(rng, round_length, |at| {
                    at.category != first.category && eligible(categories, at)
                })?;
                self.round_two = [Some(first), Some(second)];
            }
        }
        tracing::info!("Assigned daily doubles for round {:?}: {:?}", round, self.coordinates(round));
        Ok(())
    }

    pub fn coordinates(&self, round: RoundNumber) -> Vec<Coordinate> {
        match round {
            RoundNumber::One => self.round_one.into_iter().collect(),
            RoundNumber::Two => self.round_two.iter().flatten().copied().collect(),
        }
    }

    pub fn is_daily_double(&self, round: RoundNumber, at: Coordinate) -> bool {
        self.coordinates(round).contains(&at)
    }

    pub fn clear(&mut self, round: RoundNumber) {
        match round {
            RoundNumber::One => self.round_one = None,
            RoundNumber::Two => self.round_two = [None, None],
        }
    }

    /// Every slot for the round is filled
    pub fn is_complete(&self, round: RoundNumber) -> bool {
        match round {
            RoundNumber::One => self.round_one.is_some(),
            RoundNumber::Two => self.round_two.iter().all(Option::is_some),
        }
    }

    /// Manual placement from the authoring grid.
    ///
    /// Clicking a placed coordinate removes it. Otherwise the coordinate takes
    /// a free slot, as long as it holds a clue and (on the second board) does
    /// not share a category with the other placed coordinate. Returns whether
    /// anything changed.
    pub fn toggle(&mut self, round: RoundNumber, at: Coordinate, categories: &[Category]) -> bool {
        match round {
            RoundNumber::One => {
                if self.round_one == Some(at) {
                    self.round_one = None;
                    return true;
                }
                if !eligible(categories, at) {
                    tracing::warn!("Ignoring daily double on empty clue {:?}", at);
                    return false;
                }
                self.round_one = Some(at);
                true
            }
            RoundNumber::Two => {
                if let Some(slot) = self.round_two.iter_mut().find(|slot| **slot == Some(at)) {
                    *slot = None;
                    return true;
                }
                if !eligible(categories, at) {
                    tracing::warn!("Ignoring daily double on empty clue {:?}", at);
                    return false;
                }
                let [a, b] = &mut self.round_two;
                let (slot, other) = match (a.is_none(), b.is_none()) {
                    (true, _) => (a, *b),
                    (false, true) => (b, *a),
                    (false, false) => {
                        tracing::warn!("Both round two daily doubles are already placed");
                        return false;
                    }
                };
                if other.is_some_and(|o| o.category == at.category) {
                    tracing::warn!(
                        "Ignoring second daily double in category {}",
                        at.category
                    );
                    return false;
                }
                *slot = Some(at);
                true
            }
        }
    }
}
