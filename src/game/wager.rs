//! Wagers, daily double and final-round scoring, lock detection and placements.

use super::error::{GameError, GameResult, WagerRejection};
use super::ledger::ScoreLedger;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Placing {
    First,
    Second,
    Third,
}

impl Placing {
    fn rank(self) -> usize {
        match self {
            Placing::First => 0,
            Placing::Second => 1,
            Placing::Third => 2,
        }
    }
}

fn parse_wager(text: &str) -> Result<i64, WagerRejection> {
    let wager: i64 = text
        .trim()
        .parse()
        .map_err(|_| WagerRejection::NotANumber)?;
    if wager < 0 {
        return Err(WagerRejection::Negative);
    }
    Ok(wager)
}

impl ScoreLedger {
    // =========================================================================
    // Final round wagers
    // =========================================================================

    /// A team at or below zero may wager anything (it is ignored); otherwise
    /// the text must be a whole number between 0 and the team's score.
    pub fn validate_wager(&self, index: usize, text: &str) -> GameResult<()> {
        let Some(score) = self.score(index) else {
            return Ok(());
        };
        if score <= 0 {
            return Ok(());
        }
        let wager = parse_wager(text).map_err(|reason| GameError::InvalidWager {
            team: index,
            reason,
        })?;
        if wager > score {
            return Err(GameError::InvalidWager {
                team: index,
                reason: WagerRejection::ExceedsLimit {
                    wager,
                    limit: score,
                },
            });
        }
        Ok(())
    }

    /// Every staged final-round wager validates
    pub fn wagers_valid(&self) -> GameResult<()> {
        for (index, entry) in self.entries().iter().enumerate() {
            self.validate_wager(index, &entry.staging.wager)?;
        }
        Ok(())
    }

    pub fn set_wager(&mut self, index: usize, text: impl Into<String>) {
        if let Some(staging) = self.staging_mut(index) {
            staging.wager = text.into();
        }
    }

    pub fn set_final_answer(&mut self, index: usize, answer: impl Into<String>) {
        if let Some(staging) = self.staging_mut(index) {
            staging.final_answer = answer.into();
        }
    }

    /// Points riding on a team's final-round answer.
    ///
    /// Judged against the score entering the final round, so applying results
    /// never changes the amount. Teams that entered at or below zero risk nothing.
    pub fn final_wager_amount(&self, index: usize) -> i64 {
        if self.last_snapshot(index) <= 0 {
            return 0;
        }
        self.staging(index)
            .and_then(|s| parse_wager(&s.wager).ok())
            .unwrap_or(0)
    }

    /// Toggle a team's final-round result.
    ///
    /// Applying the same result twice restores the score; switching results
    /// first reverses the earlier one.
    pub fn apply_final_round_result(&mut self, index: usize, correct: bool) {
        let amount = self.final_wager_amount(index);
        let Some(staging) = self.staging_mut(index) else {
            tracing::warn!("Ignoring final result for unknown team index {}", index);
            return;
        };
        staging.revealed = true;

        // `final_correct` tracks a credited answer, `to_invert` a deducted one
        let (same, opposite) = if correct {
            (staging.final_correct, staging.to_invert)
        } else {
            (staging.to_invert, staging.final_correct)
        };
        let sign = if correct { 1 } else { -1 };
        let mut delta = 0;
        if opposite {
            delta += sign * amount;
        }
        if same {
            delta -= sign * amount;
        } else {
            delta += sign * amount;
        }
        if correct {
            staging.final_correct = !same;
            staging.to_invert = false;
        } else {
            staging.to_invert = !same;
            staging.final_correct = false;
        }
        self.edit_score(index, delta);
    }

    // =========================================================================
    // Daily doubles
    // =========================================================================

    /// Largest allowed daily double wager: the team's score or the board's top value
    pub fn daily_double_limit(&self, index: usize, top_value: i64) -> i64 {
        self.score(index).unwrap_or(0).max(top_value)
    }

    pub fn validate_daily_double_wager(
        &self,
        index: usize,
        wager: i64,
        top_value: i64,
    ) -> GameResult<()> {
        let limit = self.daily_double_limit(index, top_value);
        let reason = if wager < 0 {
            WagerRejection::Negative
        } else if wager > limit {
            WagerRejection::ExceedsLimit { wager, limit }
        } else {
            return Ok(());
        };
        Err(GameError::InvalidWager {
            team: index,
            reason,
        })
    }

    /// Apply or toggle the result of a daily double.
    ///
    /// Marks are applied as signed deltas, so marking the same result twice
    /// nets to zero and switching results reverses the first before applying
    /// the second.
    pub fn apply_daily_double_result(&mut self, index: usize, wager: i64, correct: bool) {
        let signed = |c: bool| if c { wager } else { -wager };
        let Some(staging) = self.staging_mut(index) else {
            tracing::warn!("Ignoring daily double result for unknown team index {}", index);
            return;
        };
        let (delta, mark) = match staging.daily_double {
            None => (signed(correct), Some(correct)),
            Some(prev) if prev == correct => (-signed(prev), None),
            Some(prev) => (signed(correct) - signed(prev), Some(correct)),
        };
        staging.daily_double = mark;
        self.edit_score(index, delta);
    }

    // =========================================================================
    // Standings
    // =========================================================================

    /// Whether a team's lead cannot be caught in the final round.
    ///
    /// Uses the last committed snapshot so uncommitted wagers don't count.
    pub fn team_has_lock(&self, index: usize) -> bool {
        if self.len() < 2 {
            return true;
        }
        if index >= self.len() {
            return false;
        }
        let mine = self.last_snapshot(index);
        let mut best_other = i64::MIN;
        for other in (0..self.len()).filter(|i| *i != index) {
            best_other = best_other.max(self.last_snapshot(other));
        }
        mine > best_other && mine > best_other.saturating_mul(2)
    }

    /// Team indices ordered by live score, highest first, ties by index
    pub fn standings(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by_key(|i| (std::cmp::Reverse(self.score(*i).unwrap_or(0)), *i));
        order
    }

    /// `None` when the roster is too small for the requested place
    pub fn get_placement(&self, placing: Placing) -> Option<usize> {
        self.standings().get(placing.rank()).copied()
    }

    /// First, second and third place, as far as the roster goes
    pub fn podium(&self) -> Vec<(Placing, usize)> {
        [Placing::First, Placing::Second, Placing::Third]
            .into_iter()
            .filter_map(|p| self.get_placement(p).map(|i| (p, i)))
            .collect()
    }
}
