//! Running scores, per-step score history and roster bookkeeping.
//!
//! Teams are addressed by position for the duration of a call, but every
//! team also carries a stable ULID. Positions are recomputed whenever the
//! roster changes shape, so callers holding on to a team across calls
//! should keep its id and look the position up again with [`ScoreLedger::index_of`].

use crate::types::{GameId, GameRecord, SetId, Team, TeamId};
use serde::{Deserialize, Serialize};

/// Per-team answer state for the clue or final round in progress.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Staging {
    /// Raw wager text as entered for the final round
    pub wager: String,
    pub final_answer: String,
    /// Marked incorrect; undoing the mark adds the value back
    pub to_invert: bool,
    pub final_correct: bool,
    pub revealed: bool,
    /// Outcome currently applied for a daily double, if any
    pub daily_double: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    pub team: Team,
    /// Score after each completed step, starting with the score at reset
    pub history: Vec<i64>,
    pub staging: Staging,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScoreLedger {
    entries: Vec<LedgerEntry>,
    step: u32,
    solved: u32,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a ledger for a fresh play-through of `teams`
    pub fn with_teams(teams: impl IntoIterator<Item = Team>) -> Self {
        let mut ledger = Self::new();
        for team in teams {
            ledger.add_team(team);
        }
        ledger.reset_scores();
        ledger
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn solved(&self) -> u32 {
        self.solved
    }

    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.entries.iter().map(|e| &e.team)
    }

    pub fn team(&self, index: usize) -> Option<&Team> {
        self.entries.get(index).map(|e| &e.team)
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn index_of(&self, id: &TeamId) -> Option<usize> {
        self.entries.iter().position(|e| &e.team.id == id)
    }

    pub fn score(&self, index: usize) -> Option<i64> {
        self.team(index).map(|t| t.score)
    }

    pub fn history(&self, index: usize) -> Option<&[i64]> {
        self.entries.get(index).map(|e| e.history.as_slice())
    }

    /// Most recent committed snapshot, or 0 before anything was recorded
    pub fn last_snapshot(&self, index: usize) -> i64 {
        self.entries
            .get(index)
            .and_then(|e| e.history.last().copied())
            .unwrap_or(0)
    }

    pub fn staging(&self, index: usize) -> Option<&Staging> {
        self.entries.get(index).map(|e| &e.staging)
    }

    pub(crate) fn staging_mut(&mut self, index: usize) -> Option<&mut Staging> {
        self.entries.get_mut(index).map(|e| &mut e.staging)
    }

    // =========================================================================
    // Roster
    // =========================================================================

    /// Append a team and return its position
    pub fn add_team(&mut self, mut team: Team) -> usize {
        let index = self.entries.len();
        team.index = index;
        let history = vec![team.score; self.step as usize + 1];
        tracing::info!("Added team {} ({}) at index {}", team.name, team.id, index);
        self.entries.push(LedgerEntry {
            team,
            history,
            staging: Staging::default(),
        });
        index
    }

    /// Remove a team along with its history and staging, re-sequencing the rest
    pub fn remove_team(&mut self, index: usize) -> Option<Team> {
        if index >= self.entries.len() {
            tracing::warn!("Ignoring removal of unknown team index {}", index);
            return None;
        }
        let removed = self.entries.remove(index).team;
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.team.index = i;
        }
        tracing::info!("Removed team {} ({})", removed.name, removed.id);
        Some(removed)
    }

    pub fn rename_team(&mut self, index: usize, name: impl Into<String>) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.team.name = name.into();
        }
    }

    pub fn recolor_team(&mut self, index: usize, color: impl Into<String>) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.team.color = color.into();
        }
    }

    pub fn add_member(&mut self, index: usize, name: impl Into<String>) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.team.members.push_back(name.into());
        }
    }

    pub fn remove_member(&mut self, index: usize, name: &str) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.team.members.retain(|m| m != name);
        }
    }

    // =========================================================================
    // Scoring
    // =========================================================================

    /// Add a signed delta to a team's live score. Unknown indices are ignored.
    pub fn edit_score(&mut self, index: usize, delta: i64) {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.team.score += delta;
                tracing::debug!(
                    "Team {} score {:+} -> {}",
                    entry.team.name,
                    delta,
                    entry.team.score
                );
            }
            None => tracing::warn!("Ignoring score edit for unknown team index {}", index),
        }
    }

    /// Snapshot every score, rotate every spokesperson, advance the step counter
    pub fn increment_step(&mut self) {
        for entry in &mut self.entries {
            entry.history.push(entry.team.score);
            entry.team.rotate_members();
        }
        self.step += 1;
    }

    /// Put every score back to its last snapshot.
    ///
    /// Teams currently marked incorrect keep the `amount` deduction so that
    /// re-marking the clue starts from a consistent base.
    pub fn reset_to_last_increment(&mut self, amount: i64) {
        for entry in &mut self.entries {
            let mut score = entry.history.last().copied().unwrap_or(0);
            if entry.staging.to_invert {
                score -= amount;
            }
            entry.team.score = score;
        }
    }

    /// Zero all scores and start a fresh history
    pub fn reset_scores(&mut self) {
        for index in 0..self.entries.len() {
            let score = self.entries[index].team.score;
            self.edit_score(index, -score);
            let entry = &mut self.entries[index];
            entry.staging = Staging::default();
            entry.history = vec![0];
        }
        self.step = 0;
        self.solved = 0;
    }

    pub fn add_solved(&mut self) {
        self.solved += 1;
    }

    /// Drop every "marked incorrect" flag once a clue is finished
    pub fn clear_inversions(&mut self) {
        for entry in &mut self.entries {
            entry.staging.to_invert = false;
        }
    }

    /// Forget the per-clue daily double outcome for every team
    pub(crate) fn clear_daily_double_marks(&mut self) {
        for entry in &mut self.entries {
            entry.staging.daily_double = None;
        }
    }

    /// The team with the lowest live score, ties going to the lowest index
    pub fn lowest_scoring_team(&self) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .min_by_key(|(i, e)| (e.team.score, *i))
            .map(|(i, _)| i)
    }

    /// Summarize the play-through for the store
    pub fn record(&self, game_id: &GameId, set_id: &SetId) -> GameRecord {
        GameRecord {
            game_id: game_id.clone(),
            set_id: set_id.clone(),
            played_at: chrono::Utc::now().to_rfc3339(),
            steps: self.step,
            solved: self.solved,
            team_ids: self.entries.iter().map(|e| e.team.id.clone()).collect(),
            names: self
                .entries
                .iter()
                .map(|e| (e.team.id.clone(), e.team.name.clone()))
                .collect(),
            colors: self
                .entries
                .iter()
                .map(|e| (e.team.id.clone(), e.team.color.clone()))
                .collect(),
            history: self
                .entries
                .iter()
                .map(|e| (e.team.id.clone(), e.history.clone()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_of(names: &[&str]) -> ScoreLedger {
        ScoreLedger::with_teams(names.iter().map(|n| Team::new(*n, vec![], "red")))
    }

    #[test]
    fn test_edit_score_allows_negative() {
        let mut ledger = ledger_of(&["A", "B"]);
        ledger.edit_score(0, -400);
        ledger.edit_score(1, 200);
        assert_eq!(ledger.score(0), Some(-400));
        assert_eq!(ledger.score(1), Some(200));

        // Unknown index is a silent no-op
        ledger.edit_score(7, 100);
        assert_eq!(ledger.score(7), None);
    }

    #[test]
    fn test_reset_then_steps_history_length() {
        let mut ledger = ledger_of(&["A", "B", "C"]);
        ledger.edit_score(0, 600);
        ledger.increment_step();

        ledger.reset_scores();
        for n in 0..4 {
            ledger.edit_score(1, 200 * (n + 1));
            ledger.increment_step();
        }

        for i in 0..3 {
            assert_eq!(ledger.history(i).unwrap().len(), 5);
        }
        assert_eq!(ledger.history(1).unwrap(), &[0, 200, 600, 1200, 2000]);
        assert_eq!(ledger.history(0).unwrap(), &[0, 0, 0, 0, 0]);
        assert_eq!(ledger.step(), 4);
    }

    #[test]
    fn test_reset_scores_clears_staging() {
        let mut ledger = ledger_of(&["A"]);
        ledger.edit_score(0, 1000);
        ledger.add_solved();
        {
            let staging = ledger.staging_mut(0).unwrap();
            staging.wager = "500".to_string();
            staging.to_invert = true;
            staging.final_answer = "What is Ghana?".to_string();
        }

        ledger.reset_scores();

        assert_eq!(ledger.score(0), Some(0));
        assert_eq!(ledger.staging(0), Some(&Staging::default()));
        assert_eq!(ledger.solved(), 0);
        assert_eq!(ledger.step(), 0);
    }

    #[test]
    fn test_increment_step_rotates_spokesperson() {
        let mut ledger = ScoreLedger::with_teams([Team::new(
            "Team",
            vec!["Ada".to_string(), "Brian".to_string()],
            "green",
        )]);
        assert_eq!(ledger.team(0).unwrap().spokesperson(), Some("Ada"));
        ledger.increment_step();
        assert_eq!(ledger.team(0).unwrap().spokesperson(), Some("Brian"));
        ledger.increment_step();
        assert_eq!(ledger.team(0).unwrap().spokesperson(), Some("Ada"));
    }

    #[test]
    fn test_reset_to_last_increment_keeps_inversions() {
        let mut ledger = ledger_of(&["A", "B"]);
        ledger.edit_score(0, 400);
        ledger.edit_score(1, 400);
        ledger.increment_step();

        // Both answered the next clue: A credited, B marked wrong
        ledger.edit_score(0, 600);
        ledger.edit_score(1, -600);
        ledger.staging_mut(1).unwrap().to_invert = true;

        ledger.reset_to_last_increment(600);
        assert_eq!(ledger.score(0), Some(400));
        assert_eq!(ledger.score(1), Some(-200));
    }

    #[test]
    fn test_remove_team_resequences() {
        let mut ledger = ledger_of(&["A", "B", "C"]);
        let c_id = ledger.team(2).unwrap().id.clone();

        let removed = ledger.remove_team(1).unwrap();
        assert_eq!(removed.name, "B");
        assert_eq!(ledger.len(), 2);
        let indices: Vec<usize> = ledger.teams().map(|t| t.index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(ledger.index_of(&c_id), Some(1));
        assert!(ledger.remove_team(5).is_none());
    }

    #[test]
    fn test_late_team_history_is_padded() {
        let mut ledger = ledger_of(&["A"]);
        ledger.increment_step();
        ledger.increment_step();

        let index = ledger.add_team(Team::new("Late", vec![], "pink"));
        assert_eq!(ledger.history(index).unwrap(), &[0, 0, 0]);
        assert_eq!(ledger.history(0).unwrap().len(), 3);
    }

    #[test]
    fn test_lowest_scoring_team_breaks_ties_by_index() {
        let mut ledger = ledger_of(&["A", "B", "C"]);
        ledger.edit_score(0, 800);
        assert_eq!(ledger.lowest_scoring_team(), Some(1));

        ledger.edit_score(2, -200);
        assert_eq!(ledger.lowest_scoring_team(), Some(2));

        assert_eq!(ScoreLedger::new().lowest_scoring_team(), None);
    }

    #[test]
    fn test_record_maps_by_team_id() {
        let mut ledger = ledger_of(&["A", "B"]);
        ledger.edit_score(1, 200);
        ledger.add_solved();
        ledger.increment_step();

        let record = ledger.record(&"game".to_string(), &"set".to_string());
        assert_eq!(record.steps, 1);
        assert_eq!(record.solved, 1);
        let b_id = ledger.team(1).unwrap().id.clone();
        assert_eq!(record.names[&b_id], "B");
        assert_eq!(record.history[&b_id], vec![0, 200]);
    }
}
