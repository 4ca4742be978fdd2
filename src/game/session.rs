//! One play-through of a loaded set.

use super::board::Board;
use super::daily_double::DailyDoubles;
use super::error::{GameError, GameResult};
use super::ledger::ScoreLedger;
use super::progression::FinalRoundStage;
use super::set::TriviaSet;
use super::wager::Placing;
use crate::types::{
    ClueStatus, Coordinate, GameId, GamePhase, GameRecord, PointValues, RoundNumber, SetDocument,
    SetId, Team, TeamId,
};
use serde::{Deserialize, Serialize};

/// The clue currently on screen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActiveClue {
    pub round: RoundNumber,
    pub at: Coordinate,
    pub category: String,
    pub clue: String,
    pub response: String,
    pub value: i64,
    pub is_daily_double: bool,
    /// Nobody got this one when it first aired
    pub is_triple_stumper: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// Team in control when the clue was opened
    pub default_team: Option<TeamId>,
    pub correct_team: Option<TeamId>,
    /// Daily double wager, once made
    pub wager: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamStanding {
    pub id: TeamId,
    pub index: usize,
    pub name: String,
    pub color: String,
    pub score: i64,
    pub spokesperson: Option<String>,
    pub has_lock: bool,
}

/// Read-only view of the session for display and persistence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSnapshot {
    pub game_id: GameId,
    pub set_id: SetId,
    pub title: String,
    pub phase: GamePhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_stage: Option<FinalRoundStage>,
    pub categories: Vec<String>,
    pub point_values: PointValues,
    pub status: Vec<Vec<ClueStatus>>,
    pub finished_categories: Vec<bool>,
    pub daily_doubles: Vec<Coordinate>,
    pub teams: Vec<TeamStanding>,
    pub selected_team: Option<TeamId>,
    pub active_clue: Option<ActiveClue>,
    pub step: u32,
    pub solved: u32,
    pub round_done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_clue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_response: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub podium: Vec<(Placing, TeamId)>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSession {
    pub id: GameId,
    set: TriviaSet,
    phase: GamePhase,
    board: Board,
    ledger: ScoreLedger,
    daily_doubles: DailyDoubles,
    active: Option<ActiveClue>,
    /// Team choosing the next clue
    selected_team: Option<TeamId>,
    final_stage: FinalRoundStage,
    pub started_at: String,
}

impl GameSession {
    /// Start a game on a validated set with a fresh ledger
    pub fn load(set: TriviaSet, teams: Vec<Team>) -> Self {
        let board = Board::load_round(
            RoundNumber::One,
            &set.round1,
            set.round1_len,
            set.point_scales.round_one,
        );
        let ledger = ScoreLedger::with_teams(teams);
        let selected_team = ledger.team(0).map(|t| t.id.clone());
        let session = Self {
            id: ulid::Ulid::new().to_string(),
            daily_doubles: set.daily_doubles.clone(),
            set,
            phase: GamePhase::Round1,
            board,
            ledger,
            active: None,
            selected_team,
            final_stage: FinalRoundStage::default(),
            started_at: chrono::Utc::now().to_rfc3339(),
        };
        tracing::info!(
            "Loaded set {} into game {} with {} teams",
            session.set.id,
            session.id,
            session.ledger.len()
        );
        session
    }

    /// Validate a stored document and start a game on it. Nothing is created on error.
    pub fn load_set(doc: &SetDocument, teams: Vec<Team>) -> GameResult<Self> {
        let set = TriviaSet::from_document(doc)?;
        Ok(Self::load(set, teams))
    }

    pub fn set(&self) -> &TriviaSet {
        &self.set
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut ScoreLedger {
        &mut self.ledger
    }

    pub fn daily_doubles(&self) -> &DailyDoubles {
        &self.daily_doubles
    }

    pub fn active_clue(&self) -> Option<&ActiveClue> {
        self.active.as_ref()
    }

    pub fn final_stage(&self) -> Option<FinalRoundStage> {
        (self.phase == GamePhase::FinalRound).then_some(self.final_stage)
    }

    pub fn selected_team(&self) -> Option<usize> {
        self.selected_team
            .as_ref()
            .and_then(|id| self.ledger.index_of(id))
    }

    fn team_id(&self, index: usize) -> Option<TeamId> {
        self.ledger.team(index).map(|t| t.id.clone())
    }

    /// Hand control to a team. Unknown indices are ignored.
    pub fn select_team(&mut self, index: usize) {
        if let Some(id) = self.team_id(index) {
            self.selected_team = Some(id);
        }
    }

    pub fn edit_score(&mut self, index: usize, delta: i64) {
        self.ledger.edit_score(index, delta);
    }

    /// Remove a team mid-game; control passes to the first team if it had it
    pub fn remove_team(&mut self, index: usize) -> Option<Team> {
        let removed = self.ledger.remove_team(index)?;
        if self.selected_team.as_ref() == Some(&removed.id) {
            self.selected_team = self.team_id(0);
        }
        if let Some(active) = self.active.as_mut() {
            if active.correct_team.as_ref() == Some(&removed.id) {
                active.correct_team = None;
            }
        }
        Some(removed)
    }

    /// Re-roll the daily doubles of the board in play
    pub fn assign_random_daily_doubles<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) -> GameResult<()> {
        let round = self
            .phase
            .round()
            .ok_or_else(|| GameError::illegal("no board in the final round"))?;
        self.daily_doubles.assign_random(
            round,
            self.set.categories(round),
            self.set.round_length(round),
            rng,
        )
    }

    // =========================================================================
    // Clue flow
    // =========================================================================

    pub fn open_clue(&mut self, at: Coordinate) -> GameResult<&ActiveClue> {
        let round = self
            .phase
            .round()
            .ok_or_else(|| GameError::illegal("no board in the final round"))?;
        if self.active.is_some() {
            return Err(GameError::illegal("another clue is still open"));
        }
        if !self.board.is_playable(at) {
            return Err(GameError::illegal(format!("clue {:?} is not playable", at)));
        }
        let Some(category) = self.board.categories.get(at.category) else {
            return Err(GameError::illegal(format!("no category at {:?}", at)));
        };
        let value = self.board.value_at(at).unwrap_or(0);
        let is_daily_double = self.daily_doubles.is_daily_double(round, at);

        tracing::info!(
            "Opened {} for {}{}",
            category.name,
            value,
            if is_daily_double { " (daily double)" } else { "" }
        );
        let clue = ActiveClue {
            round,
            at,
            category: category.name.clone(),
            clue: category.clues.get(at.clue).cloned().unwrap_or_default(),
            response: category.responses.get(at.clue).cloned().unwrap_or_default(),
            value,
            is_daily_double,
            is_triple_stumper: self.set.is_triple_stumper(round, at),
            image_url: category.image_urls.get(&at.clue).cloned(),
            audio_url: category.audio_urls.get(&at.clue).cloned(),
            default_team: self.selected_team.clone(),
            correct_team: None,
            wager: None,
        };
        let clue: &ActiveClue = self.active.insert(clue);
        Ok(clue)
    }

    fn regular_clue(&self) -> GameResult<&ActiveClue> {
        match &self.active {
            None => Err(GameError::illegal("no clue is open")),
            Some(active) if active.is_daily_double => {
                Err(GameError::illegal("daily doubles are scored by wager"))
            }
            Some(active) => Ok(active),
        }
    }

    /// Credit a team for the open clue, or take the credit back if it already had it.
    ///
    /// Only one team can be correct: every score first goes back to the last
    /// snapshot, standing incorrect marks included.
    pub fn mark_correct(&mut self, index: usize) -> GameResult<()> {
        let active = self.regular_clue()?;
        let value = active.value;
        let already_correct = active.correct_team.clone();
        let default_team = active.default_team.clone();
        let Some(id) = self.team_id(index) else {
            tracing::warn!("Ignoring mark for unknown team index {}", index);
            return Ok(());
        };

        self.ledger.reset_to_last_increment(value);
        let was_inverted = self
            .ledger
            .staging_mut(index)
            .is_some_and(|s| std::mem::take(&mut s.to_invert));
        if was_inverted {
            self.ledger.edit_score(index, value);
        }

        let correct_team = if already_correct.as_ref() == Some(&id) {
            self.selected_team = default_team;
            None
        } else {
            self.ledger.edit_score(index, value);
            self.selected_team = Some(id.clone());
            Some(id)
        };
        if let Some(active) = self.active.as_mut() {
            active.correct_team = correct_team;
        }
        Ok(())
    }

    /// Toggle a team's incorrect mark on the open clue
    pub fn mark_incorrect(&mut self, index: usize) -> GameResult<()> {
        let active = self.regular_clue()?;
        let value = active.value;
        let Some(id) = self.team_id(index) else {
            tracing::warn!("Ignoring mark for unknown team index {}", index);
            return Ok(());
        };
        let was_correct = active.correct_team.as_ref() == Some(&id);

        if was_correct {
            self.ledger.edit_score(index, -value);
            if let Some(active) = self.active.as_mut() {
                active.correct_team = None;
                self.selected_team = active.default_team.clone();
            }
        }
        let inverted = match self.ledger.staging_mut(index) {
            Some(staging) => {
                staging.to_invert = !staging.to_invert;
                staging.to_invert
            }
            None => return Ok(()),
        };
        self.ledger
            .edit_score(index, if inverted { -value } else { value });
        Ok(())
    }

    /// Wager cap for the team holding a daily double
    pub fn daily_double_limit(&self) -> Option<i64> {
        let index = self.selected_team()?;
        Some(self.ledger.daily_double_limit(index, self.board.top_value()))
    }

    /// Fix the wager on an open daily double, before any result is applied
    pub fn set_daily_double_wager(&mut self, wager: i64) -> GameResult<()> {
        let Some(active) = self.active.as_ref().filter(|a| a.is_daily_double) else {
            return Err(GameError::illegal("no daily double is open"));
        };
        let index = self
            .selected_team()
            .ok_or_else(|| GameError::illegal("no team holds the daily double"))?;
        if active.wager.is_some()
            && self
                .ledger
                .staging(index)
                .is_some_and(|s| s.daily_double.is_some())
        {
            return Err(GameError::illegal(
                "clear the daily double result before changing the wager",
            ));
        }
        self.ledger
            .validate_daily_double_wager(index, wager, self.board.top_value())?;
        if let Some(active) = self.active.as_mut() {
            active.wager = Some(wager);
        }
        tracing::debug!("Daily double wager {} for team index {}", wager, index);
        Ok(())
    }

    /// Apply or toggle the daily double result for the team holding it
    pub fn mark_daily_double(&mut self, correct: bool) -> GameResult<()> {
        let Some(active) = self.active.as_ref().filter(|a| a.is_daily_double) else {
            return Err(GameError::illegal("no daily double is open"));
        };
        let wager = active
            .wager
            .ok_or_else(|| GameError::illegal("no wager has been made"))?;
        let index = self
            .selected_team()
            .ok_or_else(|| GameError::illegal("no team holds the daily double"))?;

        self.ledger.apply_daily_double_result(index, wager, correct);
        let credited = self
            .ledger
            .staging(index)
            .and_then(|s| s.daily_double)
            .unwrap_or(false);
        let id = self.team_id(index);
        if let Some(active) = self.active.as_mut() {
            active.correct_team = if credited { id } else { None };
        }
        Ok(())
    }

    /// Close the open clue and commit the step.
    ///
    /// Returns the new phase when this clue finished the round.
    pub fn resolve_clue(&mut self) -> GameResult<Option<GamePhase>> {
        let active = self
            .active
            .take()
            .ok_or_else(|| GameError::illegal("no clue is open"))?;

        self.board.mark_clue_selected(active.at);
        if let Some(id) = &active.correct_team {
            if self.ledger.index_of(id).is_some() {
                self.ledger.add_solved();
                self.selected_team = Some(id.clone());
            }
        }
        self.ledger.increment_step();
        self.ledger.clear_inversions();
        self.ledger.clear_daily_double_marks();

        if self.is_round_done() {
            return self.advance_phase().map(Some);
        }
        Ok(None)
    }

    pub fn is_round_done(&self) -> bool {
        self.phase != GamePhase::FinalRound && self.board.is_round_done()
    }

    /// Move to the next phase once the current board is cleared.
    ///
    /// The trailing team takes control of the next round.
    pub fn advance_phase(&mut self) -> GameResult<GamePhase> {
        if self.active.is_some() {
            return Err(GameError::illegal("a clue is still open"));
        }
        if !self.is_round_done() {
            return Err(GameError::illegal(format!(
                "{:?} still has {} clues left",
                self.phase,
                self.board.remaining()
            )));
        }
        let next = self
            .phase
            .next(self.set.has_two_rounds)
            .ok_or_else(|| GameError::illegal("the final round is the last phase"))?;

        if next == GamePhase::Round2 {
            self.board = Board::load_round(
                RoundNumber::Two,
                &self.set.round2,
                self.set.round2_len,
                self.set.point_scales.round_two,
            );
        }
        if next == GamePhase::FinalRound {
            self.final_stage = FinalRoundStage::MakeWager;
        }
        self.phase = next;
        if let Some(index) = self.ledger.lowest_scoring_team() {
            self.select_team(index);
        }
        tracing::info!("Game {} advanced to {:?}", self.id, next);
        Ok(next)
    }

    // =========================================================================
    // Final round
    // =========================================================================

    fn require_final_stage(&self, stage: FinalRoundStage) -> GameResult<()> {
        if self.final_stage() != Some(stage) {
            return Err(GameError::illegal(format!("not at the {:?} stage", stage)));
        }
        Ok(())
    }

    pub fn set_final_wager(&mut self, index: usize, text: &str) -> GameResult<()> {
        self.require_final_stage(FinalRoundStage::MakeWager)?;
        self.ledger.set_wager(index, text);
        Ok(())
    }

    pub fn submit_final_answer(&mut self, index: usize, answer: &str) -> GameResult<()> {
        self.require_final_stage(FinalRoundStage::SubmitAnswer)?;
        self.ledger.set_final_answer(index, answer);
        Ok(())
    }

    pub fn apply_final_result(&mut self, index: usize, correct: bool) -> GameResult<()> {
        self.require_final_stage(FinalRoundStage::RevealResponse)?;
        self.ledger.apply_final_round_result(index, correct);
        Ok(())
    }

    /// Step through the final round. Wagers must all validate before answers open.
    pub fn advance_final_stage(&mut self) -> GameResult<FinalRoundStage> {
        let stage = self
            .final_stage()
            .ok_or_else(|| GameError::illegal("the final round has not started"))?;
        if stage == FinalRoundStage::MakeWager {
            self.ledger.wagers_valid()?;
        }
        let next = stage
            .next()
            .ok_or_else(|| GameError::illegal("the game is already over"))?;
        if next == FinalRoundStage::Podium {
            // Final results become part of the history
            self.ledger.increment_step();
        }
        self.final_stage = next;
        tracing::info!("Game {} final round stage {:?}", self.id, next);
        Ok(next)
    }

    pub fn is_finished(&self) -> bool {
        self.final_stage() == Some(FinalRoundStage::Podium)
    }

    pub fn team_has_lock(&self, index: usize) -> bool {
        self.ledger.team_has_lock(index)
    }

    pub fn podium(&self) -> Vec<(Placing, TeamId)> {
        self.ledger
            .podium()
            .into_iter()
            .filter_map(|(placing, i)| self.team_id(i).map(|id| (placing, id)))
            .collect()
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn snapshot(&self) -> GameSnapshot {
        let stage = self.final_stage();
        let past = |s: FinalRoundStage| stage.is_some_and(|current| current >= s);
        let teams = self
            .ledger
            .teams()
            .map(|team| TeamStanding {
                id: team.id.clone(),
                index: team.index,
                name: team.name.clone(),
                color: team.color.clone(),
                score: team.score,
                spokesperson: team.spokesperson().map(str::to_string),
                has_lock: self.ledger.team_has_lock(team.index),
            })
            .collect();

        GameSnapshot {
            game_id: self.id.clone(),
            set_id: self.set.id.clone(),
            title: self.set.title.clone(),
            phase: self.phase,
            final_stage: stage,
            categories: self.board.categories.iter().map(|c| c.name.clone()).collect(),
            point_values: self.board.point_values,
            status: self.board.status.clone(),
            finished_categories: self.board.finished_categories.clone(),
            daily_doubles: self
                .phase
                .round()
                .map(|r| self.daily_doubles.coordinates(r))
                .unwrap_or_default(),
            teams,
            selected_team: self.selected_team.clone(),
            active_clue: self.active.clone(),
            step: self.ledger.step(),
            solved: self.ledger.solved(),
            round_done: self.is_round_done(),
            final_category: stage.map(|_| self.set.final_round.category.clone()),
            final_clue: past(FinalRoundStage::SubmitAnswer).then(|| self.set.final_round.clue.clone()),
            final_response: past(FinalRoundStage::RevealResponse)
                .then(|| self.set.final_round.response.clone()),
            podium: if self.is_finished() {
                self.podium()
            } else {
                Vec::new()
            },
        }
    }

    pub fn record(&self) -> GameRecord {
        self.ledger.record(&self.id, &self.set.id)
    }

    /// Structural checks for a session that arrived as JSON rather than
    /// through `load`
    pub fn check_shape(&self) -> Result<(), String> {
        self.board.check_shape()?;
        for (i, team) in self.ledger.teams().enumerate() {
            if team.index != i {
                return Err(format!(
                    "Team '{}' has index {} but sits at position {}",
                    team.id, team.index, i
                ));
            }
            let history = self.ledger.history(i).map_or(0, <[i64]>::len);
            if history != self.ledger.step() as usize + 1 {
                return Err(format!(
                    "Team '{}' has {} score snapshots, expected {}",
                    team.id,
                    history,
                    self.ledger.step() + 1
                ));
            }
        }
        if let Some(active) = &self.active {
            if !self.board.is_playable(active.at) {
                return Err(format!("Open clue {:?} is not playable on the board", active.at));
            }
        }
        Ok(())
    }
}
