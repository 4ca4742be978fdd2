//! Live-game operations on the shared session.
//!
//! Each mutation runs the core synchronously under the write lock, then
//! broadcasts the new snapshot and hands a copy to the store without waiting.

use super::{AppState, StateError, StateResult};
use crate::game::{FinalRoundStage, GameSession, GameSnapshot};
use crate::protocol::ServerMessage;
use crate::types::{Coordinate, GamePhase, SetSummary, Team, TeamId};
use std::sync::atomic::Ordering;

fn team_index(session: &GameSession, id: &TeamId) -> StateResult<usize> {
    session
        .ledger()
        .index_of(id)
        .ok_or_else(|| StateError::UnknownTeam(id.clone()))
}

impl AppState {
    pub async fn get_snapshot(&self) -> Option<GameSnapshot> {
        self.session.read().await.as_ref().map(GameSession::snapshot)
    }

    pub async fn get_roster(&self) -> Vec<Team> {
        self.roster.read().await.clone()
    }

    pub async fn list_sets(&self) -> StateResult<Vec<SetSummary>> {
        Ok(self.store.list_sets().await?)
    }

    /// Run `f` against the live session, then publish the result
    async fn with_session<T>(
        &self,
        f: impl FnOnce(&mut GameSession) -> StateResult<T>,
    ) -> StateResult<(T, GameSnapshot)> {
        let (value, snapshot, saved, revision, reached_podium) = {
            let mut guard = self.session.write().await;
            let session = guard.as_mut().ok_or(StateError::NoActiveGame)?;
            let was_finished = session.is_finished();
            let value = f(session)?;
            let reached_podium = !was_finished && session.is_finished();
            (
                value,
                session.snapshot(),
                session.clone(),
                self.next_revision(),
                reached_podium,
            )
        };
        self.publish(revision, snapshot.clone(), saved, reached_podium);
        Ok((value, snapshot))
    }

    /// Stamp a session change. Call with the session write lock held so
    /// revisions follow the order of the changes.
    pub(super) fn next_revision(&self) -> u64 {
        self.revision.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn publish(&self, revision: u64, snapshot: GameSnapshot, session: GameSession, record_game: bool) {
        self.broadcast_to_all(ServerMessage::GameState {
            snapshot: Box::new(snapshot),
        });
        self.persist(revision, session, record_game);
    }

    /// Fire-and-forget write of the session.
    ///
    /// Writers queue on `persisted`; a snapshot older than the one already
    /// written is dropped. The game record is only written on reaching the podium.
    pub(super) fn persist(&self, revision: u64, session: GameSession, record_game: bool) {
        let store = self.store.clone();
        let persisted = self.persisted.clone();
        tokio::spawn(async move {
            {
                let mut last = persisted.lock().await;
                if *last < revision {
                    match store.save_snapshot(&session).await {
                        Ok(()) => *last = revision,
                        Err(e) => {
                            tracing::error!("Failed to save snapshot of game {}: {}", session.id, e)
                        }
                    }
                } else {
                    tracing::trace!("Skipping stale snapshot revision {}", revision);
                }
            }
            if record_game {
                match store.save_game(&session.record()).await {
                    Ok(()) => tracing::info!("Recorded finished game {}", session.id),
                    Err(e) => tracing::error!("Failed to record game {}: {}", session.id, e),
                }
            }
        });
    }

    // =========================================================================
    // Lobby roster
    // =========================================================================

    /// Apply a roster change to the lobby and, when a game runs, to its ledger too
    async fn edit_roster(
        &self,
        id: &TeamId,
        lobby: impl FnOnce(&mut Team),
        live: impl FnOnce(&mut GameSession, usize),
    ) -> StateResult<Vec<Team>> {
        let teams = {
            let mut roster = self.roster.write().await;
            let team = roster
                .iter_mut()
                .find(|t| &t.id == id)
                .ok_or_else(|| StateError::UnknownTeam(id.clone()))?;
            lobby(team);
            roster.clone()
        };
        if self.session.read().await.is_some() {
            self.with_session(|s| {
                let index = team_index(s, id)?;
                live(s, index);
                Ok(())
            })
            .await?;
        }
        self.broadcast_to_all(ServerMessage::Roster {
            teams: teams.clone(),
        });
        Ok(teams)
    }

    pub async fn add_team(
        &self,
        name: String,
        members: Vec<String>,
        color: String,
    ) -> StateResult<Team> {
        let team = Team::new(name, members, color);
        let teams = {
            let mut roster = self.roster.write().await;
            let mut added = team.clone();
            added.index = roster.len();
            roster.push(added);
            roster.clone()
        };
        if self.session.read().await.is_some() {
            let joining = team.clone();
            self.with_session(move |s| {
                s.ledger_mut().add_team(joining);
                Ok(())
            })
            .await?;
        }
        tracing::info!("Team {} ({}) joined", team.name, team.id);
        self.broadcast_to_all(ServerMessage::Roster { teams });
        Ok(team)
    }

    pub async fn remove_team(&self, id: &TeamId) -> StateResult<Vec<Team>> {
        let teams = {
            let mut roster = self.roster.write().await;
            let before = roster.len();
            roster.retain(|t| &t.id != id);
            if roster.len() == before {
                return Err(StateError::UnknownTeam(id.clone()));
            }
            for (i, team) in roster.iter_mut().enumerate() {
                team.index = i;
            }
            roster.clone()
        };
        if self.session.read().await.is_some() {
            self.with_session(|s| {
                if let Some(index) = s.ledger().index_of(id) {
                    s.remove_team(index);
                }
                Ok(())
            })
            .await?;
        }
        tracing::info!("Team {} left", id);
        self.broadcast_to_all(ServerMessage::Roster {
            teams: teams.clone(),
        });
        Ok(teams)
    }

    pub async fn rename_team(&self, id: &TeamId, name: String) -> StateResult<Vec<Team>> {
        let live_name = name.clone();
        self.edit_roster(
            id,
            |t| t.name = name,
            |s, i| s.ledger_mut().rename_team(i, live_name),
        )
        .await
    }

    pub async fn recolor_team(&self, id: &TeamId, color: String) -> StateResult<Vec<Team>> {
        let live_color = color.clone();
        self.edit_roster(
            id,
            |t| t.color = color,
            |s, i| s.ledger_mut().recolor_team(i, live_color),
        )
        .await
    }

    pub async fn add_member(&self, id: &TeamId, member: String) -> StateResult<Vec<Team>> {
        let live_member = member.clone();
        self.edit_roster(
            id,
            |t| t.members.push_back(member),
            |s, i| s.ledger_mut().add_member(i, live_member),
        )
        .await
    }

    pub async fn remove_member(&self, id: &TeamId, member: String) -> StateResult<Vec<Team>> {
        self.edit_roster(
            id,
            |t| t.members.retain(|m| m != &member),
            |s, i| s.ledger_mut().remove_member(i, &member),
        )
        .await
    }

    // =========================================================================
    // Game lifecycle
    // =========================================================================

    /// Start a fresh game on a stored set with the lobby roster
    pub async fn load_set(&self, set_id: &str) -> StateResult<GameSnapshot> {
        let doc = self.store.load_set(set_id).await?;
        let teams = self.get_roster().await;
        let session = GameSession::load_set(&doc, teams)?;
        let snapshot = session.snapshot();
        let revision = {
            let mut guard = self.session.write().await;
            *guard = Some(session.clone());
            self.next_revision()
        };
        self.publish(revision, snapshot.clone(), session, false);
        Ok(snapshot)
    }

    /// Replay the current set from the top with the lobby roster
    pub async fn reset_game(&self) -> StateResult<GameSnapshot> {
        let teams = self.get_roster().await;
        let (session, revision) = {
            let mut guard = self.session.write().await;
            let current = guard.as_ref().ok_or(StateError::NoActiveGame)?;
            let session = GameSession::load(current.set().clone(), teams);
            *guard = Some(session.clone());
            (session, self.next_revision())
        };
        tracing::info!("Game reset, now game {}", session.id);
        let snapshot = session.snapshot();
        self.publish(revision, snapshot.clone(), session, false);
        Ok(snapshot)
    }

    /// Drop the running game; the lobby roster stays
    pub async fn end_game(&self) -> StateResult<()> {
        let ended = self
            .session
            .write()
            .await
            .take()
            .ok_or(StateError::NoActiveGame)?;
        tracing::info!("Game {} closed", ended.id);
        self.broadcast_to_all(ServerMessage::GameClosed { game_id: ended.id });
        Ok(())
    }

    // =========================================================================
    // Board play
    // =========================================================================

    pub async fn open_clue(&self, at: Coordinate) -> StateResult<GameSnapshot> {
        let ((), snapshot) = self
            .with_session(|s| {
                s.open_clue(at)?;
                Ok(())
            })
            .await?;
        Ok(snapshot)
    }

    pub async fn mark_correct(&self, team: &TeamId) -> StateResult<GameSnapshot> {
        let ((), snapshot) = self
            .with_session(|s| {
                let index = team_index(s, team)?;
                Ok(s.mark_correct(index)?)
            })
            .await?;
        Ok(snapshot)
    }

    pub async fn mark_incorrect(&self, team: &TeamId) -> StateResult<GameSnapshot> {
        let ((), snapshot) = self
            .with_session(|s| {
                let index = team_index(s, team)?;
                Ok(s.mark_incorrect(index)?)
            })
            .await?;
        Ok(snapshot)
    }

    pub async fn set_daily_double_wager(&self, wager: i64) -> StateResult<GameSnapshot> {
        let ((), snapshot) = self
            .with_session(|s| Ok(s.set_daily_double_wager(wager)?))
            .await?;
        Ok(snapshot)
    }

    pub async fn mark_daily_double(&self, correct: bool) -> StateResult<GameSnapshot> {
        let ((), snapshot) = self
            .with_session(|s| Ok(s.mark_daily_double(correct)?))
            .await?;
        Ok(snapshot)
    }

    /// Close the open clue. Returns the new phase if the round ended with it.
    pub async fn resolve_clue(&self) -> StateResult<(Option<GamePhase>, GameSnapshot)> {
        self.with_session(|s| Ok(s.resolve_clue()?)).await
    }

    pub async fn advance_phase(&self) -> StateResult<GameSnapshot> {
        let (_, snapshot) = self.with_session(|s| Ok(s.advance_phase()?)).await?;
        Ok(snapshot)
    }

    pub async fn edit_score(&self, team: &TeamId, delta: i64) -> StateResult<GameSnapshot> {
        let ((), snapshot) = self
            .with_session(|s| {
                let index = team_index(s, team)?;
                s.edit_score(index, delta);
                Ok(())
            })
            .await?;
        Ok(snapshot)
    }

    pub async fn select_team(&self, team: &TeamId) -> StateResult<GameSnapshot> {
        let ((), snapshot) = self
            .with_session(|s| {
                let index = team_index(s, team)?;
                s.select_team(index);
                Ok(())
            })
            .await?;
        Ok(snapshot)
    }

    /// Re-roll the daily doubles on the board in play
    pub async fn randomize_daily_doubles(&self) -> StateResult<GameSnapshot> {
        let ((), snapshot) = self
            .with_session(|s| Ok(s.assign_random_daily_doubles(&mut rand::rng())?))
            .await?;
        Ok(snapshot)
    }

    // =========================================================================
    // Final round
    // =========================================================================

    pub async fn set_final_wager(&self, team: &TeamId, wager: String) -> StateResult<GameSnapshot> {
        let ((), snapshot) = self
            .with_session(|s| {
                let index = team_index(s, team)?;
                Ok(s.set_final_wager(index, &wager)?)
            })
            .await?;
        Ok(snapshot)
    }

    pub async fn submit_final_answer(
        &self,
        team: &TeamId,
        answer: String,
    ) -> StateResult<GameSnapshot> {
        let ((), snapshot) = self
            .with_session(|s| {
                let index = team_index(s, team)?;
                Ok(s.submit_final_answer(index, &answer)?)
            })
            .await?;
        Ok(snapshot)
    }

    pub async fn mark_final(&self, team: &TeamId, correct: bool) -> StateResult<GameSnapshot> {
        let ((), snapshot) = self
            .with_session(|s| {
                let index = team_index(s, team)?;
                Ok(s.apply_final_result(index, correct)?)
            })
            .await?;
        Ok(snapshot)
    }

    pub async fn advance_final_stage(&self) -> StateResult<(FinalRoundStage, GameSnapshot)> {
        self.with_session(|s| Ok(s.advance_final_stage()?)).await
    }
}
