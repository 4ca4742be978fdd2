//! State export/import for quick and dirty state restoration.
//!
//! A host can download everything the server holds in memory mid-event and
//! push it back after a restart or onto another machine.

use super::{AppState, StateError, StateResult};
use crate::game::{GameSession, SetBuilder};
use crate::protocol::ServerMessage;
use crate::types::Team;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Schema version for export format compatibility
/// Version 1: session, lobby roster and builder
pub const EXPORT_SCHEMA_VERSION: u32 = 1;

/// A serializable snapshot of the application state.
///
/// Excludes runtime-only components:
/// - Broadcast channels (recreated at startup)
/// - The store handle (sets and records already live there)
/// - A running daily puzzle (its clock can't survive a restart)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateExport {
    /// Schema version for forward compatibility
    pub schema_version: u32,
    /// Export timestamp (ISO8601)
    pub exported_at: String,
    /// The game in progress
    pub session: Option<GameSession>,
    #[serde(default)]
    pub roster: Vec<Team>,
    /// The set being authored
    #[serde(default)]
    pub builder: SetBuilder,
}

impl GameStateExport {
    /// Create a new export with current timestamp
    pub fn new(session: Option<GameSession>, roster: Vec<Team>, builder: SetBuilder) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION,
            exported_at: chrono::Utc::now().to_rfc3339(),
            session,
            roster,
            builder,
        }
    }

    /// Validate the export before import
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version > EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Export schema version {} is newer than supported version {}. \
                 Please update the server.",
                self.schema_version, EXPORT_SCHEMA_VERSION
            ));
        }

        let mut seen = HashSet::new();
        for team in &self.roster {
            if !seen.insert(&team.id) {
                return Err(format!("Team '{}' appears twice in the roster", team.id));
            }
        }

        self.builder.check_shape()?;
        match &self.session {
            Some(session) => session.check_shape(),
            None => Ok(()),
        }
    }
}

impl AppState {
    pub async fn export_state(&self) -> GameStateExport {
        GameStateExport::new(
            self.session.read().await.clone(),
            self.roster.read().await.clone(),
            self.builder.read().await.clone(),
        )
    }

    /// Replace session, roster and builder. Nothing changes if validation fails.
    pub async fn import_state(&self, export: GameStateExport) -> StateResult<()> {
        export.validate().map_err(StateError::InvalidImport)?;

        tracing::info!(
            "Importing state exported at {} (schema v{})",
            export.exported_at,
            export.schema_version
        );
        *self.roster.write().await = export.roster;
        *self.builder.write().await = export.builder;
        let revision = {
            let mut guard = self.session.write().await;
            *guard = export.session.clone();
            self.next_revision()
        };

        match export.session {
            Some(session) => {
                self.broadcast_to_all(ServerMessage::GameState {
                    snapshot: Box::new(session.snapshot()),
                });
                self.persist(revision, session, false);
            }
            None => self.broadcast_to_all(ServerMessage::Roster {
                teams: self.get_roster().await,
            }),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::set::tests::sample_document;
    use crate::types::Coordinate;

    fn session() -> GameSession {
        GameSession::load_set(
            &sample_document(),
            vec![
                Team::new("Owls", vec![], "blue"),
                Team::new("Foxes", vec![], "red"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_export_serialization_roundtrip() {
        let mut session = session();
        session.open_clue(Coordinate::new(0, 0)).unwrap();
        session.mark_correct(0).unwrap();
        session.resolve_clue().unwrap();
        let export = GameStateExport::new(Some(session.clone()), vec![], SetBuilder::new());

        let json = serde_json::to_string_pretty(&export).unwrap();
        let parsed: GameStateExport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(parsed.session, Some(session));
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_validation_duplicate_team() {
        let team = Team::new("Owls", vec![], "blue");
        let export = GameStateExport::new(None, vec![team.clone(), team], SetBuilder::new());

        let result = export.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("appears twice"));
    }

    #[test]
    fn test_validation_future_schema() {
        let mut export = GameStateExport::new(None, vec![], SetBuilder::new());
        export.schema_version = EXPORT_SCHEMA_VERSION + 1;

        let result = export.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("newer than supported"));
    }

    #[tokio::test]
    async fn test_failed_import_changes_nothing() {
        let state = AppState::default();
        state
            .add_team("Newts".to_string(), vec![], "green".to_string())
            .await
            .unwrap();

        let team = Team::new("Owls", vec![], "blue");
        let bad = GameStateExport::new(Some(session()), vec![team.clone(), team], SetBuilder::new());
        let err = state.import_state(bad).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_IMPORT");
        assert!(state.get_snapshot().await.is_none());
        assert_eq!(state.get_roster().await[0].name, "Newts");

        let good = GameStateExport::new(Some(session()), vec![], SetBuilder::new());
        state.import_state(good).await.unwrap();
        assert!(state.get_snapshot().await.is_some());
        assert!(state.get_roster().await.is_empty());
    }

    fn tampered(edit: impl FnOnce(&mut serde_json::Value)) -> GameStateExport {
        let export = GameStateExport::new(Some(session()), vec![], SetBuilder::new());
        let mut value = serde_json::to_value(&export).unwrap();
        edit(&mut value);
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_misshapen_board_is_rejected() {
        let export = tampered(|v| {
            v["session"]["board"]["finished_categories"] = serde_json::json!([false]);
        });
        assert!(export.validate().unwrap_err().contains("finished flags"));

        let state = AppState::default();
        let err = state.import_state(export).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_IMPORT");
        assert!(state.get_snapshot().await.is_none());

        let export = tampered(|v| {
            v["session"]["board"]["status"][1] = serde_json::json!(["incomplete"]);
        });
        assert!(export.validate().is_err());
    }

    #[test]
    fn test_misshapen_builder_is_rejected() {
        let export = tampered(|v| {
            let slots = v["builder"]["round1"].as_array_mut().unwrap();
            slots.truncate(2);
        });
        assert!(export.validate().unwrap_err().contains("slots"));

        let export = tampered(|v| v["builder"]["round2_len"] = serde_json::json!(9));
        assert!(export.validate().unwrap_err().contains("length"));
    }
}
