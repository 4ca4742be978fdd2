//! Set builder commands (host only)

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::{AppState, BuilderView, StateResult};
use std::sync::Arc;

fn view_reply(result: StateResult<BuilderView>) -> Option<ServerMessage> {
    Some(match result {
        Ok(view) => ServerMessage::Build {
            view: Box::new(view),
        },
        Err(e) => {
            tracing::warn!("Build command failed: {}", e);
            e.into()
        }
    })
}

/// Apply an infallible edit and reply with the new view
async fn edit(
    state: &Arc<AppState>,
    f: impl FnOnce(&mut crate::game::SetBuilder),
) -> Option<ServerMessage> {
    let result = state
        .with_builder(|b| {
            f(b);
            Ok(())
        })
        .await
        .map(|((), view)| view);
    view_reply(result)
}

pub async fn handle_build_message(
    state: &Arc<AppState>,
    msg: ClientMessage,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::BuildNew => view_reply(Ok(state.new_set().await)),
        ClientMessage::BuildEdit { set_id } => {
            tracing::info!("Host editing set {}", set_id);
            view_reply(state.edit_set(&set_id).await)
        }
        ClientMessage::BuildSetTitle { title } => edit(state, |b| b.set_title(title)).await,
        ClientMessage::BuildAddTags { tags } => edit(state, |b| b.add_tags(&tags)).await,
        ClientMessage::BuildRemoveTag { tag } => edit(state, |b| b.remove_tag(&tag)).await,
        ClientMessage::BuildSetCategoryName {
            round,
            category,
            name,
        } => edit(state, |b| b.set_category_name(round, category, name)).await,
        ClientMessage::BuildSetClue {
            round,
            at,
            clue,
            response,
        } => edit(state, |b| b.set_clue(round, at, clue, response)).await,
        ClientMessage::BuildSwapClues {
            round,
            category,
            a,
            b: other,
        } => edit(state, |b| b.swap_clues(round, category, a, other)).await,
        ClientMessage::BuildAddCategory { round } => {
            edit(state, |b| {
                b.add_category(round);
            })
            .await
        }
        ClientMessage::BuildSubtractCategory { round } => {
            edit(state, |b| {
                b.subtract_category(round);
            })
            .await
        }
        ClientMessage::BuildToggleDailyDouble { round, at } => {
            edit(state, |b| {
                if !b.toggle_daily_double(round, at) {
                    tracing::debug!("Daily double toggle at {:?} refused", at);
                }
            })
            .await
        }
        ClientMessage::BuildRandomDailyDoubles { round } => {
            view_reply(state.randomize_set_daily_doubles(round).await)
        }
        ClientMessage::BuildClearDailyDoubles { round } => {
            edit(state, |b| b.clear_daily_doubles(round)).await
        }
        ClientMessage::BuildSetFinal {
            category,
            clue,
            response,
        } => edit(state, |b| b.set_final_round(category, clue, response)).await,
        ClientMessage::BuildSetHasTwoRounds { has_two_rounds } => {
            edit(state, |b| b.set_has_two_rounds(has_two_rounds)).await
        }
        ClientMessage::BuildNext => {
            let result = state.with_builder(|b| b.advance()).await;
            view_reply(result.map(|(_, view)| view))
        }
        ClientMessage::BuildBack => {
            edit(state, |b| {
                b.back();
            })
            .await
        }
        ClientMessage::BuildJumpTo { stage } => {
            let result = state.with_builder(|b| b.jump_to(stage)).await;
            view_reply(result.map(|((), view)| view))
        }
        ClientMessage::BuildSaveDraft => Some(match state.save_draft().await {
            Ok(set) => ServerMessage::SetSaved { set },
            Err(e) => e.into(),
        }),
        ClientMessage::BuildPublish => Some(match state.publish_set().await {
            Ok(set) => {
                tracing::info!("Host published set {}", set.id);
                ServerMessage::SetSaved { set }
            }
            Err(e) => e.into(),
        }),
        other => {
            tracing::warn!("Unhandled message in builder dispatch: {:?}", other);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::BuildStage;
    use crate::types::RoundNumber;

    #[tokio::test]
    async fn test_round_length_saturates() {
        let state = Arc::new(AppState::default());
        for _ in 0..10 {
            handle_build_message(&state, ClientMessage::BuildSubtractCategory { round: RoundNumber::One })
                .await;
        }
        let view = state.builder_view().await;
        assert_eq!(view.set.round_length(RoundNumber::One), 3);

        for _ in 0..10 {
            handle_build_message(&state, ClientMessage::BuildAddCategory { round: RoundNumber::One })
                .await;
        }
        let view = state.builder_view().await;
        assert_eq!(view.set.round_length(RoundNumber::One), 6);
    }

    #[tokio::test]
    async fn test_next_is_refused_until_filled() {
        let state = Arc::new(AppState::default());
        let reply = handle_build_message(&state, ClientMessage::BuildNext).await;
        assert!(matches!(
            reply,
            Some(ServerMessage::Error { code, .. }) if code == "ILLEGAL_TRANSITION"
        ));
        assert_eq!(
            state.builder_view().await.stage,
            BuildStage::CategoryFill(RoundNumber::One)
        );
    }
}
