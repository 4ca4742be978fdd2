//! Authoring operations on the shared set builder

use super::{AppState, StateResult};
use crate::game::{BuildStage, GameResult, SetBuilder};
use crate::types::{PointValues, RoundNumber, SetSummary};
use serde::{Deserialize, Serialize};

/// What the host's editor needs to draw the current stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuilderView {
    pub set: SetBuilder,
    pub stage: BuildStage,
    pub furthest_stage: BuildStage,
    pub can_advance: bool,
    pub is_complete: bool,
    pub num_clues: usize,
    pub point_values: PointValues,
}

impl From<&SetBuilder> for BuilderView {
    fn from(builder: &SetBuilder) -> Self {
        Self {
            set: builder.clone(),
            stage: builder.stage(),
            furthest_stage: builder.furthest_stage(),
            can_advance: builder.can_advance(),
            is_complete: builder.is_complete(),
            num_clues: builder.num_clues(),
            point_values: builder.point_values(),
        }
    }
}

impl AppState {
    pub async fn builder_view(&self) -> BuilderView {
        BuilderView::from(&*self.builder.read().await)
    }

    /// Run `f` against the builder and return the updated view
    pub async fn with_builder<T>(
        &self,
        f: impl FnOnce(&mut SetBuilder) -> GameResult<T>,
    ) -> StateResult<(T, BuilderView)> {
        let mut builder = self.builder.write().await;
        let value = f(&mut *builder)?;
        Ok((value, BuilderView::from(&*builder)))
    }

    /// Throw away the current draft and start a blank set
    pub async fn new_set(&self) -> BuilderView {
        let mut builder = self.builder.write().await;
        *builder = SetBuilder::new();
        tracing::info!("Started new set {}", builder.id);
        BuilderView::from(&*builder)
    }

    /// Load a stored set or draft into the builder
    pub async fn edit_set(&self, set_id: &str) -> StateResult<BuilderView> {
        let doc = self.store.load_set(set_id).await?;
        let edited = SetBuilder::edit(&doc)?;
        let mut builder = self.builder.write().await;
        *builder = edited;
        tracing::info!("Editing set {} at {:?}", builder.id, builder.stage());
        Ok(BuilderView::from(&*builder))
    }

    /// Store the builder as it is, finished or not
    pub async fn save_draft(&self) -> StateResult<SetSummary> {
        let doc = self.builder.read().await.to_document();
        self.store.save_set(&doc).await?;
        tracing::info!("Saved draft of set {}", doc.id);
        Ok(SetSummary::from(&doc))
    }

    /// Validate and store the finished set
    pub async fn publish_set(&self) -> StateResult<SetSummary> {
        let doc = self.builder.write().await.publish()?;
        self.store.save_set(&doc).await?;
        Ok(SetSummary::from(&doc))
    }

    pub async fn randomize_set_daily_doubles(&self, round: RoundNumber) -> StateResult<BuilderView> {
        let ((), view) = self
            .with_builder(|b| b.assign_random_daily_doubles(round, &mut rand::rng()))
            .await?;
        Ok(view)
    }
}
