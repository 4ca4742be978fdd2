//! Authoring workflow: the build-stage machine and the set being built.

use super::daily_double::DailyDoubles;
use super::error::{GameError, GameResult};
use super::set::TriviaSet;
use crate::types::{
    Category, Coordinate, CoordinateOrder, FinalClue, PointScales, PointValues, RoundNumber,
    SetDocument, SetId, CLUES_PER_CATEGORY, MAX_ROUND_LENGTH, MIN_ROUND_LENGTH,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Minimum number of tags before a set can be finished
pub const MIN_TAGS: usize = 2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "stage", content = "round", rename_all = "snake_case")]
pub enum BuildStage {
    CategoryFill(RoundNumber),
    DailyDoublePlacement(RoundNumber),
    FinalRoundFill,
    Details,
}

impl BuildStage {
    /// Stages in order. Single-round sets skip the second board.
    pub fn sequence(has_two_rounds: bool) -> Vec<BuildStage> {
        let mut stages = vec![
            BuildStage::CategoryFill(RoundNumber::One),
            BuildStage::DailyDoublePlacement(RoundNumber::One),
        ];
        if has_two_rounds {
            stages.push(BuildStage::CategoryFill(RoundNumber::Two));
            stages.push(BuildStage::DailyDoublePlacement(RoundNumber::Two));
        }
        stages.push(BuildStage::FinalRoundFill);
        stages.push(BuildStage::Details);
        stages
    }

    /// The board this stage edits, if any
    pub fn round(self) -> Option<RoundNumber> {
        match self {
            BuildStage::CategoryFill(r) | BuildStage::DailyDoublePlacement(r) => Some(r),
            BuildStage::FinalRoundFill | BuildStage::Details => None,
        }
    }
}

/// A set under construction, with six category slots per board
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetBuilder {
    pub id: SetId,
    pub title: String,
    pub tags: Vec<String>,
    pub has_two_rounds: bool,
    round1: Vec<Category>,
    round2: Vec<Category>,
    round1_len: usize,
    round2_len: usize,
    /// Which of the six slots are on the board
    round1_showing: [bool; MAX_ROUND_LENGTH],
    round2_showing: [bool; MAX_ROUND_LENGTH],
    pub daily_doubles: DailyDoubles,
    pub point_scales: PointScales,
    pub final_round: FinalClue,
    stage: BuildStage,
    furthest: BuildStage,
    pub is_draft: bool,
    pub created_at: String,
}

fn blank_slots() -> Vec<Category> {
    (0..MAX_ROUND_LENGTH).map(Category::blank).collect()
}

fn showing(len: usize) -> [bool; MAX_ROUND_LENGTH] {
    std::array::from_fn(|i| i < len)
}

/// Pad stored categories out to six five-clue slots
fn slots_from(categories: &[Category]) -> Vec<Category> {
    let mut slots: Vec<Category> = categories
        .iter()
        .take(MAX_ROUND_LENGTH)
        .cloned()
        .collect();
    for category in &mut slots {
        category.clues.resize(CLUES_PER_CATEGORY, String::new());
        category.responses.resize(CLUES_PER_CATEGORY, String::new());
    }
    while slots.len() < MAX_ROUND_LENGTH {
        slots.push(Category::blank(slots.len()));
    }
    for (i, category) in slots.iter_mut().enumerate() {
        category.index = i;
    }
    slots
}

impl Default for SetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SetBuilder {
    pub fn new() -> Self {
        let stage = BuildStage::CategoryFill(RoundNumber::One);
        Self {
            id: ulid::Ulid::new().to_string(),
            title: String::new(),
            tags: Vec::new(),
            has_two_rounds: true,
            round1: blank_slots(),
            round2: blank_slots(),
            round1_len: MAX_ROUND_LENGTH,
            round2_len: MAX_ROUND_LENGTH,
            round1_showing: showing(MAX_ROUND_LENGTH),
            round2_showing: showing(MAX_ROUND_LENGTH),
            daily_doubles: DailyDoubles::default(),
            point_scales: PointScales::default(),
            final_round: FinalClue::default(),
            stage,
            furthest: stage,
            is_draft: true,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Reopen a stored set or draft for editing
    pub fn edit(doc: &SetDocument) -> GameResult<Self> {
        let order = doc.coordinate_order;
        let decode = |pair: &[usize]| order.decode(pair).map_err(GameError::MalformedSet);
        let clamp = |len: usize| len.clamp(MIN_ROUND_LENGTH, MAX_ROUND_LENGTH);

        let mut builder = Self {
            id: doc.id.clone(),
            title: doc.title.clone(),
            tags: doc.tags.clone(),
            has_two_rounds: doc.has_two_rounds,
            round1: slots_from(&doc.round1),
            round2: slots_from(&doc.round2),
            round1_len: clamp(doc.round1_len),
            round2_len: clamp(doc.round2_len),
            round1_showing: showing(clamp(doc.round1_len)),
            round2_showing: showing(clamp(doc.round2_len)),
            daily_doubles: DailyDoubles {
                round_one: decode(&doc.round_one_daily)?,
                round_two: [
                    decode(&doc.round_two_daily1)?,
                    decode(&doc.round_two_daily2)?,
                ],
            },
            point_scales: doc.point_scales,
            final_round: doc.final_round.clone(),
            stage: BuildStage::CategoryFill(RoundNumber::One),
            furthest: BuildStage::CategoryFill(RoundNumber::One),
            is_draft: doc.is_draft,
            created_at: doc
                .created_at
                .clone()
                .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
        };
        builder.furthest = builder.furthest_stage();
        Ok(builder)
    }

    // =========================================================================
    // Stage machine
    // =========================================================================

    pub fn stage(&self) -> BuildStage {
        self.stage
    }

    fn position(&self, stage: BuildStage) -> usize {
        BuildStage::sequence(self.has_two_rounds)
            .iter()
            .position(|s| *s == stage)
            .unwrap_or(0)
    }

    /// Point values shown while authoring the current stage
    pub fn point_values(&self) -> PointValues {
        match self.stage.round() {
            Some(round) => self.point_scales.for_round(round),
            None => self.point_scales.round_one,
        }
    }

    /// Whether `stage`'s forward gate passes
    pub fn gate(&self, stage: BuildStage) -> bool {
        match stage {
            BuildStage::CategoryFill(round) => {
                self.filled_count(round) >= self.round_length(round)
            }
            BuildStage::DailyDoublePlacement(round) => {
                self.daily_doubles.is_complete(round)
                    && self.stale_daily_doubles(round).is_empty()
            }
            BuildStage::FinalRoundFill => self.final_round.is_complete(),
            BuildStage::Details => self.tags.len() >= MIN_TAGS && !self.title.trim().is_empty(),
        }
    }

    pub fn can_advance(&self) -> bool {
        self.gate(self.stage)
    }

    /// Every gate passes
    pub fn is_complete(&self) -> bool {
        BuildStage::sequence(self.has_two_rounds)
            .into_iter()
            .all(|s| self.gate(s))
    }

    /// Move one stage forward. The last stage has no successor; publish instead.
    pub fn advance(&mut self) -> GameResult<BuildStage> {
        if !self.can_advance() {
            return Err(GameError::illegal(format!(
                "{:?} is not finished",
                self.stage
            )));
        }
        let stages = BuildStage::sequence(self.has_two_rounds);
        let next = stages
            .get(self.position(self.stage) + 1)
            .copied()
            .ok_or_else(|| GameError::illegal("already at the last build stage"))?;

        self.stage = next;
        self.is_draft = !self.is_complete();
        if self.position(next) > self.position(self.furthest) {
            self.furthest = next;
        }
        tracing::info!("Build stage advanced to {:?}", next);
        Ok(next)
    }

    /// Step back exactly one stage; a no-op at the first stage
    pub fn back(&mut self) -> BuildStage {
        let position = self.position(self.stage);
        if position > 0 {
            self.stage = BuildStage::sequence(self.has_two_rounds)[position - 1];
        }
        self.stage
    }

    /// Jump to any stage up to the furthest one reached
    pub fn jump_to(&mut self, stage: BuildStage) -> GameResult<()> {
        let stages = BuildStage::sequence(self.has_two_rounds);
        if !stages.contains(&stage) || self.position(stage) > self.position(self.furthest_stage()) {
            return Err(GameError::illegal(format!("{:?} is not reachable yet", stage)));
        }
        self.stage = stage;
        Ok(())
    }

    /// The most advanced stage reachable: the first stage whose gate fails,
    /// or the current stage if that is further along.
    pub fn furthest_stage(&self) -> BuildStage {
        let stages = BuildStage::sequence(self.has_two_rounds);
        let reachable = stages
            .iter()
            .copied()
            .find(|s| !self.gate(*s))
            .unwrap_or(BuildStage::Details);
        if self.position(reachable) >= self.position(self.stage) {
            reachable
        } else {
            self.stage
        }
    }

    pub fn set_has_two_rounds(&mut self, has_two_rounds: bool) {
        self.has_two_rounds = has_two_rounds;
        if !has_two_rounds && self.stage.round() == Some(RoundNumber::Two) {
            self.stage = BuildStage::DailyDoublePlacement(RoundNumber::One);
        }
        self.is_draft = !self.is_complete();
    }

    // =========================================================================
    // Boards
    // =========================================================================

    pub fn round_length(&self, round: RoundNumber) -> usize {
        match round {
            RoundNumber::One => self.round1_len,
            RoundNumber::Two => self.round2_len,
        }
    }

    pub fn showing(&self, round: RoundNumber) -> &[bool; MAX_ROUND_LENGTH] {
        match round {
            RoundNumber::One => &self.round1_showing,
            RoundNumber::Two => &self.round2_showing,
        }
    }

    /// All six slots, shown or not
    pub fn slots(&self, round: RoundNumber) -> &[Category] {
        match round {
            RoundNumber::One => &self.round1,
            RoundNumber::Two => &self.round2,
        }
    }

    /// The categories currently on the board
    pub fn categories(&self, round: RoundNumber) -> &[Category] {
        let slots = self.slots(round);
        slots.get(..self.round_length(round)).unwrap_or(slots)
    }

    /// Six slots per board of five pairs each, and lengths in range
    pub fn check_shape(&self) -> Result<(), String> {
        for round in [RoundNumber::One, RoundNumber::Two] {
            let len = self.round_length(round);
            if !(MIN_ROUND_LENGTH..=MAX_ROUND_LENGTH).contains(&len) {
                return Err(format!("Builder round {:?} has length {}", round, len));
            }
            let slots = self.slots(round);
            if slots.len() != MAX_ROUND_LENGTH {
                return Err(format!("Builder round {:?} has {} slots", round, slots.len()));
            }
            if slots.iter().any(|c| {
                c.clues.len() != CLUES_PER_CATEGORY || c.responses.len() != CLUES_PER_CATEGORY
            }) {
                return Err(format!(
                    "Builder round {:?} has a slot without {} clues",
                    round, CLUES_PER_CATEGORY
                ));
            }
        }
        Ok(())
    }

    fn board_mut(
        &mut self,
        round: RoundNumber,
    ) -> (&mut Vec<Category>, &mut usize, &mut [bool; MAX_ROUND_LENGTH]) {
        match round {
            RoundNumber::One => (&mut self.round1, &mut self.round1_len, &mut self.round1_showing),
            RoundNumber::Two => (&mut self.round2, &mut self.round2_len, &mut self.round2_showing),
        }
    }

    /// Visible categories with a name and at least one complete pair
    pub fn filled_count(&self, round: RoundNumber) -> usize {
        self.categories(round)
            .iter()
            .filter(|c| c.is_filled())
            .count()
    }

    /// Show one more category slot; saturates at six
    pub fn add_category(&mut self, round: RoundNumber) -> usize {
        let (_, len, showing) = self.board_mut(round);
        if *len < MAX_ROUND_LENGTH {
            *len += 1;
            showing[*len - 1] = true;
        }
        *len
    }

    /// Hide the last category slot; saturates at three.
    ///
    /// The slot keeps its contents, but a daily double placed in it is dropped.
    pub fn subtract_category(&mut self, round: RoundNumber) -> usize {
        let (_, len, showing) = self.board_mut(round);
        if *len > MIN_ROUND_LENGTH {
            *len -= 1;
            showing[*len] = false;
        }
        let len = *len;
        self.drop_stale_daily_doubles(round);
        len
    }

    /// Placed daily doubles that are hidden or sit on an empty clue
    fn stale_daily_doubles(&self, round: RoundNumber) -> Vec<Coordinate> {
        let categories = self.categories(round);
        self.daily_doubles
            .coordinates(round)
            .into_iter()
            .filter(|at| !categories.get(at.category).is_some_and(|c| c.has_clue(at.clue)))
            .collect()
    }

    fn drop_stale_daily_doubles(&mut self, round: RoundNumber) {
        for at in self.stale_daily_doubles(round) {
            tracing::debug!("Dropping daily double at {:?}, its clue is gone", at);
            let categories = self.slots(round).to_vec();
            self.daily_doubles.toggle(round, at, &categories);
        }
    }

    pub fn set_category_name(&mut self, round: RoundNumber, category: usize, name: impl Into<String>) {
        let (slots, _, _) = self.board_mut(round);
        if let Some(slot) = slots.get_mut(category) {
            slot.name = name.into();
        }
    }

    /// Write one clue/response pair
    pub fn set_clue(
        &mut self,
        round: RoundNumber,
        at: Coordinate,
        clue: impl Into<String>,
        response: impl Into<String>,
    ) {
        let (slots, _, _) = self.board_mut(round);
        let Some(slot) = slots.get_mut(at.category) else {
            return;
        };
        let (Some(c), Some(r)) = (slot.clues.get_mut(at.clue), slot.responses.get_mut(at.clue)) else {
            return;
        };
        *c = clue.into();
        *r = response.into();
        self.drop_stale_daily_doubles(round);
    }

    /// Swap two clue/response pairs within one category
    pub fn swap_clues(&mut self, round: RoundNumber, category: usize, a: usize, b: usize) {
        if a >= CLUES_PER_CATEGORY || b >= CLUES_PER_CATEGORY {
            return;
        }
        let (slots, _, _) = self.board_mut(round);
        if let Some(slot) = slots
            .get_mut(category)
            .filter(|s| a.max(b) < s.clues.len().min(s.responses.len()))
        {
            slot.clues.swap(a, b);
            slot.responses.swap(a, b);
        }
        self.drop_stale_daily_doubles(round);
    }

    /// Number of complete clue/response pairs on the visible boards
    pub fn num_clues(&self) -> usize {
        let mut rounds = vec![RoundNumber::One];
        if self.has_two_rounds {
            rounds.push(RoundNumber::Two);
        }
        rounds
            .into_iter()
            .flat_map(|r| self.categories(r))
            .map(Category::clue_count)
            .sum()
    }

    // =========================================================================
    // Daily doubles, final round, details
    // =========================================================================

    pub fn toggle_daily_double(&mut self, round: RoundNumber, at: Coordinate) -> bool {
        let categories = self.categories(round).to_vec();
        self.daily_doubles.toggle(round, at, &categories)
    }

    pub fn assign_random_daily_doubles<R: Rng + ?Sized>(
        &mut self,
        round: RoundNumber,
        rng: &mut R,
    ) -> GameResult<()> {
        let categories = self.categories(round).to_vec();
        let len = self.round_length(round);
        self.daily_doubles.assign_random(round, &categories, len, rng)
    }

    pub fn clear_daily_doubles(&mut self, round: RoundNumber) {
        self.daily_doubles.clear(round);
    }

    pub fn set_final_round(
        &mut self,
        category: impl Into<String>,
        clue: impl Into<String>,
        response: impl Into<String>,
    ) {
        self.final_round = FinalClue {
            category: category.into(),
            clue: clue.into(),
            response: response.into(),
        };
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Add space-separated tags, skipping ones already present
    pub fn add_tags(&mut self, text: &str) {
        for tag in text.split_whitespace() {
            if !self.tags.iter().any(|t| t == tag) {
                self.tags.push(tag.to_string());
            }
        }
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Current contents as a document, complete or not
    pub fn to_document(&self) -> SetDocument {
        let order = CoordinateOrder::CategoryFirst;
        SetDocument {
            id: self.id.clone(),
            title: self.title.clone(),
            tags: self.tags.clone(),
            round1_len: self.round1_len,
            round2_len: if self.has_two_rounds { self.round2_len } else { 0 },
            has_two_rounds: self.has_two_rounds,
            round1: self.categories(RoundNumber::One).to_vec(),
            round2: if self.has_two_rounds {
                self.categories(RoundNumber::Two).to_vec()
            } else {
                Vec::new()
            },
            round_one_daily: order.encode(self.daily_doubles.round_one),
            round_two_daily1: order.encode(self.daily_doubles.round_two[0]),
            round_two_daily2: order.encode(self.daily_doubles.round_two[1]),
            coordinate_order: order,
            point_scales: self.point_scales,
            final_round: self.final_round.clone(),
            round1_triple_stumpers: Vec::new(),
            round2_triple_stumpers: Vec::new(),
            is_draft: !self.is_complete(),
            created_at: Some(self.created_at.clone()),
        }
    }

    /// Finish the set. Every gate must pass and the result must load cleanly.
    pub fn publish(&mut self) -> GameResult<SetDocument> {
        if let Some(stage) = BuildStage::sequence(self.has_two_rounds)
            .into_iter()
            .find(|s| !self.gate(*s))
        {
            return Err(GameError::illegal(format!(
                "cannot publish, {:?} is not finished",
                stage
            )));
        }
        let doc = self.to_document();
        TriviaSet::from_document(&doc)?;
        self.is_draft = false;
        tracing::info!("Published set {} ({} clues)", self.id, self.num_clues());
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fill_round(builder: &mut SetBuilder, round: RoundNumber, categories: usize) {
        for c in 0..categories {
            builder.set_category_name(round, c, format!("CAT {}", c));
            for clue in 0..CLUES_PER_CATEGORY {
                builder.set_clue(
                    round,
                    Coordinate::new(c, clue),
                    format!("clue {}", clue),
                    format!("response {}", clue),
                );
            }
        }
    }

    #[test]
    fn test_round_length_saturates() {
        let mut builder = SetBuilder::new();
        assert_eq!(builder.add_category(RoundNumber::One), 6);
        for _ in 0..10 {
            builder.subtract_category(RoundNumber::One);
        }
        assert_eq!(builder.round_length(RoundNumber::One), 3);
        assert_eq!(
            builder.showing(RoundNumber::One),
            &[true, true, true, false, false, false]
        );
        builder.add_category(RoundNumber::One);
        assert_eq!(
            builder.showing(RoundNumber::One),
            &[true, true, true, true, false, false]
        );
        assert_eq!(builder.round_length(RoundNumber::Two), 6);
    }

    #[test]
    fn test_hidden_slot_keeps_contents() {
        let mut builder = SetBuilder::new();
        fill_round(&mut builder, RoundNumber::One, 6);
        builder.toggle_daily_double(RoundNumber::One, Coordinate::new(5, 2));

        builder.subtract_category(RoundNumber::One);
        assert_eq!(builder.categories(RoundNumber::One).len(), 5);
        assert_eq!(builder.daily_doubles.round_one, None);

        builder.add_category(RoundNumber::One);
        assert_eq!(builder.categories(RoundNumber::One)[5].name, "CAT 5");
    }

    #[test]
    fn test_category_fill_gate() {
        let mut builder = SetBuilder::new();
        builder.subtract_category(RoundNumber::One);
        builder.subtract_category(RoundNumber::One);
        builder.subtract_category(RoundNumber::One);

        fill_round(&mut builder, RoundNumber::One, 2);
        assert!(!builder.can_advance());
        assert!(builder.advance().is_err());
        assert_eq!(builder.stage(), BuildStage::CategoryFill(RoundNumber::One));

        // A name with no complete pair doesn't count
        builder.set_category_name(RoundNumber::One, 2, "HALF");
        builder.set_clue(RoundNumber::One, Coordinate::new(2, 0), "only a clue", "");
        assert!(!builder.can_advance());

        builder.set_clue(RoundNumber::One, Coordinate::new(2, 0), "only a clue", "and a response");
        assert!(builder.can_advance());
        assert_eq!(
            builder.advance().unwrap(),
            BuildStage::DailyDoublePlacement(RoundNumber::One)
        );
    }

    #[test]
    fn test_full_walkthrough_and_back() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut builder = SetBuilder::new();
        for round in [RoundNumber::One, RoundNumber::Two] {
            for _ in 0..3 {
                builder.subtract_category(round);
            }
            fill_round(&mut builder, round, 3);
        }

        builder.advance().unwrap();
        assert!(builder.advance().is_err());
        builder
            .assign_random_daily_doubles(RoundNumber::One, &mut rng)
            .unwrap();
        assert_eq!(builder.point_values(), [200, 400, 600, 800, 1000]);

        builder.advance().unwrap();
        assert_eq!(builder.stage(), BuildStage::CategoryFill(RoundNumber::Two));
        assert_eq!(builder.point_values(), [400, 800, 1200, 1600, 2000]);

        // Going back restores the first board's scale
        builder.back();
        assert_eq!(builder.point_values(), [200, 400, 600, 800, 1000]);
        builder.advance().unwrap();

        builder.advance().unwrap();
        builder
            .assign_random_daily_doubles(RoundNumber::Two, &mut rng)
            .unwrap();
        builder.advance().unwrap();
        assert_eq!(builder.stage(), BuildStage::FinalRoundFill);
        assert!(builder.advance().is_err());

        builder.set_final_round("CAPITALS", "Ghana's capital", "What is Accra?");
        builder.advance().unwrap();
        assert_eq!(builder.stage(), BuildStage::Details);
        assert!(builder.is_draft);
        assert!(builder.publish().is_err());

        builder.set_title("Pub Night");
        builder.add_tags("general pub general");
        assert_eq!(builder.tags, vec!["general", "pub"]);
        assert!(builder.advance().is_err());

        let doc = builder.publish().unwrap();
        assert!(!doc.is_draft);
        assert!(!builder.is_draft);
        assert_eq!(doc.round1.len(), 3);
        assert_eq!(builder.num_clues(), 30);
        assert!(TriviaSet::from_document(&doc).is_ok());
    }

    #[test]
    fn test_back_at_first_stage_is_noop() {
        let mut builder = SetBuilder::new();
        assert_eq!(
            builder.back(),
            BuildStage::CategoryFill(RoundNumber::One)
        );
    }

    #[test]
    fn test_single_round_skips_second_board() {
        let mut builder = SetBuilder::new();
        builder.set_has_two_rounds(false);
        assert_eq!(
            BuildStage::sequence(false),
            vec![
                BuildStage::CategoryFill(RoundNumber::One),
                BuildStage::DailyDoublePlacement(RoundNumber::One),
                BuildStage::FinalRoundFill,
                BuildStage::Details,
            ]
        );

        fill_round(&mut builder, RoundNumber::One, 6);
        builder.advance().unwrap();
        builder.toggle_daily_double(RoundNumber::One, Coordinate::new(0, 0));
        assert_eq!(builder.advance().unwrap(), BuildStage::FinalRoundFill);

        let doc = builder.to_document();
        assert!(doc.round2.is_empty());
        assert!(doc.is_draft);
    }

    #[test]
    fn test_furthest_stage_and_edit() {
        let mut builder = SetBuilder::new();
        fill_round(&mut builder, RoundNumber::One, 6);
        builder.toggle_daily_double(RoundNumber::One, Coordinate::new(1, 1));
        assert_eq!(
            builder.furthest_stage(),
            BuildStage::CategoryFill(RoundNumber::Two)
        );
        assert!(builder.jump_to(BuildStage::CategoryFill(RoundNumber::Two)).is_ok());
        assert!(builder.jump_to(BuildStage::FinalRoundFill).is_err());

        let reopened = SetBuilder::edit(&builder.to_document()).unwrap();
        assert_eq!(reopened.daily_doubles.round_one, Some(Coordinate::new(1, 1)));
        assert_eq!(reopened.slots(RoundNumber::One).len(), 6);
        assert_eq!(
            reopened.furthest_stage(),
            BuildStage::CategoryFill(RoundNumber::Two)
        );
    }

    #[test]
    fn test_swap_clues() {
        let mut builder = SetBuilder::new();
        fill_round(&mut builder, RoundNumber::One, 1);
        builder.swap_clues(RoundNumber::One, 0, 0, 4);
        let category = &builder.categories(RoundNumber::One)[0];
        assert_eq!(category.clues[0], "clue 4");
        assert_eq!(category.responses[4], "response 0");
    }

    #[test]
    fn test_daily_double_follows_its_clue() {
        let mut builder = SetBuilder::new();
        fill_round(&mut builder, RoundNumber::One, 6);
        builder.advance().unwrap();
        let at = Coordinate::new(0, 2);
        assert!(builder.toggle_daily_double(RoundNumber::One, at));
        assert!(builder.can_advance());

        builder.set_clue(RoundNumber::One, at, "", "");
        assert!(builder.daily_doubles.coordinates(RoundNumber::One).is_empty());
        assert!(!builder.can_advance());
        assert!(builder.advance().is_err());

        // An empty slot swapped onto the daily double drops it too
        builder.set_clue(RoundNumber::One, at, "back", "again");
        assert!(builder.toggle_daily_double(RoundNumber::One, at));
        builder.set_clue(RoundNumber::One, Coordinate::new(0, 4), "", "");
        builder.swap_clues(RoundNumber::One, 0, 2, 4);
        assert!(!builder.daily_doubles.is_daily_double(RoundNumber::One, at));
        assert!(!builder.can_advance());
    }
}
