use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Opaque ID types for type safety
pub type GameId = String;
pub type SetId = String;
pub type CategoryId = String;
pub type TeamId = String;

/// Every category holds exactly this many clue slots.
pub const CLUES_PER_CATEGORY: usize = 5;
pub const MIN_ROUND_LENGTH: usize = 3;
pub const MAX_ROUND_LENGTH: usize = 6;

pub type PointValues = [i64; CLUES_PER_CATEGORY];

pub const ROUND_ONE_POINTS: PointValues = [200, 400, 600, 800, 1000];
pub const ROUND_TWO_POINTS: PointValues = [400, 800, 1200, 1600, 2000];

/// Which of the two boards a category or coordinate belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RoundNumber {
    One,
    Two,
}

/// Live-play phase. Only ever moves forward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    Round1,
    Round2,
    FinalRound,
}

impl GamePhase {
    /// The board played during this phase (none for the final round)
    pub fn round(self) -> Option<RoundNumber> {
        match self {
            GamePhase::Round1 => Some(RoundNumber::One),
            GamePhase::Round2 => Some(RoundNumber::Two),
            GamePhase::FinalRound => None,
        }
    }
}

/// Per-cell completion state. `Empty` never transitions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClueStatus {
    Empty,
    Incomplete,
    Complete,
}

/// Canonical board coordinate, always (category, clue).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub category: usize,
    pub clue: usize,
}

impl Coordinate {
    pub fn new(category: usize, clue: usize) -> Self {
        Self { category, clue }
    }
}

/// How a stored `[a, b]` pair is laid out.
///
/// Sets built in the app store `[category, clue]`; archive sets imported from
/// the historical record store `[clue, category]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateOrder {
    #[default]
    CategoryFirst,
    ClueFirst,
}

impl CoordinateOrder {
    /// Decode a stored pair. An empty pair means "not set".
    pub fn decode(self, pair: &[usize]) -> Result<Option<Coordinate>, String> {
        match pair {
            [] => Ok(None),
            [a, b] => Ok(Some(match self {
                CoordinateOrder::CategoryFirst => Coordinate::new(*a, *b),
                CoordinateOrder::ClueFirst => Coordinate::new(*b, *a),
            })),
            other => Err(format!(
                "coordinate must have 0 or 2 components, got {}",
                other.len()
            )),
        }
    }

    pub fn encode(self, coordinate: Option<Coordinate>) -> Vec<usize> {
        match (coordinate, self) {
            (None, _) => Vec::new(),
            (Some(c), CoordinateOrder::CategoryFirst) => vec![c.category, c.clue],
            (Some(c), CoordinateOrder::ClueFirst) => vec![c.clue, c.category],
        }
    }
}

/// A named column of five clue/response pairs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub index: usize,
    pub clues: Vec<String>,
    pub responses: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub image_urls: BTreeMap<usize, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub audio_urls: BTreeMap<usize, String>,
}

impl Category {
    pub fn new(index: usize, name: impl Into<String>, clues: Vec<String>, responses: Vec<String>) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            name: name.into(),
            index,
            clues,
            responses,
            image_urls: BTreeMap::new(),
            audio_urls: BTreeMap::new(),
        }
    }

    /// An unnamed category with five empty slots
    pub fn blank(index: usize) -> Self {
        Self::new(
            index,
            "",
            vec![String::new(); CLUES_PER_CATEGORY],
            vec![String::new(); CLUES_PER_CATEGORY],
        )
    }

    /// Whether the clue at `clue` exists and has text
    pub fn has_clue(&self, clue: usize) -> bool {
        self.clues.get(clue).is_some_and(|c| !c.is_empty())
    }

    /// True when no slot holds both a clue and a response
    pub fn is_empty(&self) -> bool {
        !self
            .clues
            .iter()
            .zip(self.responses.iter())
            .any(|(c, r)| !c.is_empty() && !r.is_empty())
    }

    /// Named and holding at least one complete clue/response pair
    pub fn is_filled(&self) -> bool {
        !self.name.trim().is_empty() && !self.is_empty()
    }

    /// Number of slots with both a clue and a response
    pub fn clue_count(&self) -> usize {
        self.clues
            .iter()
            .zip(self.responses.iter())
            .filter(|(c, r)| !c.is_empty() && !r.is_empty())
            .count()
    }
}

/// A contestant or a team of contestants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    pub id: TeamId,
    /// Position in the roster; recomputed whenever a team is removed
    pub index: usize,
    pub name: String,
    /// Answering order. The front member is the current spokesperson.
    pub members: VecDeque<String>,
    /// No floor: scores may go negative
    pub score: i64,
    pub color: String,
}

impl Team {
    pub fn new(name: impl Into<String>, members: Vec<String>, color: impl Into<String>) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            index: 0,
            name: name.into(),
            members: members.into(),
            score: 0,
            color: color.into(),
        }
    }

    pub fn spokesperson(&self) -> Option<&str> {
        self.members.front().map(String::as_str)
    }

    /// Move the current spokesperson to the back of the queue
    pub fn rotate_members(&mut self) {
        if !self.members.is_empty() {
            self.members.rotate_left(1);
        }
    }
}

/// The single clue played in the final round
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FinalClue {
    pub category: String,
    pub clue: String,
    pub response: String,
}

impl FinalClue {
    pub fn is_complete(&self) -> bool {
        !self.category.is_empty() && !self.clue.is_empty() && !self.response.is_empty()
    }
}

/// Point values per round
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PointScales {
    pub round_one: PointValues,
    pub round_two: PointValues,
}

impl Default for PointScales {
    fn default() -> Self {
        Self {
            round_one: ROUND_ONE_POINTS,
            round_two: ROUND_TWO_POINTS,
        }
    }
}

impl PointScales {
    pub fn for_round(&self, round: RoundNumber) -> PointValues {
        match round {
            RoundNumber::One => self.round_one,
            RoundNumber::Two => self.round_two,
        }
    }
}

fn default_true() -> bool {
    true
}

/// A set as the persistence layer stores it.
///
/// Daily-double and triple-stumper pairs are raw `[a, b]` arrays laid out
/// according to `coordinate_order`; they are only turned into [`Coordinate`]s
/// when the set is loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetDocument {
    pub id: SetId,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub round1_len: usize,
    #[serde(default)]
    pub round2_len: usize,
    #[serde(default = "default_true")]
    pub has_two_rounds: bool,
    pub round1: Vec<Category>,
    #[serde(default)]
    pub round2: Vec<Category>,
    #[serde(default)]
    pub round_one_daily: Vec<usize>,
    #[serde(default)]
    pub round_two_daily1: Vec<usize>,
    #[serde(default)]
    pub round_two_daily2: Vec<usize>,
    #[serde(default)]
    pub coordinate_order: CoordinateOrder,
    #[serde(default)]
    pub point_scales: PointScales,
    #[serde(default)]
    pub final_round: FinalClue,
    #[serde(default)]
    pub round1_triple_stumpers: Vec<Vec<usize>>,
    #[serde(default)]
    pub round2_triple_stumpers: Vec<Vec<usize>>,
    #[serde(default)]
    pub is_draft: bool,
    /// When this set was first created (ISO8601 timestamp)
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Short listing entry for set pickers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetSummary {
    pub id: SetId,
    pub title: String,
    pub tags: Vec<String>,
    pub is_draft: bool,
}

impl From<&SetDocument> for SetSummary {
    fn from(doc: &SetDocument) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.title.clone(),
            tags: doc.tags.clone(),
            is_draft: doc.is_draft,
        }
    }
}

/// A finished play-through, handed to the store at the podium
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameRecord {
    pub game_id: GameId,
    pub set_id: SetId,
    pub played_at: String,
    pub steps: u32,
    pub solved: u32,
    pub team_ids: Vec<TeamId>,
    pub names: BTreeMap<TeamId, String>,
    pub colors: BTreeMap<TeamId, String>,
    /// Per-team score after every step, keyed by team id
    pub history: BTreeMap<TeamId, Vec<i64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Board,
}
