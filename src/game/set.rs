//! Validated, canonical form of a loaded set.

use super::daily_double::DailyDoubles;
use super::error::{GameError, GameResult};
use crate::types::{
    Category, Coordinate, CoordinateOrder, FinalClue, PointScales, PointValues, RoundNumber,
    SetDocument, SetId, CLUES_PER_CATEGORY, MAX_ROUND_LENGTH, MIN_ROUND_LENGTH,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriviaSet {
    pub id: SetId,
    pub title: String,
    pub tags: Vec<String>,
    pub has_two_rounds: bool,
    pub round1: Vec<Category>,
    pub round1_len: usize,
    pub round2: Vec<Category>,
    pub round2_len: usize,
    pub daily_doubles: DailyDoubles,
    pub point_scales: PointScales,
    pub final_round: FinalClue,
    pub round1_triple_stumpers: Vec<Coordinate>,
    pub round2_triple_stumpers: Vec<Coordinate>,
}

fn check_round_length(round: RoundNumber, len: usize) -> GameResult<()> {
    if !(MIN_ROUND_LENGTH..=MAX_ROUND_LENGTH).contains(&len) {
        return Err(GameError::malformed(format!(
            "round {:?} length {} is outside {}..={}",
            round, len, MIN_ROUND_LENGTH, MAX_ROUND_LENGTH
        )));
    }
    Ok(())
}

fn check_points(round: RoundNumber, points: &PointValues) -> GameResult<()> {
    if points.windows(2).any(|w| w[0] >= w[1]) {
        return Err(GameError::malformed(format!(
            "round {:?} point values must ascend: {:?}",
            round, points
        )));
    }
    Ok(())
}

/// Check clue/response alignment, pad to five slots and take the first `len`
fn normalize_categories(
    round: RoundNumber,
    categories: &[Category],
    len: usize,
) -> GameResult<Vec<Category>> {
    if categories.len() < len {
        return Err(GameError::malformed(format!(
            "round {:?} needs {} categories, found {}",
            round,
            len,
            categories.len()
        )));
    }

    let mut out = Vec::with_capacity(len);
    for (index, category) in categories.iter().take(len).enumerate() {
        if category.clues.len() != category.responses.len() {
            return Err(GameError::malformed(format!(
                "category '{}' has {} clues but {} responses",
                category.name,
                category.clues.len(),
                category.responses.len()
            )));
        }
        if category.clues.len() > CLUES_PER_CATEGORY {
            return Err(GameError::malformed(format!(
                "category '{}' has more than {} clues",
                category.name, CLUES_PER_CATEGORY
            )));
        }
        let mut category = category.clone();
        category.index = index;
        category.clues.resize(CLUES_PER_CATEGORY, String::new());
        category.responses.resize(CLUES_PER_CATEGORY, String::new());
        out.push(category);
    }
    Ok(out)
}

fn decode(order: CoordinateOrder, pair: &[usize]) -> GameResult<Option<Coordinate>> {
    order.decode(pair).map_err(GameError::MalformedSet)
}

fn check_in_bounds(round: RoundNumber, at: Coordinate, len: usize) -> GameResult<()> {
    if at.category >= len || at.clue >= CLUES_PER_CATEGORY {
        return Err(GameError::malformed(format!(
            "coordinate {:?} is outside the round {:?} board",
            at, round
        )));
    }
    Ok(())
}

fn check_daily_double(
    round: RoundNumber,
    at: Option<Coordinate>,
    categories: &[Category],
) -> GameResult<()> {
    if let Some(at) = at {
        check_in_bounds(round, at, categories.len())?;
        if !categories[at.category].has_clue(at.clue) {
            return Err(GameError::malformed(format!(
                "daily double {:?} in round {:?} has no clue",
                at, round
            )));
        }
    }
    Ok(())
}

fn decode_stumpers(
    round: RoundNumber,
    order: CoordinateOrder,
    pairs: &[Vec<usize>],
    len: usize,
) -> GameResult<Vec<Coordinate>> {
    let mut out = Vec::new();
    for pair in pairs {
        if let Some(at) = decode(order, pair)? {
            check_in_bounds(round, at, len)?;
            out.push(at);
        }
    }
    Ok(out)
}

impl TriviaSet {
    /// Validate a stored document and translate its coordinates.
    ///
    /// This is the only place stored `[a, b]` pairs are interpreted.
    pub fn from_document(doc: &SetDocument) -> GameResult<TriviaSet> {
        let order = doc.coordinate_order;

        check_round_length(RoundNumber::One, doc.round1_len)?;
        check_points(RoundNumber::One, &doc.point_scales.round_one)?;
        let round1 = normalize_categories(RoundNumber::One, &doc.round1, doc.round1_len)?;
        let round_one_dd = decode(order, &doc.round_one_daily)?;
        check_daily_double(RoundNumber::One, round_one_dd, &round1)?;
        let round1_triple_stumpers = decode_stumpers(
            RoundNumber::One,
            order,
            &doc.round1_triple_stumpers,
            doc.round1_len,
        )?;

        let mut daily_doubles = DailyDoubles {
            round_one: round_one_dd,
            ..Default::default()
        };
        let (round2, round2_len, round2_triple_stumpers) = if doc.has_two_rounds {
            check_round_length(RoundNumber::Two, doc.round2_len)?;
            check_points(RoundNumber::Two, &doc.point_scales.round_two)?;
            let round2 = normalize_categories(RoundNumber::Two, &doc.round2, doc.round2_len)?;
            let first = decode(order, &doc.round_two_daily1)?;
            let second = decode(order, &doc.round_two_daily2)?;
            check_daily_double(RoundNumber::Two, first, &round2)?;
            check_daily_double(RoundNumber::Two, second, &round2)?;
            if let (Some(a), Some(b)) = (first, second) {
                if a.category == b.category {
                    return Err(GameError::malformed(
                        "round two daily doubles share a category",
                    ));
                }
            }
            daily_doubles.round_two = [first, second];
            let stumpers = decode_stumpers(
                RoundNumber::Two,
                order,
                &doc.round2_triple_stumpers,
                doc.round2_len,
            )?;
            (round2, doc.round2_len, stumpers)
        } else {
            (Vec::new(), 0, Vec::new())
        };

        Ok(TriviaSet {
            id: doc.id.clone(),
            title: doc.title.clone(),
            tags: doc.tags.clone(),
            has_two_rounds: doc.has_two_rounds,
            round1,
            round1_len: doc.round1_len,
            round2,
            round2_len,
            daily_doubles,
            point_scales: doc.point_scales,
            final_round: doc.final_round.clone(),
            round1_triple_stumpers,
            round2_triple_stumpers,
        })
    }

    /// Store form, always written category-first
    pub fn to_document(&self) -> SetDocument {
        let order = CoordinateOrder::CategoryFirst;
        let encode_all = |coords: &[Coordinate]| {
            coords
                .iter()
                .map(|c| order.encode(Some(*c)))
                .collect::<Vec<_>>()
        };
        SetDocument {
            id: self.id.clone(),
            title: self.title.clone(),
            tags: self.tags.clone(),
            round1_len: self.round1_len,
            round2_len: self.round2_len,
            has_two_rounds: self.has_two_rounds,
            round1: self.round1.clone(),
            round2: self.round2.clone(),
            round_one_daily: order.encode(self.daily_doubles.round_one),
            round_two_daily1: order.encode(self.daily_doubles.round_two[0]),
            round_two_daily2: order.encode(self.daily_doubles.round_two[1]),
            coordinate_order: order,
            point_scales: self.point_scales,
            final_round: self.final_round.clone(),
            round1_triple_stumpers: encode_all(&self.round1_triple_stumpers),
            round2_triple_stumpers: encode_all(&self.round2_triple_stumpers),
            is_draft: false,
            created_at: None,
        }
    }

    pub fn categories(&self, round: RoundNumber) -> &[Category] {
        match round {
            RoundNumber::One => &self.round1,
            RoundNumber::Two => &self.round2,
        }
    }

    pub fn round_length(&self, round: RoundNumber) -> usize {
        match round {
            RoundNumber::One => self.round1_len,
            RoundNumber::Two => self.round2_len,
        }
    }

    pub fn is_triple_stumper(&self, round: RoundNumber, at: Coordinate) -> bool {
        match round {
            RoundNumber::One => self.round1_triple_stumpers.contains(&at),
            RoundNumber::Two => self.round2_triple_stumpers.contains(&at),
        }
    }
}
