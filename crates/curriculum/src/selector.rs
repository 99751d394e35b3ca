//! Lesson selector: six puzzles from a classified pool, easy to hard.
//!
//! Candidates are filtered by the request, constraints are relaxed in a
//! fixed order when the pool runs short, and the survivors are sorted by
//! difficulty and split into thirds. Two slots are filled from each third,
//! always moving forward through the sorted list, so difficulty never
//! decreases from slot to slot.

use std::collections::HashSet;

use chess_core::Theme;
use chess_puzzler::PieceKind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::corpus::{ClassifiedPuzzle, CorpusIndex};

pub const LESSON_SIZE: usize = 6;

/// Rating-band widening steps, applied to each side in turn before the band
/// is dropped altogether.
pub const RATING_WIDEN_STEPS: [f64; 2] = [200.0, 400.0];

/// At most this many slots may open with the same piece type.
pub const MAX_SAME_FIRST_PIECE: usize = 3;

/// Inclusive band over `trueDifficultyScore`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingBand {
    pub min: f64,
    pub max: f64,
}

impl RatingBand {
    /// Wide enough for any score the classifier produces.
    pub const FULL: RatingBand = RatingBand { min: 0.0, max: 10_000.0 };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, score: f64) -> bool {
        score >= self.min && score <= self.max
    }

    pub fn widen(&self, by: f64) -> Self {
        Self { min: (self.min - by).max(Self::FULL.min), max: (self.max + by).min(Self::FULL.max) }
    }
}

impl Default for RatingBand {
    fn default() -> Self {
        Self::FULL
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionCriteria {
    pub themes: Vec<Theme>,
    /// Any listed theme qualifies instead of all of them
    pub mixed_practice: bool,
    pub rating_band: RatingBand,
    pub min_popularity: Option<i32>,
    pub exclude_themes: Vec<Theme>,
    pub exclude_puzzle_ids: Vec<String>,
    /// Piece the solution must move first
    pub required_piece: Option<PieceKind>,
    /// Varies which candidate opens each tier; `None` is fully deterministic
    pub seed: Option<u64>,
}

impl SelectionCriteria {
    /// A lesson on one or more themes that every puzzle must carry.
    pub fn focused(themes: Vec<Theme>) -> Self {
        Self { themes, ..Default::default() }
    }

    /// A practice lesson where any of the themes will do.
    pub fn mixed(themes: Vec<Theme>) -> Self {
        Self { themes, mixed_practice: true, ..Default::default() }
    }

    pub fn with_band(mut self, band: RatingBand) -> Self {
        self.rating_band = band;
        self
    }

    pub fn excluding(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.exclude_puzzle_ids.extend(ids);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tier {
    Easy,
    Medium,
    Hard,
}

impl Tier {
    fn from_index(i: usize) -> Tier {
        match i {
            0 => Tier::Easy,
            1 => Tier::Medium,
            _ => Tier::Hard,
        }
    }
}

/// A request constraint loosened because too few candidates matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Relaxation {
    DroppedPieceFilter { piece: PieceKind },
    WidenedRatingBand { min: f64, max: f64 },
    DroppedPopularityFloor { floor: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiversityRule {
    /// Consecutive slots start with different from/to squares
    DistinctFirstMove,
    /// Consecutive mixed-practice slots have different primary themes
    DistinctTheme,
    /// No more than three slots open with the same piece type
    PieceBalance,
}

/// A diversity rule that had to be broken to fill a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiversityRelaxation {
    pub slot: usize,
    pub rule: DiversityRule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SelectionWarning {
    InsufficientCandidates { available: usize, required: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionDiagnostics {
    pub pool_size: usize,
    /// Candidates matching the request as given
    pub initial_candidates: usize,
    /// Candidates after relaxation
    pub final_candidates: usize,
    pub relaxations: Vec<Relaxation>,
    pub diversity_relaxations: Vec<DiversityRelaxation>,
    pub warning: Option<SelectionWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonSlot {
    /// 1-based slot number
    pub position: usize,
    pub puzzle_id: String,
    pub tier: Tier,
    pub theme: Theme,
    pub true_difficulty_score: f64,
    pub first_move: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonSelection {
    pub slots: Vec<LessonSlot>,
    pub diagnostics: SelectionDiagnostics,
}

impl LessonSelection {
    pub fn puzzle_ids(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.puzzle_id.as_str()).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.len() == LESSON_SIZE
    }
}

/// The request's constraints in their current (possibly relaxed) form.
struct Filter<'c> {
    criteria: &'c SelectionCriteria,
    band: RatingBand,
    piece: Option<PieceKind>,
    min_popularity: Option<i32>,
    excluded: HashSet<&'c str>,
}

impl<'c> Filter<'c> {
    fn new(criteria: &'c SelectionCriteria) -> Self {
        Self {
            criteria,
            band: criteria.rating_band,
            piece: criteria.required_piece,
            min_popularity: criteria.min_popularity,
            excluded: criteria.exclude_puzzle_ids.iter().map(String::as_str).collect(),
        }
    }

    fn matches_themes(&self, cp: &ClassifiedPuzzle) -> bool {
        let wanted = &self.criteria.themes;
        if wanted.is_empty() {
            return true;
        }
        if self.criteria.mixed_practice {
            wanted.iter().any(|t| cp.verdict.has_theme(t))
        } else {
            wanted.iter().all(|t| cp.verdict.has_theme(t))
        }
    }

    fn matches(&self, cp: &ClassifiedPuzzle) -> bool {
        !self.excluded.contains(cp.id())
            && self.band.contains(cp.difficulty())
            && self.min_popularity.map_or(true, |floor| cp.puzzle.popularity >= floor)
            && self.piece.map_or(true, |p| cp.puzzle.first_move_piece == Some(p))
            && self.matches_themes(cp)
            && !self.criteria.exclude_themes.iter().any(|t| cp.verdict.has_theme(t))
    }

    /// Matching puzzles, one per id, sorted by difficulty then id.
    fn apply<'p>(&self, pool: &'p [ClassifiedPuzzle]) -> Vec<&'p ClassifiedPuzzle> {
        let mut seen = HashSet::new();
        let mut out: Vec<&ClassifiedPuzzle> = pool
            .iter()
            .filter(|cp| self.matches(cp))
            .filter(|cp| seen.insert(cp.id()))
            .collect();
        out.sort_by(|a, b| a.difficulty().total_cmp(&b.difficulty()).then_with(|| a.id().cmp(b.id())));
        out
    }
}

fn relax<'p>(
    pool: &'p [ClassifiedPuzzle],
    filter: &Filter,
    diagnostics: &mut SelectionDiagnostics,
    relaxation: Relaxation,
    candidates: &mut Vec<&'p ClassifiedPuzzle>,
) {
    *candidates = filter.apply(pool);
    debug!(?relaxation, candidates = candidates.len(), "Relaxed lesson constraint");
    diagnostics.relaxations.push(relaxation);
}

/// Filter, relaxing constraints in order until a full lesson is available.
fn gather<'p>(
    pool: &'p [ClassifiedPuzzle],
    criteria: &SelectionCriteria,
    diagnostics: &mut SelectionDiagnostics,
) -> Vec<&'p ClassifiedPuzzle> {
    let mut filter = Filter::new(criteria);
    let mut candidates = filter.apply(pool);
    diagnostics.initial_candidates = candidates.len();

    if candidates.len() < LESSON_SIZE {
        if let Some(piece) = filter.piece.take() {
            relax(pool, &filter, diagnostics, Relaxation::DroppedPieceFilter { piece }, &mut candidates);
        }
    }

    let widened = RATING_WIDEN_STEPS
        .iter()
        .map(|&by| criteria.rating_band.widen(by))
        .chain(std::iter::once(RatingBand::FULL));
    for band in widened {
        if candidates.len() >= LESSON_SIZE {
            break;
        }
        if band == filter.band {
            continue;
        }
        filter.band = band;
        relax(pool, &filter, diagnostics, Relaxation::WidenedRatingBand { min: band.min, max: band.max }, &mut candidates);
    }

    if candidates.len() < LESSON_SIZE {
        if let Some(floor) = filter.min_popularity.take() {
            relax(pool, &filter, diagnostics, Relaxation::DroppedPopularityFloor { floor }, &mut candidates);
        }
    }

    diagnostics.final_candidates = candidates.len();
    candidates
}

/// Diversity check of `candidate` against the slots chosen so far.
fn satisfies(rule: DiversityRule, candidate: &ClassifiedPuzzle, chosen: &[&ClassifiedPuzzle]) -> bool {
    let Some(prev) = chosen.last() else {
        return true;
    };
    match rule {
        DiversityRule::DistinctFirstMove => match (prev.puzzle.first_move_squares(), candidate.puzzle.first_move_squares()) {
            (Some(a), Some(b)) => a != b,
            _ => true,
        },
        DiversityRule::DistinctTheme => prev.verdict.primary_theme != candidate.verdict.primary_theme,
        DiversityRule::PieceBalance => match candidate.puzzle.first_move_piece {
            Some(piece) => {
                chosen.iter().filter(|c| c.puzzle.first_move_piece == Some(piece)).count() < MAX_SAME_FIRST_PIECE
            }
            None => true,
        },
    }
}

/// Pick one index in `range`, honouring as many diversity rules as possible.
/// Rules are given up softest first: piece balance, then theme, then squares.
fn pick_slot(
    candidates: &[&ClassifiedPuzzle],
    range: std::ops::Range<usize>,
    chosen: &[&ClassifiedPuzzle],
    mixed_practice: bool,
    mut rng: Option<&mut StdRng>,
) -> (usize, Vec<DiversityRule>) {
    let mut rules = vec![DiversityRule::DistinctFirstMove];
    if mixed_practice {
        rules.push(DiversityRule::DistinctTheme);
    }
    rules.push(DiversityRule::PieceBalance);

    let mut dropped = Vec::new();
    loop {
        let valid: Vec<usize> = range
            .clone()
            .filter(|&i| rules.iter().all(|&r| satisfies(r, candidates[i], chosen)))
            .collect();

        if !valid.is_empty() {
            let pick = match rng.as_deref_mut() {
                Some(rng) => valid[rng.gen_range(0..valid.len())],
                None => valid[0],
            };
            return (pick, dropped);
        }
        match rules.pop() {
            Some(rule) => dropped.push(rule),
            None => return (range.start, dropped),
        }
    }
}

fn slot_theme(cp: &ClassifiedPuzzle, criteria: &SelectionCriteria) -> Theme {
    let primary = &cp.verdict.primary_theme;
    if criteria.themes.is_empty() || criteria.themes.contains(primary) {
        return primary.clone();
    }
    criteria
        .themes
        .iter()
        .find(|t| cp.verdict.has_theme(t))
        .unwrap_or(primary)
        .clone()
}

fn slot(position: usize, tier: Tier, cp: &ClassifiedPuzzle, criteria: &SelectionCriteria) -> LessonSlot {
    LessonSlot {
        position,
        puzzle_id: cp.id().to_string(),
        tier,
        theme: slot_theme(cp, criteria),
        true_difficulty_score: cp.difficulty(),
        first_move: cp.puzzle.solution_moves.first().cloned(),
    }
}

/// Select a six-puzzle lesson from `pool`.
///
/// Returns fewer than six slots only when the pool is too small even after
/// every relaxation; `diagnostics.warning` says so.
pub fn select_lesson(pool: &[ClassifiedPuzzle], criteria: &SelectionCriteria) -> LessonSelection {
    let mut diagnostics = SelectionDiagnostics { pool_size: pool.len(), ..Default::default() };
    let candidates = gather(pool, criteria, &mut diagnostics);
    let n = candidates.len();

    if n < LESSON_SIZE {
        warn!(available = n, required = LESSON_SIZE, "Not enough puzzles for a full lesson");
        diagnostics.warning = Some(SelectionWarning::InsufficientCandidates { available: n, required: LESSON_SIZE });
        let slots = candidates
            .iter()
            .enumerate()
            .map(|(i, cp)| slot(i + 1, Tier::from_index(i * 3 / n), cp, criteria))
            .collect();
        return LessonSelection { slots, diagnostics };
    }

    let tiers = [(0, n / 3), (n / 3, 2 * n / 3), (2 * n / 3, n)];
    let mut rng = criteria.seed.map(StdRng::seed_from_u64);
    let mut chosen: Vec<&ClassifiedPuzzle> = Vec::with_capacity(LESSON_SIZE);
    let mut slots = Vec::with_capacity(LESSON_SIZE);
    let mut last: Option<usize> = None;

    for (t, &(start, end)) in tiers.iter().enumerate() {
        for k in 0..2 {
            let lo = last.map_or(start, |l| (l + 1).max(start));
            // The first pick leaves room for the second
            let hi = if k == 0 { end - 1 } else { end };
            let opener_rng = if k == 0 { rng.as_mut() } else { None };

            let (pick, dropped) = pick_slot(&candidates, lo..hi, &chosen, criteria.mixed_practice, opener_rng);
            let position = slots.len() + 1;
            diagnostics
                .diversity_relaxations
                .extend(dropped.into_iter().map(|rule| DiversityRelaxation { slot: position, rule }));

            let cp = candidates[pick];
            slots.push(slot(position, Tier::from_index(t), cp, criteria));
            chosen.push(cp);
            last = Some(pick);
        }
    }

    LessonSelection { slots, diagnostics }
}

impl CorpusIndex {
    pub fn select_lesson(&self, criteria: &SelectionCriteria) -> LessonSelection {
        select_lesson(self.puzzles(), criteria)
    }
}
