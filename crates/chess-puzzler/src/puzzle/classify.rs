/// Classifier: runs every detector over a played line and weighs the
/// evidence into a single verdict

use std::cmp::Ordering;

use chess_core::Theme;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::difficulty::DifficultyFactors;
use super::verdict::{Evidence, OutcomeKind, TacticVerdict};
use super::{NormalizedPuzzle, SolutionLine};
use crate::board_utils::material_diff;
use crate::simulator::PlyRecord;
use crate::tactics::{attacks, line_geometry, mate_patterns, material, positional, simple};

/// Material swing, in pawn units, that counts as a decisive gain
pub const DECISIVE_MATERIAL_GAIN: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassifierConfig {
    /// Evidence below this confidence is discarded
    pub min_confidence: f64,
    /// Smallest piece value a fork target may have (kings always count)
    pub fork_target_min_value: i32,
    /// Added to a detection the crowd tags agree with
    pub crowd_agreement_bonus: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            fork_target_min_value: 3,
            crowd_agreement_bonus: 0.1,
        }
    }
}

/// Classify with the default configuration.
pub fn classify(puzzle: &NormalizedPuzzle, plies: &[PlyRecord]) -> TacticVerdict {
    classify_with(puzzle, plies, &ClassifierConfig::default())
}

/// Classify a puzzle from its simulated line (setup move at ply 0).
///
/// Deterministic: the same puzzle, plies and config always produce the same verdict.
pub fn classify_with(puzzle: &NormalizedPuzzle, plies: &[PlyRecord], config: &ClassifierConfig) -> TacticVerdict {
    let line = SolutionLine::new(puzzle, plies);

    let mut candidates = detect(&line, config);
    for evidence in &mut candidates {
        // Crowd tags only reinforce what a detector already found
        if puzzle.crowd_themes.contains(&evidence.theme) {
            evidence.boost(config.crowd_agreement_bonus);
        }
    }

    let best_rejected = candidates
        .iter()
        .filter(|e| e.theme.is_motif() && e.confidence < config.min_confidence)
        .map(|e| e.confidence)
        .fold(0.0_f64, f64::max);

    let mut accepted: Vec<Evidence> = candidates
        .into_iter()
        .filter(|e| e.confidence >= config.min_confidence)
        .collect();
    accepted.sort_by(precedence);

    let primary = accepted.iter().find(|e| e.theme.is_motif());
    let primary_theme = primary.map_or(Theme::Other, |e| e.theme.clone());
    let confidence = primary.map_or(best_rejected, |e| e.confidence);
    let sacrifice = accepted.iter().any(|e| e.theme == Theme::Sacrifice);
    let factors = DifficultyFactors::from_line(&line, primary.map(|e| e.ply), sacrifice);

    let mut secondary: Vec<Theme> = Vec::new();
    let mut push = |theme: Theme| {
        if theme != primary_theme && !secondary.contains(&theme) {
            secondary.push(theme);
        }
    };
    for evidence in &accepted {
        push(evidence.theme.clone());
    }
    if let Some(mate_in) = simple::mate_in(&line) {
        push(Theme::Mate);
        push(mate_in);
    }
    if let Some(length) = simple::length_tag(&line) {
        push(length);
    }
    for tag in material::endgame_tags(&line) {
        push(tag);
    }

    let disputed_crowd_themes: Vec<Theme> = puzzle
        .crowd_themes
        .iter()
        .filter(|t| t.is_motif() && !accepted.iter().any(|e| &e.theme == *t))
        .cloned()
        .collect();

    let verdict = TacticVerdict {
        puzzle_id: puzzle.id.clone(),
        low_confidence: primary.is_none(),
        primary_theme,
        secondary_themes: secondary,
        true_difficulty_score: factors.score(),
        confidence,
        outcome_kind: outcome_kind(&line),
        crowd_rating: puzzle.crowd_rating,
        disputed_crowd_themes,
        evidence: accepted,
    };

    debug!(
        puzzle_id = %verdict.puzzle_id,
        primary = %verdict.primary_theme,
        confidence = verdict.confidence,
        difficulty = verdict.true_difficulty_score,
        "classified"
    );
    verdict
}

/// Every detector, in no particular order; precedence is decided afterwards.
fn detect(line: &SolutionLine, config: &ClassifierConfig) -> Vec<Evidence> {
    let mut found = Vec::new();

    found.extend(mate_patterns::mate_pattern(line));
    found.extend(attacks::fork(line, config.fork_target_min_value));
    found.extend(attacks::hanging_piece(line));
    found.extend(attacks::trapped_piece(line));
    found.extend(line_geometry::discovered_attack(line));
    found.extend(line_geometry::pin(line));
    found.extend(line_geometry::skewer(line));
    found.extend(line_geometry::x_ray(line));
    found.extend(positional::attraction(line));
    found.extend(positional::deflection(line));
    found.extend(positional::interference(line));
    found.extend(positional::intermezzo(line));
    found.extend(positional::clearance(line));
    found.extend(positional::quiet_move(line));
    found.extend(material::sacrifice(line));
    found.extend(simple::double_check(line));
    found.extend(simple::en_passant(line));
    found.extend(simple::promotion(line));
    found.extend(simple::under_promotion(line));
    found.extend(simple::castling(line));
    found.extend(simple::advanced_pawn(line));

    found
}

/// Earliest ply first; at the same ply a named mate beats a generic motif,
/// then higher confidence wins. Theme order makes the result total.
fn precedence(a: &Evidence, b: &Evidence) -> Ordering {
    a.ply
        .cmp(&b.ply)
        .then_with(|| b.theme.is_mate_pattern().cmp(&a.theme.is_mate_pattern()))
        .then_with(|| b.confidence.total_cmp(&a.confidence))
        .then_with(|| a.theme.cmp(&b.theme))
}

/// How the line ends for the solver.
pub fn outcome_kind(line: &SolutionLine) -> OutcomeKind {
    if line.ends_in_mate() {
        return OutcomeKind::Checkmate;
    }
    let (Some(initial), Some(end)) = (line.initial(), line.end()) else {
        return OutcomeKind::Positional;
    };
    let gain = material_diff(end.board(), line.pov) - material_diff(initial.board(), line.pov);
    if gain >= DECISIVE_MATERIAL_GAIN {
        OutcomeKind::DecisiveMaterialGain
    } else {
        OutcomeKind::Positional
    }
}
