/// Structural difficulty score, on a rating-like scale

use serde::{Deserialize, Serialize};

use super::SolutionLine;
use crate::board_utils::total_material;
use crate::tactics::positional::is_quiet;

const BASE: f64 = 600.0;
const PER_EXTRA_SOLVER_MOVE: f64 = 170.0;
const LOOK_PAST_CHECK: f64 = 180.0;
const PER_MATERIAL_POINT: f64 = 4.0;
const PER_QUIET_MOVE: f64 = 110.0;
const SACRIFICE: f64 = 90.0;
const NO_MOTIF: f64 = 60.0;

pub const MIN_DIFFICULTY: f64 = 400.0;
pub const MAX_DIFFICULTY: f64 = 3000.0;

/// What makes a line hard to find, independent of crowd ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyFactors {
    pub solver_moves: usize,
    /// The winning motif lies beyond a forcing check the solver must see through
    pub looks_past_check: bool,
    /// Both sides' material in pawn units, as a proxy for board clutter
    pub material_on_board: i32,
    pub quiet_moves: usize,
    pub sacrifice: bool,
    pub motif_found: bool,
}

impl DifficultyFactors {
    /// `motif_ply` is the ply of the primary motif's evidence, if one was found.
    pub fn from_line(line: &SolutionLine, motif_ply: Option<usize>, sacrifice: bool) -> Self {
        let last_ply = line.plies.len().saturating_sub(1);
        let horizon = motif_ply.unwrap_or(last_ply);

        Self {
            solver_moves: line.solver_ply_count(),
            looks_past_check: line
                .solver_plies()
                .any(|p| p.ply_index < horizon && p.is_check),
            material_on_board: line.initial().map_or(0, |s| total_material(s.board())),
            quiet_moves: line
                .solver_plies()
                .filter(|p| p.ply_index != last_ply && is_quiet(line, p))
                .count(),
            sacrifice,
            motif_found: motif_ply.is_some(),
        }
    }

    pub fn score(&self) -> f64 {
        let mut score = BASE
            + PER_EXTRA_SOLVER_MOVE * self.solver_moves.saturating_sub(1) as f64
            + PER_MATERIAL_POINT * self.material_on_board as f64
            + PER_QUIET_MOVE * self.quiet_moves as f64;
        if self.looks_past_check {
            score += LOOK_PAST_CHECK;
        }
        if self.sacrifice {
            score += SACRIFICE;
        }
        if !self.motif_found {
            score += NO_MOTIF;
        }
        score.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
    }
}
