/// Puzzle data model: normalized puzzles and the solver's view of a played line

pub mod classify;
pub mod difficulty;
pub mod normalize;
pub mod verdict;

use chess::Color;
use chess_core::notation::{is_uci_move, uci_line_to_san};
use chess_core::Theme;
use serde::{Deserialize, Serialize};

use crate::simulator::{simulate, BoardState, PieceKind, PlyRecord, Side, SimError};

/// A puzzle re-based at the position the solver actually faces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPuzzle {
    pub id: String,
    /// Position before the opponent's setup move
    pub start_fen: String,
    /// Position after the setup move; the solver is to move
    pub puzzle_position_fen: String,
    pub player_side: Side,
    pub setup_move: String,
    pub setup_move_san: String,
    /// UCI moves from the puzzle position, solver first
    pub solution_moves: Vec<String>,
    /// Piece the solver moves first (None when the line has no solver move)
    pub first_move_piece: Option<PieceKind>,
    pub crowd_rating: i32,
    pub popularity: i32,
    pub crowd_themes: Vec<Theme>,
    pub source_url: String,
}

impl NormalizedPuzzle {
    /// Setup move followed by the solution.
    pub fn full_line(&self) -> Vec<String> {
        std::iter::once(self.setup_move.clone())
            .chain(self.solution_moves.iter().cloned())
            .collect()
    }

    /// Replay the whole line from the start position. Ply 0 is the setup move.
    pub fn simulate(&self) -> Result<Vec<PlyRecord>, SimError> {
        simulate(&self.start_fen, &self.full_line())
    }

    /// Origin and destination of the solver's first move, e.g. ("f3", "e5").
    pub fn first_move_squares(&self) -> Option<(&str, &str)> {
        let first = self.solution_moves.first()?;
        if !is_uci_move(first) {
            return None;
        }
        Some((&first[0..2], &first[2..4]))
    }

    /// Solution in SAN from the puzzle position, cut at the first move that does not apply.
    pub fn solution_san(&self) -> Vec<String> {
        uci_line_to_san(&self.puzzle_position_fen, &self.solution_moves)
    }

    pub fn solver_move_count(&self) -> usize {
        self.solution_moves.len().div_ceil(2)
    }
}

/// A played puzzle as the detectors see it: every ply from the setup move on,
/// with the solver's colour fixed.
#[derive(Debug, Clone, Copy)]
pub struct SolutionLine<'a> {
    pub puzzle: &'a NormalizedPuzzle,
    pub plies: &'a [PlyRecord],
    pub pov: Color,
}

impl<'a> SolutionLine<'a> {
    /// `plies` must come from [`NormalizedPuzzle::simulate`], setup move first.
    pub fn new(puzzle: &'a NormalizedPuzzle, plies: &'a [PlyRecord]) -> Self {
        debug_assert!(plies.first().map_or(true, |p| p.uci == puzzle.setup_move));
        Self { puzzle, plies, pov: puzzle.player_side.color() }
    }

    /// Moves made by the solver
    pub fn solver_plies(&self) -> impl Iterator<Item = &'a PlyRecord> + '_ {
        let pov = self.pov;
        self.plies.iter().filter(move |p| p.side.color() == pov)
    }

    /// Moves made by the opponent (including the setup move)
    pub fn opponent_plies(&self) -> impl Iterator<Item = &'a PlyRecord> + '_ {
        let pov = self.pov;
        self.plies.iter().filter(move |p| p.side.color() != pov)
    }

    pub fn solver_ply_count(&self) -> usize {
        self.solver_plies().count()
    }

    pub fn first_solver_ply(&self) -> Option<&'a PlyRecord> {
        self.plies.iter().find(|p| p.side.color() == self.pov)
    }

    pub fn last_solver_ply(&self) -> Option<&'a PlyRecord> {
        self.plies.iter().rev().find(|p| p.side.color() == self.pov)
    }

    /// Position the solver faces
    pub fn initial(&self) -> Option<&'a BoardState> {
        self.plies.first().map(|p| &p.after)
    }

    /// Final position of the line
    pub fn end(&self) -> Option<&'a BoardState> {
        self.plies.last().map(|p| &p.after)
    }

    pub fn ply(&self, index: usize) -> Option<&'a PlyRecord> {
        self.plies.get(index)
    }

    /// Solver plies strictly after `index`.
    pub fn later_solver_plies(&self, index: usize) -> impl Iterator<Item = &'a PlyRecord> + '_ {
        self.solver_plies().filter(move |p| p.ply_index > index)
    }

    pub fn ends_in_mate(&self) -> bool {
        self.last_solver_ply()
            .is_some_and(|p| p.is_checkmate && p.ply_index + 1 == self.plies.len())
    }
}
