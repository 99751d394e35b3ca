/// Material-based detectors: sacrifice and endgame types

use chess::{Board, Piece};
use chess_core::Theme;

use crate::board_utils::material_diff;
use crate::puzzle::verdict::Evidence;
use crate::puzzle::SolutionLine;
use crate::simulator::PlyRecord;

/// Sacrifice: the solver is down at least two pawns of material at some point
/// after their first move. Opponent promotions explain material swings and
/// rule the tag out.
pub fn sacrifice(line: &SolutionLine) -> Option<Evidence> {
    let initial = material_diff(line.initial()?.board(), line.pov);
    let solver: Vec<_> = line.solver_plies().collect();

    // Losses on the first move of a longer line show up after the reply
    let checked = if solver.len() > 1 { &solver[1..] } else { &solver[..] };

    let dropped = checked
        .iter()
        .find(|p| material_diff(p.board_after(), line.pov) - initial <= -2)?;

    let opponent_promoted = line
        .opponent_plies()
        .skip(1)
        .any(|p| p.promotion.is_some());
    if opponent_promoted {
        return None;
    }

    // The sacrificed piece is the one the solver gave up before this position
    let given_up = line
        .plies
        .iter()
        .take(dropped.ply_index)
        .rev()
        .find(|p| p.side.color() != line.pov && p.is_capture())
        .and_then(|capture| line.ply(capture.ply_index.checked_sub(1)?))
        .unwrap_or(dropped);

    let deficit = initial - material_diff(dropped.board_after(), line.pov);
    Some(
        Evidence::at(Theme::Sacrifice, 0.7, given_up)
            .squares([given_up.to])
            .because(format!("solver gives up {deficit} points of material")),
    )
}

fn only_pieces(board: &Board, allowed: &[Piece]) -> bool {
    board.combined().into_iter().all(|sq| {
        board
            .piece_on(sq)
            .is_some_and(|p| p == Piece::King || p == Piece::Pawn || allowed.contains(&p))
    })
}

/// Positions the endgame tags are judged on: the puzzle position and the one
/// after the solver's first move.
fn opening_boards(plies: &[PlyRecord]) -> impl Iterator<Item = &Board> {
    plies.iter().take(2).map(|p| p.board_after())
}

/// Only kings, pawns and at least one piece of `piece`
pub fn piece_endgame(line: &SolutionLine, piece: Piece) -> bool {
    !line.plies.is_empty()
        && opening_boards(line.plies).all(|board| *board.pieces(piece) != chess::EMPTY && only_pieces(board, &[piece]))
}

/// Exactly one queen, at least one rook, no minor pieces
pub fn queen_rook_endgame(line: &SolutionLine) -> bool {
    !line.plies.is_empty()
        && opening_boards(line.plies).all(|board| {
            board.pieces(Piece::Queen).popcnt() == 1
                && *board.pieces(Piece::Rook) != chess::EMPTY
                && only_pieces(board, &[Piece::Queen, Piece::Rook])
        })
}

/// Endgame tags for the line, most specific first.
pub fn endgame_tags(line: &SolutionLine) -> Vec<Theme> {
    let kinds = [
        (Piece::Pawn, Theme::PawnEndgame),
        (Piece::Knight, Theme::KnightEndgame),
        (Piece::Bishop, Theme::BishopEndgame),
        (Piece::Rook, Theme::RookEndgame),
        (Piece::Queen, Theme::QueenEndgame),
    ];

    let mut tags: Vec<Theme> = kinds
        .into_iter()
        .filter(|(piece, _)| piece_endgame(line, *piece))
        .map(|(_, theme)| theme)
        .collect();
    if queen_rook_endgame(line) {
        tags.push(Theme::QueenRookEndgame);
    }
    if !tags.is_empty() {
        tags.push(Theme::Endgame);
    }
    tags
}
