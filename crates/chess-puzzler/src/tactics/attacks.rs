/// Attack-based detectors: fork, hanging_piece, trapped_piece

use chess::{BitBoard, Piece, Square, EMPTY};
use chess_core::Theme;

use crate::board_utils::{attacked_opponent_squares, attackers, is_hanging, is_in_bad_spot, is_trapped, king_value, material_diff, piece_value};
use crate::puzzle::verdict::Evidence;
use crate::puzzle::SolutionLine;
use crate::simulator::PlyRecord;

const FORK_BASE: f64 = 0.6;
const FORK_FOLLOW_UP: f64 = 0.25;
const FORK_ROYAL: f64 = 0.1;

/// Pieces a move attacks that count as fork targets: the king, or a piece worth
/// at least `min_target_value` that is worth more than the forker or is
/// undefended and cannot take the forker back.
pub fn fork_targets(ply: &PlyRecord, min_target_value: i32) -> Vec<(Piece, Square)> {
    let board = ply.board_after();
    let forker = ply.to;
    let forker_value = king_value(ply.landed_piece().piece());
    let pov = ply.side.color();

    attacked_opponent_squares(board, forker, pov)
        .into_iter()
        .filter(|&(piece, square)| {
            if piece == Piece::King {
                return true;
            }
            if piece_value(piece) < min_target_value {
                return false;
            }
            let hits_back = (attackers(board, !pov, forker) & BitBoard::from_square(square)) != EMPTY;
            king_value(piece) > forker_value || (is_hanging(board, !pov, square) && !hits_back)
        })
        .collect()
}

/// Fork: one solver move attacks two or more valuable targets at once
pub fn fork(line: &SolutionLine, min_target_value: i32) -> Vec<Evidence> {
    let mut found = Vec::new();

    for ply in line.solver_plies() {
        if ply.landed_piece() == crate::simulator::PieceKind::King {
            continue;
        }
        // A forker that simply drops off is no fork
        if is_in_bad_spot(ply.board_after(), ply.to) {
            continue;
        }

        let targets = fork_targets(ply, min_target_value);
        if targets.len() < 2 {
            continue;
        }

        let mut confidence = FORK_BASE;
        let cashed_in = line
            .later_solver_plies(ply.ply_index)
            .any(|later| later.is_capture() && targets.iter().any(|&(_, sq)| sq == later.to));
        if cashed_in {
            confidence += FORK_FOLLOW_UP;
        }
        if targets.iter().any(|&(p, _)| p == Piece::King) {
            confidence += FORK_ROYAL;
        }

        let names: Vec<String> = targets.iter().map(|(p, sq)| format!("{p:?} on {sq}").to_lowercase()).collect();
        found.push(
            Evidence::at(Theme::Fork, confidence, ply)
                .squares(targets.iter().map(|&(_, sq)| sq))
                .because(format!("{:?} on {} attacks {}", ply.landed_piece(), ply.to, names.join(" and ")).to_lowercase()),
        );
    }

    found
}

/// Hanging piece: the first solver move captures an undefended piece that
/// was not just traded for.
pub fn hanging_piece(line: &SolutionLine) -> Option<Evidence> {
    let setup = line.ply(0)?;
    let first = line.first_solver_ply()?;
    let board = setup.board_after();

    let captured = board.piece_on(first.to)?;
    if captured == Piece::Pawn {
        return None;
    }
    let victim_color = board.color_on(first.to)?;
    if !is_hanging(board, victim_color, first.to) {
        return None;
    }

    // The opponent's setup move was a capture of equal or greater value on the same square
    if let Some(traded) = setup.captured {
        if setup.to == first.to && traded.value() >= piece_value(captured) {
            return None;
        }
    }

    // Longer lines must keep the material
    if let Some(later) = line.ply(3) {
        let after_capture = material_diff(first.board_after(), line.pov);
        if material_diff(later.board_after(), line.pov) < after_capture {
            return None;
        }
    }

    Some(
        Evidence::at(Theme::HangingPiece, 0.75, first)
            .squares([first.to])
            .because(format!("undefended {captured:?} captured on {}", first.to).to_lowercase()),
    )
}

/// Trapped piece: a piece with no safe square is eventually won
pub fn trapped_piece(line: &SolutionLine) -> Option<Evidence> {
    for ply in line.solver_plies().skip(1) {
        match ply.captured {
            Some(kind) if kind.piece() != Piece::Pawn => {}
            _ => continue,
        }

        let previous = line.ply(ply.ply_index.checked_sub(1)?)?;
        let square = if previous.to == ply.to { previous.from } else { ply.to };

        let Some(before) = ply.ply_index.checked_sub(2).and_then(|i| line.ply(i)) else {
            continue;
        };
        if is_trapped(before.board_after(), square) {
            return Some(
                Evidence::at(Theme::TrappedPiece, 0.7, ply)
                    .squares([square])
                    .because(format!("piece on {square} had no safe square")),
            );
        }
    }
    None
}
