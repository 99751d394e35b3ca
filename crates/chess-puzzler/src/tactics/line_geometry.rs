/// Line geometry detectors: discovered_attack, x_ray, pin, skewer

use chess::{BitBoard, Piece, Square, EMPTY};
use chess_core::Theme;

use crate::board_utils::{attacks, between, is_hanging, is_in_bad_spot, is_ray_piece, king_value, piece_value, ray_pairs};
use crate::puzzle::verdict::Evidence;
use crate::puzzle::SolutionLine;

/// Enemy pieces a friendly slider newly attacks because the moving piece left its line.
pub(crate) fn uncovered_targets(line: &SolutionLine, ply: &crate::simulator::PlyRecord) -> Vec<(Square, Square)> {
    let before = ply.board_before();
    let after = ply.board_after();
    let pov = line.pov;
    let enemy = *after.color_combined(!pov);
    let own_sliders = *after.color_combined(pov)
        & (*after.pieces(Piece::Bishop) | *after.pieces(Piece::Rook) | *after.pieces(Piece::Queen))
        & !BitBoard::from_square(ply.to);

    let mut found = Vec::new();
    for slider in own_sliders {
        let fresh = attacks(after, slider) & !attacks(before, slider) & enemy;
        for target in fresh {
            if between(slider, target) & BitBoard::from_square(ply.from) == EMPTY {
                continue;
            }
            let target_piece = match after.piece_on(target) {
                Some(p) => p,
                None => continue,
            };
            let slider_piece = after.piece_on(slider).unwrap_or(Piece::Queen);
            let valuable = target_piece == Piece::King
                || (piece_value(target_piece) >= 3
                    && (king_value(target_piece) > king_value(slider_piece) || is_hanging(after, !pov, target)));
            if valuable {
                found.push((slider, target));
            }
        }
    }
    found
}

/// Discovered attack: a move uncovers a line from another piece onto the
/// king or a valuable piece. Discovered checks score higher.
pub fn discovered_attack(line: &SolutionLine) -> Option<Evidence> {
    for ply in line.solver_plies() {
        if ply.is_castling() {
            continue;
        }
        let uncovered = uncovered_targets(line, ply);
        let Some(&(slider, _)) = uncovered.first() else {
            continue;
        };

        let is_check = uncovered
            .iter()
            .any(|&(_, t)| ply.board_after().piece_on(t) == Some(Piece::King));
        let mut confidence = if is_check { 0.85 } else { 0.65 };
        let won = line
            .later_solver_plies(ply.ply_index)
            .any(|later| later.is_capture() && uncovered.iter().any(|&(_, t)| t == later.to));
        if won {
            confidence += 0.15;
        }

        let mut squares = vec![slider];
        squares.extend(uncovered.iter().map(|&(_, t)| t));
        let rationale = if is_check {
            format!("moving off {} uncovers check from {}", ply.from, slider)
        } else {
            format!("moving off {} uncovers an attack from {}", ply.from, slider)
        };
        return Some(Evidence::at(Theme::DiscoveredAttack, confidence, ply).squares(squares).because(rationale));
    }
    None
}

/// X-ray: a recapture made through the square the opponent's capturing piece left
pub fn x_ray(line: &SolutionLine) -> Option<Evidence> {
    for ply in line.solver_plies().skip(1) {
        if !ply.is_capture() {
            continue;
        }
        let prev_op = line.ply(ply.ply_index - 1)?;
        if prev_op.to != ply.to {
            continue;
        }
        if ply.piece == crate::simulator::PieceKind::King && prev_op.piece == crate::simulator::PieceKind::King {
            continue;
        }
        let Some(prev_solver) = ply.ply_index.checked_sub(2).and_then(|i| line.ply(i)) else {
            continue;
        };
        if prev_solver.to != prev_op.to {
            continue;
        }

        if between(ply.from, ply.to) & BitBoard::from_square(prev_op.from) != EMPTY {
            return Some(
                Evidence::at(Theme::XRayAttack, 0.7, ply)
                    .squares([prev_op.from, ply.to])
                    .because(format!("recaptures on {} through {}", ply.to, prev_op.from)),
            );
        }
    }
    None
}

/// A slider's attack through one enemy piece onto another, as set up by a solver move.
struct LineAttack {
    front: (Piece, Square),
    back: (Piece, Square),
}

fn line_attacks(ply: &crate::simulator::PlyRecord) -> Vec<LineAttack> {
    let board = ply.board_after();
    let mover = ply.landed_piece().piece();
    if !is_ray_piece(mover) || is_in_bad_spot(board, ply.to) {
        return Vec::new();
    }
    let pov = ply.side.color();

    ray_pairs(board, ply.to, mover)
        .into_iter()
        .filter_map(|(front, back)| {
            let back = back?;
            let enemy = |sq: Square| board.color_on(sq) == Some(!pov);
            if !enemy(front) || !enemy(back) {
                return None;
            }
            Some(LineAttack {
                front: (board.piece_on(front)?, front),
                back: (board.piece_on(back)?, back),
            })
        })
        .collect()
}

/// Pin: the moved slider attacks a piece that shields a king or a more
/// valuable piece behind it.
pub fn pin(line: &SolutionLine) -> Option<Evidence> {
    for ply in line.solver_plies() {
        for attack in line_attacks(ply) {
            let (front_piece, front) = attack.front;
            let (back_piece, back) = attack.back;
            if front_piece == Piece::King || (front_piece == Piece::Pawn && back_piece != Piece::King) {
                continue;
            }
            let absolute = back_piece == Piece::King;
            if !absolute && king_value(back_piece) <= king_value(front_piece) {
                continue;
            }

            let mut confidence = if absolute { 0.8 } else { 0.65 };
            let exploited = line
                .later_solver_plies(ply.ply_index)
                .any(|later| later.is_capture() && later.to == front);
            if exploited {
                confidence += 0.15;
            }
            let kind = if absolute { "king" } else { "more valuable piece" };
            return Some(
                Evidence::at(Theme::Pin, confidence, ply)
                    .squares([front, back])
                    .because(format!("piece on {front} is pinned to the {kind} on {back}")),
            );
        }
    }
    None
}

/// Skewer: the moved slider attacks a king or valuable piece that must step
/// aside and expose a piece behind it.
pub fn skewer(line: &SolutionLine) -> Option<Evidence> {
    for ply in line.solver_plies() {
        if ply.is_checkmate {
            continue;
        }
        for attack in line_attacks(ply) {
            let (front_piece, front) = attack.front;
            let (back_piece, back) = attack.back;
            if back_piece == Piece::King || piece_value(back_piece) < 3 {
                continue;
            }
            if front_piece != Piece::King && king_value(front_piece) <= king_value(back_piece) {
                continue;
            }

            let mut confidence = 0.6;
            let won = line
                .later_solver_plies(ply.ply_index)
                .any(|later| later.is_capture() && later.to == back);
            if won {
                confidence += 0.3;
            }
            return Some(
                Evidence::at(Theme::Skewer, confidence, ply)
                    .squares([front, back])
                    .because(format!("attack on {front} exposes the piece on {back}")),
            );
        }
    }
    None
}
