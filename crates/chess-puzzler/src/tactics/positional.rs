/// Forcing-sequence detectors: quiet_move, attraction, deflection,
/// interference, intermezzo, clearance

use chess::{BitBoard, MoveGen, EMPTY};
use chess_core::Theme;

use crate::board_utils::{attacked_opponent_squares, attackers, attacks, between, is_advanced_pawn_move, is_hanging, is_in_bad_spot, is_ray_piece, king_value};
use crate::puzzle::verdict::Evidence;
use crate::puzzle::SolutionLine;
use crate::simulator::{PieceKind, PlyRecord};
use crate::tactics::line_geometry::uncovered_targets;

fn on(bb: BitBoard, sq: chess::Square) -> bool {
    bb & BitBoard::from_square(sq) != EMPTY
}

/// Is this solver move non-forcing: no check, no capture, no threat, nothing uncovered?
pub fn is_quiet(line: &SolutionLine, ply: &PlyRecord) -> bool {
    !ply.is_check
        && !ply.before.is_check()
        && !ply.is_capture()
        && attacked_opponent_squares(ply.board_after(), ply.to, line.pov).is_empty()
        && uncovered_targets(line, ply).is_empty()
        && !is_advanced_pawn_move(ply.board_after(), ply.chess_move, line.pov)
        && ply.piece != PieceKind::King
}

/// Quiet move: a non-forcing solver move before the end of the line
pub fn quiet_move(line: &SolutionLine) -> Option<Evidence> {
    let last = line.plies.len().checked_sub(1)?;
    line.solver_plies()
        .filter(|p| p.ply_index != last)
        .find(|p| is_quiet(line, p))
        .map(|p| Evidence::at(Theme::QuietMove, 0.6, p).because("non-forcing move that still wins"))
}

/// Attraction: a solver move lures a king, queen or rook onto a square where
/// the next solver move attacks it
pub fn attraction(line: &SolutionLine) -> Option<Evidence> {
    for ply in line.solver_plies() {
        let i = ply.ply_index;
        let (Some(reply), Some(next)) = (line.ply(i + 1), line.ply(i + 2)) else {
            continue;
        };
        if reply.to != ply.to {
            continue;
        }
        let lured = reply.landed_piece();
        if !matches!(lured, PieceKind::King | PieceKind::Queen | PieceKind::Rook) {
            continue;
        }

        let square = reply.to;
        let hit = on(attackers(next.board_after(), line.pov, square), next.to);
        if !hit {
            continue;
        }
        let cashed_in = lured == PieceKind::King || line.ply(i + 4).is_some_and(|p| p.to == square);
        if cashed_in {
            return Some(
                Evidence::at(Theme::Attraction, 0.7, ply)
                    .squares([square])
                    .because(format!("{lured:?} is drawn to {square} and attacked there").to_lowercase()),
            );
        }
    }
    None
}

/// Deflection: a defender is forced off the square it guarded, and the solver
/// then captures or promotes there
pub fn deflection(line: &SolutionLine) -> Option<Evidence> {
    for ply in line.solver_plies().skip(1) {
        if !ply.is_capture() && ply.promotion.is_none() {
            continue;
        }
        if let Some(captured) = ply.captured {
            if king_value(captured.piece()) > king_value(ply.landed_piece().piece()) {
                continue;
            }
        }
        let i = ply.ply_index;
        let (Some(prev_op), Some(prev_solver)) = (line.ply(i - 1), i.checked_sub(2).and_then(|j| line.ply(j))) else {
            continue;
        };

        // The forcing move was quiet or won material
        let forcing_ok = match prev_solver.captured {
            None => true,
            Some(cap) => king_value(cap.piece()) < king_value(prev_solver.landed_piece().piece()),
        };
        if !forcing_ok || ply.to == prev_op.to || ply.to == prev_solver.to {
            continue;
        }

        let recaptured = prev_op.to == prev_solver.to;
        let escaped_check = prev_solver.is_check;
        if !recaptured && !escaped_check {
            continue;
        }

        let guard = attacks(prev_solver.board_after(), prev_op.from);
        let guarded_before = on(guard, ply.to);
        let promotion_guard = ply.promotion.is_some()
            && ply.to.get_file() == prev_op.from.get_file()
            && on(guard, ply.from);
        if !guarded_before && !promotion_guard {
            continue;
        }
        if on(attacks(ply.board_before(), prev_op.to), ply.to) {
            continue;
        }

        return Some(
            Evidence::at(Theme::Deflection, 0.7, prev_solver)
                .squares([prev_op.from, ply.to])
                .because(format!("defender leaves {} and {} falls", prev_op.from, ply.to)),
        );
    }
    None
}

/// Interference: a piece lands between a defender and what it guarded
pub fn interference(line: &SolutionLine) -> Option<Evidence> {
    for ply in line.solver_plies().skip(1) {
        if !ply.is_capture() {
            continue;
        }
        let board = ply.board_before();
        let Some(victim_color) = board.color_on(ply.to) else { continue };
        if !is_hanging(board, victim_color, ply.to) {
            continue;
        }
        let i = ply.ply_index;

        // Opponent blocked their own defender with their last move
        if let (Some(prev_op), Some(before)) = (line.ply(i - 1), i.checked_sub(2).and_then(|j| line.ply(j))) {
            if let Some(def) = attackers(before.board_after(), victim_color, ply.to).into_iter().next() {
                if before.board_after().piece_on(def).is_some_and(is_ray_piece)
                    && on(between(ply.to, def), prev_op.to)
                {
                    return Some(interference_evidence(ply, prev_op.to));
                }
            }
        }

        // Solver's previous move cut the defence
        let (Some(prev_op), Some(cut), Some(before)) = (
            line.ply(i - 1),
            i.checked_sub(2).and_then(|j| line.ply(j)),
            i.checked_sub(3).and_then(|j| line.ply(j)),
        ) else {
            continue;
        };
        if ply.to == prev_op.to {
            continue;
        }
        if let Some(def) = attackers(before.board_after(), victim_color, ply.to).into_iter().next() {
            if before.board_after().piece_on(def).is_some_and(is_ray_piece) && on(between(ply.to, def), cut.to) {
                return Some(interference_evidence(ply, cut.to));
            }
        }
    }
    None
}

fn interference_evidence(ply: &PlyRecord, blocker: chess::Square) -> Evidence {
    Evidence::at(Theme::Interference, 0.65, ply)
        .squares([blocker, ply.to])
        .because(format!("piece on {blocker} cuts the defence of {}", ply.to))
}

/// Intermezzo: an in-between move before taking back
pub fn intermezzo(line: &SolutionLine) -> Option<Evidence> {
    for ply in line.solver_plies().skip(1) {
        if !ply.is_capture() {
            continue;
        }
        let i = ply.ply_index;
        let (Some(op), Some(prev_solver)) = (line.ply(i - 1), i.checked_sub(2).and_then(|j| line.ply(j))) else {
            continue;
        };

        let could_attack = on(attackers(prev_solver.board_after(), !line.pov, ply.to), op.from);
        if could_attack || prev_solver.to == ply.to {
            continue;
        }

        // The first qualifying capture decides
        let Some(earlier_op) = i.checked_sub(3).and_then(|j| line.ply(j)) else {
            return None;
        };
        let was_recapture_available = earlier_op.to == ply.to
            && earlier_op.is_capture()
            && MoveGen::new_legal(earlier_op.board_after()).any(|m| m == ply.chess_move);
        return was_recapture_available.then(|| {
            Evidence::at(Theme::Intermezzo, 0.7, prev_solver)
                .squares([ply.to])
                .because(format!("in-between move before taking back on {}", ply.to))
        });
    }
    None
}

/// Clearance: a solver piece vacates a line or square so another can use it
pub fn clearance(line: &SolutionLine) -> Option<Evidence> {
    for ply in line.solver_plies().skip(1) {
        if ply.is_capture() || !is_ray_piece(ply.landed_piece().piece()) {
            continue;
        }
        let i = ply.ply_index;
        let (Some(prev_op), Some(clearing)) = (line.ply(i - 1), i.checked_sub(2).and_then(|j| line.ply(j))) else {
            continue;
        };
        if clearing.promotion.is_some() || clearing.to == ply.from || clearing.to == ply.to {
            continue;
        }
        if prev_op.is_check {
            continue;
        }
        if ply.is_check && prev_op.piece == PieceKind::King {
            continue;
        }

        let on_path = clearing.from == ply.to || on(between(ply.from, ply.to), clearing.from);
        if !on_path {
            continue;
        }
        let Some(before) = i.checked_sub(3).and_then(|j| line.ply(j)) else {
            continue;
        };
        let dest_was_empty = before.board_after().piece_on(clearing.to).is_none();
        if dest_was_empty || is_in_bad_spot(clearing.board_after(), clearing.to) {
            return Some(
                Evidence::at(Theme::Clearance, 0.65, clearing)
                    .squares([clearing.from])
                    .because(format!("{} is vacated for the piece on {}", clearing.from, ply.from)),
            );
        }
    }
    None
}
