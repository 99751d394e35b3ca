/// Simple move-property detectors: double check, en passant, castling,
/// promotion, under-promotion, advanced pawn, mate-in-N

use chess_core::Theme;

use crate::board_utils;
use crate::puzzle::verdict::Evidence;
use crate::puzzle::SolutionLine;
use crate::simulator::PieceKind;

/// A solver move giving check with two pieces at once
pub fn double_check(line: &SolutionLine) -> Option<Evidence> {
    line.solver_plies().find(|p| p.board_after().checkers().popcnt() > 1).map(|p| {
        Evidence::at(Theme::DoubleCheck, 0.9, p)
            .squares(*p.board_after().checkers())
            .because("two pieces give check at once")
    })
}

pub fn en_passant(line: &SolutionLine) -> Option<Evidence> {
    line.solver_plies().find(|p| p.is_en_passant()).map(|p| {
        Evidence::at(Theme::EnPassant, 0.9, p).squares([p.to]).because("pawn captures en passant")
    })
}

pub fn castling(line: &SolutionLine) -> Option<Evidence> {
    line.solver_plies().find(|p| p.is_castling()).map(|p| {
        Evidence::at(Theme::Castling, 0.6, p).because("solver castles")
    })
}

pub fn promotion(line: &SolutionLine) -> Option<Evidence> {
    line.solver_plies()
        .find(|p| p.promotion.is_some())
        .map(|p| Evidence::at(Theme::Promotion, 0.8, p).squares([p.to]).because("pawn promotes"))
}

/// Promotion to anything but a queen
pub fn under_promotion(line: &SolutionLine) -> Option<Evidence> {
    line.solver_plies()
        .find(|p| matches!(p.promotion, Some(kind) if kind != PieceKind::Queen))
        .map(|p| {
            Evidence::at(Theme::UnderPromotion, 0.9, p)
                .squares([p.to])
                .because(format!("pawn promotes to a {:?}", p.landed_piece()).to_lowercase())
        })
}

/// Solver pushes a pawn to its seventh or eighth rank
pub fn advanced_pawn(line: &SolutionLine) -> Option<Evidence> {
    line.solver_plies()
        .find(|p| board_utils::is_very_advanced_pawn_move(p.board_after(), p.chess_move, line.pov))
        .map(|p| Evidence::at(Theme::AdvancedPawn, 0.6, p).squares([p.to]).because("pawn reaches the seventh rank"))
}

/// Mate-in-N tag when the line ends in the solver's checkmate
pub fn mate_in(line: &SolutionLine) -> Option<Theme> {
    if !line.ends_in_mate() {
        return None;
    }

    match line.solver_ply_count() {
        0 => None,
        1 => Some(Theme::MateIn1),
        2 => Some(Theme::MateIn2),
        3 => Some(Theme::MateIn3),
        4 => Some(Theme::MateIn4),
        _ => Some(Theme::MateIn5),
    }
}

/// Length tag from the number of plies after the setup move
pub fn length_tag(line: &SolutionLine) -> Option<Theme> {
    match line.plies.len() {
        0 | 1 => None,
        2 => Some(Theme::OneMove),
        3 | 4 => Some(Theme::Short),
        n if n >= 8 => Some(Theme::VeryLong),
        _ => Some(Theme::Long),
    }
}
