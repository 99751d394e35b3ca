/// Named checkmate patterns, judged on the final position of a mating line

use chess::{Board, Color, Piece, Square, EMPTY};
use chess_core::Theme;

use crate::board_utils::{attackers, king_adjacent_squares, king_square, offset, relative_rank, square_distance};
use crate::puzzle::verdict::Evidence;
use crate::puzzle::SolutionLine;
use crate::simulator::PlyRecord;

/// Mating position seen from the attacker's side.
struct Mate<'a> {
    board: &'a Board,
    last: &'a PlyRecord,
    attacker: Color,
    king: Square,
}

impl Mate<'_> {
    fn mover(&self) -> Option<Piece> {
        self.board.piece_on(self.last.to)
    }

    fn own(&self, sq: Square) -> bool {
        self.board.color_on(sq) == Some(self.attacker)
    }

    fn defender_piece_on(&self, sq: Square) -> bool {
        self.board.color_on(sq) == Some(!self.attacker)
    }
}

/// The named pattern of a line ending in the solver's checkmate, if any.
/// Patterns are tried most specific first; the first match wins.
pub fn mate_pattern(line: &SolutionLine) -> Option<Evidence> {
    if !line.ends_in_mate() {
        return None;
    }
    let last = line.last_solver_ply()?;
    let mate = Mate {
        board: last.board_after(),
        last,
        attacker: line.pov,
        king: king_square(last.board_after(), !line.pov),
    };

    let (theme, rationale) = if smothered(&mate) {
        (Theme::SmotheredMate, "knight mates a king boxed in by its own pieces")
    } else if back_rank(&mate) {
        (Theme::BackRankMate, "mate on the back rank behind the king's own pawns")
    } else if anastasia(&mate) {
        (Theme::AnastasiaMate, "rook mates on the edge file with a knight covering")
    } else if hook(&mate) {
        (Theme::HookMate, "rook mates next to the king, guarded by a pawn-backed knight")
    } else if arabian(&mate) {
        (Theme::ArabianMate, "rook and knight mate the king in the corner")
    } else if let Some(theme) = boden_or_double_bishop(&mate) {
        (theme, "two bishops cover every flight square")
    } else if dovetail(&mate) {
        (Theme::DovetailMate, "queen mates diagonally with both flanks blocked")
    } else {
        return None;
    };

    let mut squares = vec![mate.king];
    squares.extend(*mate.board.checkers());
    Some(Evidence::at(theme, 1.0, last).squares(squares).because(rationale))
}

fn smothered(m: &Mate) -> bool {
    let knight_check = m
        .board
        .checkers()
        .into_iter()
        .any(|sq| m.board.piece_on(sq) == Some(Piece::Knight));
    knight_check
        && king_adjacent_squares(m.king)
            .into_iter()
            .all(|sq| m.defender_piece_on(sq))
}

fn back_rank(m: &Mate) -> bool {
    // Defender's back rank, seen from the defender
    if relative_rank(m.king, !m.attacker) != 0 {
        return false;
    }
    let forward: i8 = if m.attacker == Color::White { -1 } else { 1 };

    // Squares in front of the king are blocked by the defender's own pieces, not covered
    let front_blocked = [-1, 0, 1]
        .into_iter()
        .filter_map(|df| offset(m.king, df, forward))
        .all(|sq| m.defender_piece_on(sq) && attackers(m.board, m.attacker, sq) == EMPTY);
    if !front_blocked {
        return false;
    }

    let back = m.king.get_rank();
    m.board.checkers().into_iter().any(|sq| sq.get_rank() == back)
}

fn anastasia(m: &Mate) -> bool {
    let file = m.king.get_file().to_index();
    let rank = m.king.get_rank().to_index();
    if (file != 0 && file != 7) || rank == 0 || rank == 7 {
        return false;
    }
    if !matches!(m.mover(), Some(Piece::Rook | Piece::Queen)) || m.last.to.get_file() != m.king.get_file() {
        return false;
    }

    let inward: i8 = if file == 0 { 1 } else { -1 };
    let blocker = offset(m.king, inward, 0);
    let knight = offset(m.king, 3 * inward, 0);

    blocker.is_some_and(|sq| m.defender_piece_on(sq))
        && knight.is_some_and(|sq| m.board.piece_on(sq) == Some(Piece::Knight) && m.own(sq))
}

fn hook(m: &Mate) -> bool {
    if m.mover() != Some(Piece::Rook) || square_distance(m.last.to, m.king) != 1 {
        return false;
    }

    attackers(m.board, m.attacker, m.last.to).into_iter().any(|def| {
        m.board.piece_on(def) == Some(Piece::Knight)
            && square_distance(def, m.king) == 1
            && attackers(m.board, m.attacker, def)
                .into_iter()
                .any(|kd| m.board.piece_on(kd) == Some(Piece::Pawn))
    })
}

fn arabian(m: &Mate) -> bool {
    let file = m.king.get_file().to_index();
    let rank = m.king.get_rank().to_index();
    if (file != 0 && file != 7) || (rank != 0 && rank != 7) {
        return false;
    }
    if m.mover() != Some(Piece::Rook) || square_distance(m.last.to, m.king) != 1 {
        return false;
    }

    attackers(m.board, m.attacker, m.last.to).into_iter().any(|sq| {
        let dr = (sq.get_rank().to_index() as i32 - rank as i32).abs();
        let df = (sq.get_file().to_index() as i32 - file as i32).abs();
        m.board.piece_on(sq) == Some(Piece::Knight) && dr == 2 && df == 2
    })
}

fn boden_or_double_bishop(m: &Mate) -> Option<Theme> {
    let bishops: Vec<Square> = (*m.board.pieces(Piece::Bishop) & *m.board.color_combined(m.attacker))
        .into_iter()
        .collect();
    if bishops.len() < 2 {
        return None;
    }

    // Every attack on the king and its flight squares comes from a bishop
    let mut zone = king_adjacent_squares(m.king);
    zone.push(m.king);
    let bishops_only = zone.into_iter().all(|sq| {
        attackers(m.board, m.attacker, sq)
            .into_iter()
            .all(|a| m.board.piece_on(a) == Some(Piece::Bishop))
    });
    if !bishops_only {
        return None;
    }

    let king_file = m.king.get_file().to_index();
    let left = bishops[0].get_file().to_index() < king_file;
    let right = bishops[1].get_file().to_index() > king_file;
    if left == right {
        Some(Theme::BodenMate)
    } else {
        Some(Theme::DoubleBishopMate)
    }
}

fn dovetail(m: &Mate) -> bool {
    let file = m.king.get_file().to_index();
    let rank = m.king.get_rank().to_index();
    if file == 0 || file == 7 || rank == 0 || rank == 7 {
        return false;
    }

    let queen = m.last.to;
    if m.mover() != Some(Piece::Queen)
        || queen.get_file() == m.king.get_file()
        || queen.get_rank() == m.king.get_rank()
        || square_distance(queen, m.king) > 1
    {
        return false;
    }

    king_adjacent_squares(m.king).into_iter().filter(|&sq| sq != queen).all(|sq| {
        let covering = attackers(m.board, m.attacker, sq);
        if covering == EMPTY {
            // Blocked by the defender's own piece
            return true;
        }
        // Only the queen may cover a flight square, and it must be empty
        covering == chess::BitBoard::from_square(queen) && m.board.piece_on(sq).is_none()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::played;

    fn pattern(fen: &str, moves: &str) -> Option<Theme> {
        let (puzzle, plies) = played(fen, moves);
        mate_pattern(&SolutionLine::new(&puzzle, &plies)).map(|e| e.theme)
    }

    #[test]
    fn test_anastasia_mate() {
        assert_eq!(pattern("5r2/4Nppk/8/8/8/8/2K5/R7 b - - 0 1", "f8e8 a1h1"), Some(Theme::AnastasiaMate));
    }

    #[test]
    fn test_hook_mate() {
        // Re8# guarded by the g7 knight, itself guarded by the f6 pawn
        assert_eq!(pattern("5k2/p4pN1/5P2/8/8/8/8/K3R3 b - - 0 1", "a7a6 e1e8"), Some(Theme::HookMate));
    }

    #[test]
    fn test_arabian_mate() {
        assert_eq!(pattern("7k/pR6/5N2/8/8/8/8/K7 b - - 0 1", "a7a6 b7h7"), Some(Theme::ArabianMate));
    }

    #[test]
    fn test_boden_mate() {
        assert_eq!(pattern("2kr4/3p3p/8/8/5B2/8/4B3/K7 b - - 0 1", "h7h6 e2a6"), Some(Theme::BodenMate));
    }

    #[test]
    fn test_dovetail_mate() {
        // Qf7# with the king's own pawns on d6 and e5
        assert_eq!(pattern("7N/p7/3pk3/4p2Q/8/8/8/K7 b - - 0 1", "a7a6 h5f7"), Some(Theme::DovetailMate));
    }

    #[test]
    fn test_plain_rook_mate_has_no_name() {
        assert_eq!(pattern("7k/1R6/8/2p5/8/8/8/R5K1 b - - 0 1", "c5c4 a1a8"), None);
    }

    #[test]
    fn test_no_pattern_without_mate() {
        assert_eq!(pattern("4k3/8/8/8/8/8/8/R3K3 b - - 0 1", "e8d8 a1a7"), None);
    }
}
