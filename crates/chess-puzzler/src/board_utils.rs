/// Board utility functions for tactical analysis

use chess::{BitBoard, Board, ChessMove, Color, File, MoveGen, Piece, Rank, Square, EMPTY};

// Piece values for material calculation
pub const PAWN_VALUE: i32 = 1;
pub const KNIGHT_VALUE: i32 = 3;
pub const BISHOP_VALUE: i32 = 3;
pub const ROOK_VALUE: i32 = 5;
pub const QUEEN_VALUE: i32 = 9;
pub const KING_VALUE: i32 = 99;

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Piece value (no king)
pub fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => PAWN_VALUE,
        Piece::Knight => KNIGHT_VALUE,
        Piece::Bishop => BISHOP_VALUE,
        Piece::Rook => ROOK_VALUE,
        Piece::Queen => QUEEN_VALUE,
        Piece::King => 0,
    }
}

/// Piece value including king (for fork and skewer targets)
pub fn king_value(piece: Piece) -> i32 {
    match piece {
        Piece::King => KING_VALUE,
        other => piece_value(other),
    }
}

pub fn is_ray_piece(piece: Piece) -> bool {
    matches!(piece, Piece::Queen | Piece::Rook | Piece::Bishop)
}

/// Squares attacked by whatever stands on `square` (empty if nothing does).
pub fn attacks(board: &Board, square: Square) -> BitBoard {
    let (piece, color) = match (board.piece_on(square), board.color_on(square)) {
        (Some(p), Some(c)) => (p, c),
        _ => return EMPTY,
    };
    let occupied = *board.combined();

    match piece {
        Piece::Pawn => pawn_attacks(square, color),
        Piece::Knight => chess::get_knight_moves(square),
        Piece::King => chess::get_king_moves(square),
        Piece::Bishop => chess::get_bishop_moves(square, occupied),
        Piece::Rook => chess::get_rook_moves(square, occupied),
        Piece::Queen => {
            chess::get_bishop_moves(square, occupied) | chess::get_rook_moves(square, occupied)
        }
    }
}

/// Diagonal capture squares of a pawn, regardless of occupancy.
pub fn pawn_attacks(square: Square, color: Color) -> BitBoard {
    chess::get_pawn_attacks(square, color, !EMPTY)
}

/// All pieces of `color` attacking `square`.
pub fn attackers(board: &Board, color: Color, square: Square) -> BitBoard {
    attackers_with_occupancy(board, color, square, *board.combined())
}

fn attackers_with_occupancy(board: &Board, color: Color, square: Square, occupied: BitBoard) -> BitBoard {
    let own = *board.color_combined(color) & occupied;
    let diagonal = *board.pieces(Piece::Bishop) | *board.pieces(Piece::Queen);
    let straight = *board.pieces(Piece::Rook) | *board.pieces(Piece::Queen);

    // Pawns are found by looking back along the opposite colour's capture pattern
    (pawn_attacks(square, !color) & *board.pieces(Piece::Pawn)
        | chess::get_knight_moves(square) & *board.pieces(Piece::Knight)
        | chess::get_king_moves(square) & *board.pieces(Piece::King)
        | chess::get_bishop_moves(square, occupied) & diagonal
        | chess::get_rook_moves(square, occupied) & straight)
        & own
}

pub fn king_square(board: &Board, color: Color) -> Square {
    board.king_square(color)
}

/// Is a piece defended, directly or by a slider x-raying through an enemy attacker?
pub fn is_defended(board: &Board, color: Color, square: Square) -> bool {
    if attackers(board, color, square) != EMPTY {
        return true;
    }

    for att_sq in attackers(board, !color, square) {
        if !board.piece_on(att_sq).is_some_and(is_ray_piece) {
            continue;
        }
        // Lift the attacker off the board and look again along the same line
        let occupied = *board.combined() ^ BitBoard::from_square(att_sq);
        let behind = attackers_with_occupancy(board, color, square, occupied) & chess::line(square, att_sq);
        if behind != EMPTY {
            return true;
        }
    }

    false
}

pub fn is_hanging(board: &Board, color: Color, square: Square) -> bool {
    !is_defended(board, color, square)
}

/// Can a piece be taken by a lower-value piece?
pub fn can_be_taken_by_lower_piece(board: &Board, piece: Piece, color: Color, square: Square) -> bool {
    attackers(board, !color, square).into_iter().any(|att_sq| {
        matches!(board.piece_on(att_sq), Some(att) if att != Piece::King && piece_value(att) < piece_value(piece))
    })
}

/// Is a piece in a bad spot (attacked and either hanging or takeable by a lower piece)?
pub fn is_in_bad_spot(board: &Board, square: Square) -> bool {
    let (piece, color) = match (board.piece_on(square), board.color_on(square)) {
        (Some(p), Some(c)) => (p, c),
        _ => return false,
    };

    if attackers(board, !color, square) == EMPTY {
        return false;
    }

    is_hanging(board, color, square) || can_be_taken_by_lower_piece(board, piece, color, square)
}

/// Is a piece trapped? (in a bad spot and every move it has leads to another bad spot)
pub fn is_trapped(board: &Board, square: Square) -> bool {
    if *board.checkers() != EMPTY || (*board.pinned() & BitBoard::from_square(square)) != EMPTY {
        return false;
    }

    let piece = match board.piece_on(square) {
        Some(p) if p != Piece::Pawn && p != Piece::King => p,
        _ => return false,
    };

    if !is_in_bad_spot(board, square) {
        return false;
    }

    for m in MoveGen::new_legal(board).filter(|m| m.get_source() == square) {
        if let Some(captured) = board.piece_on(m.get_dest()) {
            if piece_value(captured) >= piece_value(piece) {
                return false;
            }
        }
        let new_board = board.make_move_new(m);
        if !is_in_bad_spot(&new_board, m.get_dest()) {
            return false;
        }
    }

    true
}

pub fn material_count(board: &Board, color: Color) -> i32 {
    let color_bb = *board.color_combined(color);
    [Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen]
        .iter()
        .map(|&piece| (*board.pieces(piece) & color_bb).popcnt() as i32 * piece_value(piece))
        .sum()
}

/// Material difference (positive = side has more)
pub fn material_diff(board: &Board, side: Color) -> i32 {
    material_count(board, side) - material_count(board, !side)
}

/// Total material on the board, both sides, in pawn units.
pub fn total_material(board: &Board) -> i32 {
    material_count(board, Color::White) + material_count(board, Color::Black)
}

/// Opponent pieces attacked from a square: (piece, square)
pub fn attacked_opponent_squares(board: &Board, from_square: Square, pov: Color) -> Vec<(Piece, Square)> {
    attacks(board, from_square)
        .into_iter()
        .filter_map(|sq| match (board.piece_on(sq), board.color_on(sq)) {
            (Some(piece), Some(color)) if color != pov => Some((piece, sq)),
            _ => None,
        })
        .collect()
}

/// Chebyshev distance between two squares
pub fn square_distance(s1: Square, s2: Square) -> u32 {
    let dr = (s1.get_rank().to_index() as i32 - s2.get_rank().to_index() as i32).unsigned_abs();
    let df = (s1.get_file().to_index() as i32 - s2.get_file().to_index() as i32).unsigned_abs();
    dr.max(df)
}

pub fn is_castling_move(board: &Board, m: ChessMove) -> bool {
    board.piece_on(m.get_source()) == Some(Piece::King)
        && (m.get_source().get_file().to_index() as i32 - m.get_dest().get_file().to_index() as i32).abs() > 1
}

/// Pawn move landing on the sixth rank or beyond (from the mover's side), or a promotion.
pub fn is_advanced_pawn_move(board_after: &Board, m: ChessMove, mover: Color) -> bool {
    if m.get_promotion().is_some() {
        return true;
    }
    if board_after.piece_on(m.get_dest()) != Some(Piece::Pawn) {
        return false;
    }
    relative_rank(m.get_dest(), mover) >= 5
}

/// Pawn move landing on the seventh rank or beyond, or a promotion.
pub fn is_very_advanced_pawn_move(board_after: &Board, m: ChessMove, mover: Color) -> bool {
    is_advanced_pawn_move(board_after, m, mover) && relative_rank(m.get_dest(), mover) >= 6
}

/// Rank index seen from `color`'s side of the board (0 = own back rank).
pub fn relative_rank(square: Square, color: Color) -> usize {
    match color {
        Color::White => square.get_rank().to_index(),
        Color::Black => 7 - square.get_rank().to_index(),
    }
}

pub fn king_adjacent_squares(king: Square) -> Vec<Square> {
    chess::get_king_moves(king).into_iter().collect()
}

pub fn between(s1: Square, s2: Square) -> BitBoard {
    chess::between(s1, s2)
}

pub fn offset(square: Square, file_delta: i8, rank_delta: i8) -> Option<Square> {
    let file = square.get_file().to_index() as i8 + file_delta;
    let rank = square.get_rank().to_index() as i8 + rank_delta;
    if !(0..8).contains(&file) || !(0..8).contains(&rank) {
        return None;
    }
    Some(Square::make_square(Rank::from_index(rank as usize), File::from_index(file as usize)))
}

/// Directions a sliding piece moves along.
pub fn slider_directions(piece: Piece) -> &'static [(i8, i8)] {
    match piece {
        Piece::Rook => &ROOK_DIRECTIONS,
        Piece::Bishop => &BISHOP_DIRECTIONS,
        Piece::Queen => &[(1, 0), (-1, 0), (0, 1), (0, -1), (1, 1), (1, -1), (-1, 1), (-1, -1)],
        _ => &[],
    }
}

/// Walk outward from a slider and return, for each direction, the first two
/// occupied squares beyond it: (front, back). Directions that hit the edge
/// before a second piece are reported with `back = None`.
pub fn ray_pairs(board: &Board, from: Square, piece: Piece) -> Vec<(Square, Option<Square>)> {
    let mut pairs = Vec::new();

    for &(df, dr) in slider_directions(piece) {
        let mut cursor = from;
        let mut front = None;
        while let Some(next) = offset(cursor, df, dr) {
            cursor = next;
            if board.piece_on(next).is_none() {
                continue;
            }
            match front {
                None => front = Some(next),
                Some(f) => {
                    pairs.push((f, Some(next)));
                    front = None;
                    break;
                }
            }
        }
        if let Some(f) = front {
            pairs.push((f, None));
        }
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sq(name: &str) -> Square {
        Square::from_str(name).unwrap()
    }

    #[test]
    fn test_material_count_starting() {
        let board = Board::default();
        // 8 pawns + 2 knights + 2 bishops + 2 rooks + 1 queen = 8+6+6+10+9 = 39
        assert_eq!(material_count(&board, Color::White), 39);
        assert_eq!(material_diff(&board, Color::Black), 0);
        assert_eq!(total_material(&board), 78);
    }

    #[test]
    fn test_pawn_attacks_on_edge() {
        let atk = pawn_attacks(sq("a4"), Color::White);
        assert_eq!(atk.popcnt(), 1);
        assert_ne!(atk & BitBoard::from_square(sq("b5")), EMPTY);
    }

    #[test]
    fn test_attackers_reverse_lookup() {
        let board = Board::from_str("rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2").unwrap();
        let white_attackers = attackers(&board, Color::White, sq("e5"));
        assert_eq!(white_attackers, BitBoard::from_square(sq("f3")));
    }

    #[test]
    fn test_xray_defence_through_attacker() {
        // Black rook on e8 attacks the e4 knight; rook on e1 defends it directly
        let board = Board::from_str("4r1k1/8/8/8/4N3/8/8/4R1K1 w - - 0 1").unwrap();
        assert!(is_defended(&board, Color::White, sq("e4")));
        // Knight on e5 is attacked by the e8 rook and defended only through e4
        let board = Board::from_str("4r1k1/8/8/4N3/4R3/8/8/6K1 w - - 0 1").unwrap();
        assert!(is_defended(&board, Color::White, sq("e5")));
        let board = Board::from_str("4r1k1/8/8/4N3/8/8/8/6K1 w - - 0 1").unwrap();
        assert!(is_hanging(&board, Color::White, sq("e5")));
    }

    #[test]
    fn test_bad_spot_when_takeable_by_lower_piece() {
        // White queen on d5 attacked by a pawn on e6, defended by the e4 pawn
        let board = Board::from_str("6k1/8/4p3/3Q4/4P3/8/8/6K1 b - - 0 1").unwrap();
        assert!(is_in_bad_spot(&board, sq("d5")));
        assert!(!is_in_bad_spot(&board, sq("e4")));
    }

    #[test]
    fn test_square_distance() {
        assert_eq!(square_distance(sq("e1"), sq("e4")), 3);
        assert_eq!(square_distance(sq("a1"), sq("h8")), 7);
    }

    #[test]
    fn test_ray_pairs_finds_piece_behind_piece() {
        // Bishop b5 looks through the d7 knight to the e8 king
        let board = Board::from_str("4k3/3n4/8/1B6/8/8/8/4K3 w - - 0 1").unwrap();
        let pairs = ray_pairs(&board, sq("b5"), Piece::Bishop);
        assert!(pairs.contains(&(sq("d7"), Some(sq("e8")))));
    }

    #[test]
    fn test_castling_move_detection() {
        let board = Board::from_str("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert!(is_castling_move(&board, ChessMove::new(sq("e1"), sq("g1"), None)));
        assert!(!is_castling_move(&board, ChessMove::new(sq("e1"), sq("f1"), None)));
    }
}
