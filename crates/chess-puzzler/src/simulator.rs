/// Move simulation: replays a UCI line from a FEN, one legal ply at a time

use std::fmt;
use std::str::FromStr;

use chess::{Board, BoardStatus, ChessMove, Color, MoveGen, Piece, Rank, Square, EMPTY};
use chess_core::notation::is_uci_move;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board_utils;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("invalid FEN: {fen}")]
    InvalidFen { fen: String },

    #[error("ply {ply_index}: malformed move '{uci}'")]
    MalformedMove { ply_index: usize, uci: String },

    #[error("ply {ply_index}: illegal move '{uci}'")]
    IllegalMove { ply_index: usize, uci: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn color(self) -> Color {
        match self {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::White => "white",
            Side::Black => "black",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub fn piece(self) -> Piece {
        match self {
            PieceKind::Pawn => Piece::Pawn,
            PieceKind::Knight => Piece::Knight,
            PieceKind::Bishop => Piece::Bishop,
            PieceKind::Rook => Piece::Rook,
            PieceKind::Queen => Piece::Queen,
            PieceKind::King => Piece::King,
        }
    }

    /// Material value in pawn units; the king counts as zero.
    pub fn value(self) -> i32 {
        board_utils::piece_value(self.piece())
    }
}

impl From<Piece> for PieceKind {
    fn from(piece: Piece) -> Self {
        match piece {
            Piece::Pawn => PieceKind::Pawn,
            Piece::Knight => PieceKind::Knight,
            Piece::Bishop => PieceKind::Bishop,
            Piece::Rook => PieceKind::Rook,
            Piece::Queen => PieceKind::Queen,
            Piece::King => PieceKind::King,
        }
    }
}

/// A full position: the `chess` board plus the move counters it does not track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardState {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl BoardState {
    pub fn from_fen(fen: &str) -> Result<Self, SimError> {
        let invalid = || SimError::InvalidFen { fen: fen.to_string() };
        let board = Board::from_str(fen.trim()).map_err(|_| invalid())?;

        let mut fields = fen.split_whitespace().skip(4);
        let halfmove_clock = match fields.next() {
            Some(f) => f.parse().map_err(|_| invalid())?,
            None => 0,
        };
        let fullmove_number = match fields.next() {
            Some(f) => f.parse::<u32>().map_err(|_| invalid())?.max(1),
            None => 1,
        };

        Ok(Self { board, halfmove_clock, fullmove_number })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Side {
        self.board.side_to_move().into()
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn status(&self) -> BoardStatus {
        self.board.status()
    }

    pub fn is_check(&self) -> bool {
        *self.board.checkers() != EMPTY
    }

    pub fn to_fen(&self) -> String {
        // The board prints its own counters; keep placement, side, castling, en passant
        let board_fen = self.board.to_string();
        let head: Vec<&str> = board_fen.split_whitespace().take(4).collect();
        format!("{} {} {}", head.join(" "), self.halfmove_clock, self.fullmove_number)
    }

    fn apply(&self, m: ChessMove) -> BoardState {
        let resets_clock = self.board.piece_on(m.get_source()) == Some(Piece::Pawn)
            || self.board.piece_on(m.get_dest()).is_some();
        let fullmove_number = match self.board.side_to_move() {
            Color::Black => self.fullmove_number + 1,
            Color::White => self.fullmove_number,
        };

        BoardState {
            board: self.board.make_move_new(m),
            halfmove_clock: if resets_clock { 0 } else { self.halfmove_clock + 1 },
            fullmove_number,
        }
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}

/// One applied move and the position it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlyRecord {
    /// 0 = opponent's setup move, 1 = first solver move, etc.
    pub ply_index: usize,
    pub uci: String,
    pub chess_move: ChessMove,
    pub side: Side,
    pub piece: PieceKind,
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
    pub captured: Option<PieceKind>,
    pub before: BoardState,
    pub after: BoardState,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_stalemate: bool,
}

impl PlyRecord {
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    pub fn captured_value(&self) -> i32 {
        self.captured.map_or(0, PieceKind::value)
    }

    pub fn is_en_passant(&self) -> bool {
        self.piece == PieceKind::Pawn
            && self.from.get_file() != self.to.get_file()
            && self.before.board().piece_on(self.to).is_none()
    }

    pub fn is_castling(&self) -> bool {
        board_utils::is_castling_move(self.before.board(), self.chess_move)
    }

    /// The piece standing on the destination after the move (differs on promotion).
    pub fn landed_piece(&self) -> PieceKind {
        self.promotion.unwrap_or(self.piece)
    }

    pub fn board_before(&self) -> &Board {
        self.before.board()
    }

    pub fn board_after(&self) -> &Board {
        self.after.board()
    }
}

/// Parse a UCI move against a board. A pawn reaching the last rank without a
/// promotion suffix promotes to a queen. Returns None for malformed tokens.
pub fn parse_uci_move(board: &Board, uci: &str) -> Option<ChessMove> {
    let uci = uci.trim();
    if !is_uci_move(uci) {
        return None;
    }

    let from = Square::from_str(&uci[0..2]).ok()?;
    let to = Square::from_str(&uci[2..4]).ok()?;
    let promotion = match uci.as_bytes().get(4).map(u8::to_ascii_lowercase) {
        Some(b'q') => Some(Piece::Queen),
        Some(b'r') => Some(Piece::Rook),
        Some(b'b') => Some(Piece::Bishop),
        Some(b'n') => Some(Piece::Knight),
        Some(_) => return None,
        None => {
            let last_rank = matches!(to.get_rank(), Rank::First | Rank::Eighth);
            if last_rank && board.piece_on(from) == Some(Piece::Pawn) {
                Some(Piece::Queen)
            } else {
                None
            }
        }
    };

    Some(ChessMove::new(from, to, promotion))
}

fn is_legal(board: &Board, m: ChessMove) -> bool {
    MoveGen::new_legal(board).any(|legal| legal == m)
}

/// Apply one move to a position, producing its ply record.
pub fn play(state: &BoardState, ply_index: usize, uci: &str) -> Result<PlyRecord, SimError> {
    let board = state.board();
    let m = parse_uci_move(board, uci).ok_or_else(|| SimError::MalformedMove {
        ply_index,
        uci: uci.to_string(),
    })?;

    if !is_legal(board, m) {
        return Err(SimError::IllegalMove { ply_index, uci: uci.to_string() });
    }

    let piece = board
        .piece_on(m.get_source())
        .ok_or_else(|| SimError::IllegalMove { ply_index, uci: uci.to_string() })?;

    let captured = match board.piece_on(m.get_dest()) {
        Some(p) => Some(PieceKind::from(p)),
        // En passant: diagonal pawn step onto an empty square
        None if piece == Piece::Pawn && m.get_source().get_file() != m.get_dest().get_file() => {
            Some(PieceKind::Pawn)
        }
        None => None,
    };

    let after = state.apply(m);
    let status = after.status();

    Ok(PlyRecord {
        ply_index,
        uci: uci.trim().to_string(),
        chess_move: m,
        side: state.side_to_move(),
        piece: piece.into(),
        from: m.get_source(),
        to: m.get_dest(),
        promotion: m.get_promotion().map(PieceKind::from),
        captured,
        before: *state,
        after,
        is_check: after.is_check(),
        is_checkmate: status == BoardStatus::Checkmate,
        is_stalemate: status == BoardStatus::Stalemate,
    })
}

/// Replay `moves` from `start_fen`. Fails on the first move that does not
/// parse or is not legal in the position reached so far.
pub fn simulate(start_fen: &str, moves: &[String]) -> Result<Vec<PlyRecord>, SimError> {
    let mut state = BoardState::from_fen(start_fen)?;
    let mut plies = Vec::with_capacity(moves.len());

    for (ply_index, uci) in moves.iter().enumerate() {
        let ply = play(&state, ply_index, uci)?;
        state = ply.after;
        plies.push(ply);
    }

    Ok(plies)
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn line(moves: &[&str]) -> Vec<String> {
        moves.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn test_fen_round_trip_with_counters() {
        let fen = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";
        assert_eq!(BoardState::from_fen(fen).unwrap().to_fen(), fen);
    }

    #[test]
    fn test_counters_advance() {
        let plies = simulate(START_FEN, &line(&["g1f3", "g8f6", "e2e4"])).unwrap();
        assert_eq!(plies[0].after.halfmove_clock(), 1);
        assert_eq!(plies[0].after.fullmove_number(), 1);
        assert_eq!(plies[1].after.fullmove_number(), 2);
        assert_eq!(plies[2].after.halfmove_clock(), 0);
        assert_eq!(plies[2].side, Side::White);
        assert_eq!(plies[1].side, Side::Black);
    }

    #[test]
    fn test_invalid_fen() {
        assert_eq!(
            simulate("not a position", &line(&["e2e4"])),
            Err(SimError::InvalidFen { fen: "not a position".into() })
        );
    }

    #[test]
    fn test_illegal_move_reports_ply() {
        let err = simulate(START_FEN, &line(&["e2e4", "e7e5", "e1e3"])).unwrap_err();
        assert_eq!(err, SimError::IllegalMove { ply_index: 2, uci: "e1e3".into() });
    }

    #[test]
    fn test_malformed_move_reports_ply() {
        let err = simulate(START_FEN, &line(&["e2e4", "xx"])).unwrap_err();
        assert_eq!(err, SimError::MalformedMove { ply_index: 1, uci: "xx".into() });
    }

    #[test]
    fn test_capture_and_mate_flags() {
        let fen = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";
        let plies = simulate(fen, &line(&["h5f7"])).unwrap();
        let ply = &plies[0];
        assert_eq!(ply.piece, PieceKind::Queen);
        assert_eq!(ply.captured, Some(PieceKind::Pawn));
        assert!(ply.is_check);
        assert!(ply.is_checkmate);
        assert!(!ply.is_stalemate);
    }

    #[test]
    fn test_promotion_defaults_to_queen() {
        let fen = "8/4P3/8/8/8/8/k7/7K w - - 0 1";
        let plies = simulate(fen, &line(&["e7e8"])).unwrap();
        assert_eq!(plies[0].promotion, Some(PieceKind::Queen));
        assert_eq!(plies[0].landed_piece(), PieceKind::Queen);

        let plies = simulate(fen, &line(&["e7e8n"])).unwrap();
        assert_eq!(plies[0].promotion, Some(PieceKind::Knight));
    }

    #[test]
    fn test_en_passant_capture_is_recorded() {
        let fen = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2";
        let plies = simulate(fen, &line(&["e5d6"])).unwrap();
        assert!(plies[0].is_en_passant());
        assert_eq!(plies[0].captured, Some(PieceKind::Pawn));
        assert_eq!(plies[0].board_after().piece_on(Square::D5), None);
    }

    #[test]
    fn test_castling_is_recorded() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let plies = simulate(fen, &line(&["e1g1"])).unwrap();
        assert!(plies[0].is_castling());
        assert_eq!(plies[0].board_after().piece_on(Square::F1), Some(Piece::Rook));
    }

    #[test]
    fn test_stalemate_flag() {
        // Qg6 leaves the h8 king no move and no check
        let plies = simulate("7k/8/8/6Q1/8/8/8/K7 w - - 0 1", &line(&["g5g6"])).unwrap();
        let ply = &plies[0];
        assert!(ply.is_stalemate);
        assert!(!ply.is_checkmate);
        assert!(!ply.is_check);

        let err = simulate("7k/8/8/6Q1/8/8/8/K7 w - - 0 1", &line(&["g5g6", "h8g8"])).unwrap_err();
        assert_eq!(err, SimError::IllegalMove { ply_index: 1, uci: "h8g8".into() });
    }

    #[test]
    fn test_no_moves_after_mate() {
        let fen = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";
        let err = simulate(fen, &line(&["h5f7", "e8f7"])).unwrap_err();
        assert!(matches!(err, SimError::IllegalMove { ply_index: 1, .. }));
    }
}
