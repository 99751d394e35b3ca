//! Move notation helpers: UCI token validation and UCI → SAN rendering.

use std::sync::OnceLock;

use regex::Regex;
use shakmaty::{fen::Fen, san::San, uci::UciMove, CastlingMode, Chess, Position};

const UCI_PATTERN: &str = r"^[a-h][1-8][a-h][1-8][qrbnQRBN]?$";

fn uci_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(UCI_PATTERN).expect("UCI pattern is a valid regex"))
}

/// Is this token shaped like a coordinate move (`e2e4`, `e7e8q`)?
pub fn is_uci_move(token: &str) -> bool {
    uci_regex().is_match(token)
}

/// Render a single UCI move as SAN (without check suffix) in the given position.
/// Returns None if the FEN or the move does not parse or the move is illegal.
pub fn uci_to_san(fen: &str, uci: &str) -> Option<String> {
    let pos = position_from_fen(fen)?;
    let uci_move: UciMove = uci.parse().ok()?;
    let legal_move = uci_move.to_move(&pos).ok()?;
    Some(San::from_move(&pos, legal_move).to_string())
}

/// Render a UCI line as SAN moves, stopping at the first move that does not apply.
pub fn uci_line_to_san(fen: &str, moves: &[String]) -> Vec<String> {
    let mut pos = match position_from_fen(fen) {
        Some(p) => p,
        None => return Vec::new(),
    };
    let mut sans = Vec::with_capacity(moves.len());

    for uci_str in moves {
        let legal_move = match uci_str
            .parse::<UciMove>()
            .ok()
            .and_then(|m| m.to_move(&pos).ok())
        {
            Some(m) => m,
            None => break,
        };
        sans.push(San::from_move(&pos, legal_move).to_string());
        pos.play_unchecked(legal_move);
    }

    sans
}

fn position_from_fen(fen: &str) -> Option<Chess> {
    let fen: Fen = fen.parse().ok()?;
    fen.into_position::<Chess>(CastlingMode::Standard).ok()
}
