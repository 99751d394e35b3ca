/// Puzzle normalization: apply the opponent's setup move and re-base the
/// puzzle at the position the solver faces.

use chess_core::{notation, PuzzleRecord};
use thiserror::Error;
use tracing::trace;

use super::NormalizedPuzzle;
use crate::simulator::{self, parse_uci_move, BoardState, PieceKind, PlyRecord, SimError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedRecord {
    #[error("puzzle {id}: empty move list")]
    EmptyMoveList { id: String },

    #[error("puzzle {id}: invalid start FEN '{fen}'")]
    InvalidFen { id: String, fen: String },

    #[error("puzzle {id}: setup move '{uci}' does not apply")]
    IllegalSetupMove { id: String, uci: String },
}

impl MalformedRecord {
    pub fn puzzle_id(&self) -> &str {
        match self {
            MalformedRecord::EmptyMoveList { id }
            | MalformedRecord::InvalidFen { id, .. }
            | MalformedRecord::IllegalSetupMove { id, .. } => id,
        }
    }
}

/// Normalize a corpus record.
///
/// The setup move is replayed with the simulator, so `puzzle_position_fen`
/// is exactly the position `simulate(start_fen, [moves[0]])` reaches.
pub fn normalize(record: &PuzzleRecord) -> Result<NormalizedPuzzle, MalformedRecord> {
    let setup = record
        .moves
        .first()
        .ok_or_else(|| MalformedRecord::EmptyMoveList { id: record.id.clone() })?;

    let start = BoardState::from_fen(&record.start_fen).map_err(|_| MalformedRecord::InvalidFen {
        id: record.id.clone(),
        fen: record.start_fen.clone(),
    })?;

    let setup_ply = simulator::play(&start, 0, setup).map_err(|err| match err {
        SimError::InvalidFen { fen } => MalformedRecord::InvalidFen { id: record.id.clone(), fen },
        SimError::MalformedMove { uci, .. } | SimError::IllegalMove { uci, .. } => {
            MalformedRecord::IllegalSetupMove { id: record.id.clone(), uci }
        }
    })?;

    let position = setup_ply.after;
    let solution_moves = record.moves[1..].to_vec();
    let first_move_piece = solution_moves
        .first()
        .and_then(|uci| parse_uci_move(position.board(), uci))
        .and_then(|m| position.board().piece_on(m.get_source()))
        .map(PieceKind::from);

    let setup_move_san = san_with_suffix(&record.start_fen, &setup_ply);
    trace!(puzzle_id = %record.id, setup = %setup_move_san, "normalized");

    Ok(NormalizedPuzzle {
        id: record.id.clone(),
        start_fen: record.start_fen.trim().to_string(),
        puzzle_position_fen: position.to_fen(),
        player_side: position.side_to_move(),
        setup_move: setup_ply.uci.clone(),
        setup_move_san,
        solution_moves,
        first_move_piece,
        crowd_rating: record.crowd_rating,
        popularity: record.popularity,
        crowd_themes: record.crowd_themes.clone(),
        source_url: record.source_url.clone(),
    })
}

fn san_with_suffix(fen: &str, ply: &PlyRecord) -> String {
    let mut san = notation::uci_to_san(fen, &ply.uci).unwrap_or_else(|| ply.uci.clone());
    if ply.is_checkmate {
        san.push('#');
    } else if ply.is_check {
        san.push('+');
    }
    san
}
