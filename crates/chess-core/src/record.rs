//! Raw puzzle corpus records.
//!
//! A corpus row carries the position before the opponent's setup move, the
//! full move list in UCI notation (setup move first) and crowd-sourced
//! metadata. Records are read-only once loaded.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::notation::is_uci_move;
use crate::theme::{parse_themes, Theme};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("record has no puzzle id")]
    MissingId,

    #[error("record {id}: empty FEN")]
    MissingFen { id: String },

    #[error("record {id}: malformed move token '{token}'")]
    MalformedMove { id: String, token: String },
}

/// One row of a Lichess-format puzzle CSV. Extra columns are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CorpusRow {
    #[serde(rename = "PuzzleId")]
    pub puzzle_id: String,
    #[serde(rename = "FEN")]
    pub fen: String,
    #[serde(rename = "Moves")]
    pub moves: String,
    #[serde(rename = "Rating")]
    pub rating: i32,
    #[serde(rename = "Popularity", default)]
    pub popularity: i32,
    #[serde(rename = "NbPlays", default)]
    pub nb_plays: u32,
    #[serde(rename = "Themes", default)]
    pub themes: String,
    #[serde(rename = "GameUrl", default)]
    pub game_url: String,
}

/// A puzzle as supplied by the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleRecord {
    pub id: String,
    pub start_fen: String,
    /// UCI moves; index 0 is the opponent's setup move.
    pub moves: Vec<String>,
    pub crowd_rating: i32,
    pub popularity: i32,
    pub nb_plays: u32,
    pub crowd_themes: Vec<Theme>,
    pub source_url: String,
}

impl PuzzleRecord {
    /// Build a record from its textual fields: space-separated moves and tags.
    pub fn from_fields(
        id: &str,
        fen: &str,
        moves: &str,
        rating: i32,
        popularity: i32,
        themes: &str,
    ) -> Result<Self, RecordError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(RecordError::MissingId);
        }
        let fen = fen.trim();
        if fen.is_empty() {
            return Err(RecordError::MissingFen { id: id.to_string() });
        }

        let moves = moves
            .split_whitespace()
            .map(|token| {
                if is_uci_move(token) {
                    Ok(token.to_string())
                } else {
                    Err(RecordError::MalformedMove {
                        id: id.to_string(),
                        token: token.to_string(),
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: id.to_string(),
            start_fen: fen.to_string(),
            moves,
            crowd_rating: rating,
            popularity,
            nb_plays: 0,
            crowd_themes: parse_themes(themes),
            source_url: String::new(),
        })
    }

    /// The opponent's setup move, if the record has any moves.
    pub fn setup_move(&self) -> Option<&str> {
        self.moves.first().map(String::as_str)
    }

    pub fn has_crowd_theme(&self, theme: &Theme) -> bool {
        self.crowd_themes.contains(theme)
    }
}

impl TryFrom<CorpusRow> for PuzzleRecord {
    type Error = RecordError;

    fn try_from(row: CorpusRow) -> Result<Self, Self::Error> {
        let mut record = PuzzleRecord::from_fields(
            &row.puzzle_id,
            &row.fen,
            &row.moves,
            row.rating,
            row.popularity,
            &row.themes,
        )?;
        record.nb_plays = row.nb_plays;
        record.source_url = row.game_url;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fields_splits_moves_and_tags() {
        let record = PuzzleRecord::from_fields(
            "00sHx",
            "q3k1nr/1pp1nQpp/3p4/1P2p3/4P3/B1PP1b2/B5PP/5K2 b k - 0 17",
            "e8d7 a2e6 d7d8 f7f8",
            1760,
            80,
            "mate mateIn2 middlegame short",
        )
        .unwrap();

        assert_eq!(record.moves, vec!["e8d7", "a2e6", "d7d8", "f7f8"]);
        assert_eq!(record.setup_move(), Some("e8d7"));
        assert!(record.has_crowd_theme(&Theme::MateIn2));
        assert_eq!(record.crowd_themes.len(), 4);
    }

    #[test]
    fn test_rejects_garbage_move_tokens() {
        let err = PuzzleRecord::from_fields("x1", "8/8/8/8/8/8/8/K6k w - - 0 1", "a1a2 zz9", 1500, 0, "")
            .unwrap_err();
        assert_eq!(
            err,
            RecordError::MalformedMove { id: "x1".into(), token: "zz9".into() }
        );
    }

    #[test]
    fn test_rejects_missing_id_and_fen() {
        assert_eq!(
            PuzzleRecord::from_fields(" ", "8/8/8/8/8/8/8/K6k w - - 0 1", "a1a2", 1500, 0, ""),
            Err(RecordError::MissingId)
        );
        assert!(matches!(
            PuzzleRecord::from_fields("x2", "", "a1a2", 1500, 0, ""),
            Err(RecordError::MissingFen { .. })
        ));
    }

    #[test]
    fn test_empty_move_list_is_allowed_here() {
        // Rejected later by the normalizer, which owns that rule.
        let record = PuzzleRecord::from_fields("x3", "8/8/8/8/8/8/8/K6k w - - 0 1", "", 1500, 0, "").unwrap();
        assert!(record.moves.is_empty());
        assert_eq!(record.setup_move(), None);
    }
}
