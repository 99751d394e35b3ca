//! Curriculum layer over classified puzzles: the offline assignment table,
//! lesson selection, test variant rotation and placement rating.

pub mod assignment;
pub mod corpus;
pub mod rating;
pub mod selector;
pub mod variants;

pub use assignment::{default_levels, AssignmentTable, LevelBand, TableError};
pub use corpus::{classify_record, BuildReport, ClassifiedPuzzle, CorpusIndex, DroppedRecord, PipelineError};
pub use rating::{next_rating, pick_placement_item, EstimatorConfig, RatingEstimate};
pub use selector::{
    select_lesson, DiversityRelaxation, DiversityRule, LessonSelection, LessonSlot, RatingBand, Relaxation,
    SelectionCriteria, SelectionDiagnostics, SelectionWarning, Tier, LESSON_SIZE,
};
pub use variants::{pick_variant, TestVariant, VariantAttempt};

#[cfg(test)]
pub(crate) mod test_support {
    use chess_core::Theme;
    use chess_puzzler::{NormalizedPuzzle, OutcomeKind, PieceKind, Side, TacticVerdict};

    use crate::corpus::ClassifiedPuzzle;

    /// A pawn push on a file derived from the id, so neighbouring ids differ.
    fn first_move_for(id: &str) -> String {
        let sum: u32 = id.bytes().map(u32::from).sum();
        let file = (b'a' + (sum % 8) as u8) as char;
        format!("{file}2{file}4")
    }

    pub fn classified(id: &str, theme: Theme, difficulty: f64, popularity: i32) -> ClassifiedPuzzle {
        let mut cp = classified_with(id, theme, difficulty, popularity, &first_move_for(id), PieceKind::Pawn);
        cp.puzzle.first_move_piece = None;
        cp
    }

    pub fn classified_with(
        id: &str,
        theme: Theme,
        difficulty: f64,
        popularity: i32,
        first_move: &str,
        piece: PieceKind,
    ) -> ClassifiedPuzzle {
        let puzzle = NormalizedPuzzle {
            id: id.to_string(),
            start_fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".to_string(),
            puzzle_position_fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".to_string(),
            player_side: Side::White,
            setup_move: "e7e5".to_string(),
            setup_move_san: "e5".to_string(),
            solution_moves: vec![first_move.to_string()],
            first_move_piece: Some(piece),
            crowd_rating: difficulty as i32,
            popularity,
            crowd_themes: vec![theme.clone()],
            source_url: format!("https://lichess.org/training/{id}"),
        };
        let verdict = TacticVerdict {
            puzzle_id: id.to_string(),
            low_confidence: theme == Theme::Other,
            primary_theme: theme,
            secondary_themes: Vec::new(),
            true_difficulty_score: difficulty,
            confidence: 0.8,
            evidence: Vec::new(),
            outcome_kind: OutcomeKind::Positional,
            crowd_rating: difficulty as i32,
            disputed_crowd_themes: Vec::new(),
        };
        ClassifiedPuzzle { puzzle, verdict }
    }
}
