/// Classifier output types

use chess_core::Theme;
use serde::{Deserialize, Serialize};

use crate::simulator::{PieceKind, PlyRecord};

/// Why a detector believes a theme is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub theme: Theme,
    pub confidence: f64,
    /// Ply where the motif is realised (0 = setup move)
    pub ply: usize,
    pub piece: PieceKind,
    pub from: String,
    pub to: String,
    /// Squares the motif involves: targets, pinned pieces, the mated king
    pub squares: Vec<String>,
    pub rationale: String,
}

impl Evidence {
    pub fn at(theme: Theme, confidence: f64, ply: &PlyRecord) -> Self {
        Self {
            theme,
            confidence: confidence.clamp(0.0, 1.0),
            ply: ply.ply_index,
            piece: ply.landed_piece(),
            from: ply.from.to_string(),
            to: ply.to.to_string(),
            squares: Vec::new(),
            rationale: String::new(),
        }
    }

    pub fn squares<I, S>(mut self, squares: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.squares = squares.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn because(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    pub fn boost(&mut self, amount: f64) {
        self.confidence = (self.confidence + amount).clamp(0.0, 1.0);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutcomeKind {
    Checkmate,
    DecisiveMaterialGain,
    Positional,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TacticVerdict {
    pub puzzle_id: String,
    pub primary_theme: Theme,
    pub secondary_themes: Vec<Theme>,
    pub true_difficulty_score: f64,
    /// Confidence of the primary theme
    pub confidence: f64,
    pub evidence: Vec<Evidence>,
    pub outcome_kind: OutcomeKind,
    /// Crowd rating, kept for comparison with the computed difficulty
    pub crowd_rating: i32,
    /// Crowd motif tags no detector could confirm
    pub disputed_crowd_themes: Vec<Theme>,
    /// No motif cleared the confidence threshold
    pub low_confidence: bool,
}

impl TacticVerdict {
    /// Primary theme first, then secondaries in order.
    pub fn themes(&self) -> impl Iterator<Item = &Theme> {
        std::iter::once(&self.primary_theme).chain(self.secondary_themes.iter())
    }

    pub fn has_theme(&self, theme: &Theme) -> bool {
        self.themes().any(|t| t == theme)
    }

    pub fn evidence_for(&self, theme: &Theme) -> Option<&Evidence> {
        self.evidence.iter().find(|e| &e.theme == theme)
    }
}
