//! Tactical theme vocabulary.
//!
//! Corpus tags arrive as free text. They are parsed into a closed set of
//! variants so detectors and selectors match exhaustively; anything outside
//! the known vocabulary is kept verbatim in `Theme::Unknown`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named tactical pattern or descriptive puzzle tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Theme {
    AdvancedPawn,
    Advantage,
    AnastasiaMate,
    ArabianMate,
    Attraction,
    BackRankMate,
    BishopEndgame,
    BodenMate,
    Castling,
    Clearance,
    Crushing,
    DefensiveMove,
    Deflection,
    DiscoveredAttack,
    DoubleBishopMate,
    DoubleCheck,
    DovetailMate,
    EnPassant,
    Endgame,
    Equality,
    ExposedKing,
    Fork,
    HangingPiece,
    HookMate,
    Interference,
    Intermezzo,
    KingsideAttack,
    KnightEndgame,
    Long,
    Master,
    Mate,
    MateIn1,
    MateIn2,
    MateIn3,
    MateIn4,
    MateIn5,
    Middlegame,
    OneMove,
    Opening,
    PawnEndgame,
    Pin,
    Promotion,
    QueenEndgame,
    QueenRookEndgame,
    QueensideAttack,
    QuietMove,
    RookEndgame,
    Sacrifice,
    Short,
    Skewer,
    SmotheredMate,
    TrappedPiece,
    UnderPromotion,
    VeryLong,
    XRayAttack,
    Zugzwang,
    /// Classifier fallback when no motif clears the confidence threshold.
    Other,
    /// A corpus tag outside the known vocabulary.
    Unknown(String),
}

impl Theme {
    /// Parse a corpus tag. Never fails: unrecognised tags become `Unknown`.
    pub fn from_tag(tag: &str) -> Theme {
        match tag {
            "advancedPawn" => Theme::AdvancedPawn,
            "advantage" => Theme::Advantage,
            "anastasiaMate" => Theme::AnastasiaMate,
            "arabianMate" => Theme::ArabianMate,
            "attraction" => Theme::Attraction,
            "backRankMate" => Theme::BackRankMate,
            "bishopEndgame" => Theme::BishopEndgame,
            "bodenMate" => Theme::BodenMate,
            "castling" => Theme::Castling,
            "clearance" => Theme::Clearance,
            "crushing" => Theme::Crushing,
            "defensiveMove" => Theme::DefensiveMove,
            "deflection" => Theme::Deflection,
            "discoveredAttack" => Theme::DiscoveredAttack,
            "doubleBishopMate" => Theme::DoubleBishopMate,
            "doubleCheck" => Theme::DoubleCheck,
            "dovetailMate" => Theme::DovetailMate,
            "enPassant" => Theme::EnPassant,
            "endgame" => Theme::Endgame,
            "equality" => Theme::Equality,
            "exposedKing" => Theme::ExposedKing,
            "fork" => Theme::Fork,
            "hangingPiece" => Theme::HangingPiece,
            "hookMate" => Theme::HookMate,
            "interference" => Theme::Interference,
            "intermezzo" => Theme::Intermezzo,
            "kingsideAttack" => Theme::KingsideAttack,
            "knightEndgame" => Theme::KnightEndgame,
            "long" => Theme::Long,
            "master" => Theme::Master,
            "mate" => Theme::Mate,
            "mateIn1" => Theme::MateIn1,
            "mateIn2" => Theme::MateIn2,
            "mateIn3" => Theme::MateIn3,
            "mateIn4" => Theme::MateIn4,
            "mateIn5" => Theme::MateIn5,
            "middlegame" => Theme::Middlegame,
            "oneMove" => Theme::OneMove,
            "opening" => Theme::Opening,
            "pawnEndgame" => Theme::PawnEndgame,
            "pin" => Theme::Pin,
            "promotion" => Theme::Promotion,
            "queenEndgame" => Theme::QueenEndgame,
            "queenRookEndgame" => Theme::QueenRookEndgame,
            "queensideAttack" => Theme::QueensideAttack,
            "quietMove" => Theme::QuietMove,
            "rookEndgame" => Theme::RookEndgame,
            "sacrifice" => Theme::Sacrifice,
            "short" => Theme::Short,
            "skewer" => Theme::Skewer,
            "smotheredMate" => Theme::SmotheredMate,
            "trappedPiece" => Theme::TrappedPiece,
            "underPromotion" => Theme::UnderPromotion,
            "veryLong" => Theme::VeryLong,
            "xRayAttack" => Theme::XRayAttack,
            "zugzwang" => Theme::Zugzwang,
            "other" => Theme::Other,
            other => Theme::Unknown(other.to_string()),
        }
    }

    /// The corpus tag for this theme.
    pub fn as_str(&self) -> &str {
        match self {
            Theme::AdvancedPawn => "advancedPawn",
            Theme::Advantage => "advantage",
            Theme::AnastasiaMate => "anastasiaMate",
            Theme::ArabianMate => "arabianMate",
            Theme::Attraction => "attraction",
            Theme::BackRankMate => "backRankMate",
            Theme::BishopEndgame => "bishopEndgame",
            Theme::BodenMate => "bodenMate",
            Theme::Castling => "castling",
            Theme::Clearance => "clearance",
            Theme::Crushing => "crushing",
            Theme::DefensiveMove => "defensiveMove",
            Theme::Deflection => "deflection",
            Theme::DiscoveredAttack => "discoveredAttack",
            Theme::DoubleBishopMate => "doubleBishopMate",
            Theme::DoubleCheck => "doubleCheck",
            Theme::DovetailMate => "dovetailMate",
            Theme::EnPassant => "enPassant",
            Theme::Endgame => "endgame",
            Theme::Equality => "equality",
            Theme::ExposedKing => "exposedKing",
            Theme::Fork => "fork",
            Theme::HangingPiece => "hangingPiece",
            Theme::HookMate => "hookMate",
            Theme::Interference => "interference",
            Theme::Intermezzo => "intermezzo",
            Theme::KingsideAttack => "kingsideAttack",
            Theme::KnightEndgame => "knightEndgame",
            Theme::Long => "long",
            Theme::Master => "master",
            Theme::Mate => "mate",
            Theme::MateIn1 => "mateIn1",
            Theme::MateIn2 => "mateIn2",
            Theme::MateIn3 => "mateIn3",
            Theme::MateIn4 => "mateIn4",
            Theme::MateIn5 => "mateIn5",
            Theme::Middlegame => "middlegame",
            Theme::OneMove => "oneMove",
            Theme::Opening => "opening",
            Theme::PawnEndgame => "pawnEndgame",
            Theme::Pin => "pin",
            Theme::Promotion => "promotion",
            Theme::QueenEndgame => "queenEndgame",
            Theme::QueenRookEndgame => "queenRookEndgame",
            Theme::QueensideAttack => "queensideAttack",
            Theme::QuietMove => "quietMove",
            Theme::RookEndgame => "rookEndgame",
            Theme::Sacrifice => "sacrifice",
            Theme::Short => "short",
            Theme::Skewer => "skewer",
            Theme::SmotheredMate => "smotheredMate",
            Theme::TrappedPiece => "trappedPiece",
            Theme::UnderPromotion => "underPromotion",
            Theme::VeryLong => "veryLong",
            Theme::XRayAttack => "xRayAttack",
            Theme::Zugzwang => "zugzwang",
            Theme::Other => "other",
            Theme::Unknown(tag) => tag,
        }
    }

    /// Named checkmate patterns, which outrank generic motifs at the final ply.
    pub fn is_mate_pattern(&self) -> bool {
        matches!(
            self,
            Theme::AnastasiaMate
                | Theme::ArabianMate
                | Theme::BackRankMate
                | Theme::BodenMate
                | Theme::DoubleBishopMate
                | Theme::DovetailMate
                | Theme::HookMate
                | Theme::SmotheredMate
        )
    }

    /// Themes a structural detector can confirm from the move sequence.
    ///
    /// A crowd tag naming one of these with no supporting ply is a
    /// mistag rather than missing vocabulary.
    pub fn is_motif(&self) -> bool {
        self.is_mate_pattern()
            || matches!(
                self,
                Theme::Attraction
                    | Theme::Clearance
                    | Theme::Deflection
                    | Theme::DiscoveredAttack
                    | Theme::DoubleCheck
                    | Theme::EnPassant
                    | Theme::Fork
                    | Theme::HangingPiece
                    | Theme::Intermezzo
                    | Theme::Pin
                    | Theme::Promotion
                    | Theme::QuietMove
                    | Theme::Sacrifice
                    | Theme::Skewer
                    | Theme::TrappedPiece
                    | Theme::UnderPromotion
                    | Theme::XRayAttack
            )
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Theme::Unknown(_))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Theme::from_tag(s))
    }
}

impl From<String> for Theme {
    fn from(tag: String) -> Self {
        match Theme::from_tag(&tag) {
            Theme::Unknown(_) => Theme::Unknown(tag),
            known => known,
        }
    }
}

impl From<Theme> for String {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::Unknown(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

/// Split a space-separated corpus tag string into themes, skipping blanks.
pub fn parse_themes(tags: &str) -> Vec<Theme> {
    tags.split_whitespace().map(Theme::from_tag).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags_round_trip_through_strings() {
        for tag in ["fork", "backRankMate", "mateIn2", "xRayAttack", "other"] {
            assert_eq!(Theme::from_tag(tag).as_str(), tag);
        }
    }

    #[test]
    fn test_unknown_tag_is_preserved() {
        let theme = Theme::from_tag("crazyhouseDrop");
        assert_eq!(theme, Theme::Unknown("crazyhouseDrop".to_string()));
        assert!(theme.is_unknown());
        assert!(!theme.is_motif());
    }

    #[test]
    fn test_serde_uses_corpus_tags() {
        let json = serde_json::to_string(&vec![Theme::Fork, Theme::SmotheredMate]).unwrap();
        assert_eq!(json, r#"["fork","smotheredMate"]"#);
        let back: Vec<Theme> = serde_json::from_str(r#"["pin","somethingNew"]"#).unwrap();
        assert_eq!(back, vec![Theme::Pin, Theme::Unknown("somethingNew".into())]);
    }

    #[test]
    fn test_parse_themes_splits_on_whitespace() {
        let themes = parse_themes("crushing  fork middlegame short");
        assert_eq!(
            themes,
            vec![Theme::Crushing, Theme::Fork, Theme::Middlegame, Theme::Short]
        );
    }

    #[test]
    fn test_mate_patterns_are_motifs() {
        assert!(Theme::BackRankMate.is_mate_pattern());
        assert!(Theme::BackRankMate.is_motif());
        assert!(!Theme::MateIn2.is_motif());
        assert!(!Theme::Crushing.is_motif());
    }
}
