//! Puzzle normalization, move simulation and tactical classification.

pub mod board_utils;
pub mod puzzle;
pub mod simulator;
pub mod tactics;

pub use puzzle::classify::{classify, classify_with, ClassifierConfig};
pub use puzzle::normalize::{normalize, MalformedRecord};
pub use puzzle::verdict::{Evidence, OutcomeKind, TacticVerdict};
pub use puzzle::{NormalizedPuzzle, SolutionLine};
pub use simulator::{simulate, BoardState, PieceKind, PlyRecord, Side, SimError};
