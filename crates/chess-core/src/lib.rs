//! Corpus-facing value types: the theme vocabulary, raw puzzle records and
//! move notation helpers.

pub mod notation;
pub mod record;
pub mod theme;

pub use record::{CorpusRow, PuzzleRecord, RecordError};
pub use theme::Theme;
