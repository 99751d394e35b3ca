//! Lichess-format CSV corpus loading

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chess_core::{CorpusRow, PuzzleRecord};
use tracing::{info, warn};

use crate::error::WorkerError;

/// Load puzzle records from a CSV file with Lichess headers.
pub fn load_corpus(path: &Path, limit: Option<usize>) -> Result<Vec<PuzzleRecord>, WorkerError> {
    let file = File::open(path)?;
    let records = read_corpus(file, limit)?;
    info!(path = %path.display(), records = records.len(), "Corpus loaded");
    Ok(records)
}

/// Parse CSV rows into records. Rows that fail to parse are logged and
/// skipped; only an unreadable header is fatal.
pub fn read_corpus<R: Read>(reader: R, limit: Option<usize>) -> Result<Vec<PuzzleRecord>, WorkerError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    reader.headers()?;

    let mut records = Vec::new();
    for (line, row) in reader.deserialize::<CorpusRow>().enumerate() {
        if limit.is_some_and(|n| records.len() >= n) {
            break;
        }
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!(line = line + 2, error = %e, "Skipping unreadable corpus row");
                continue;
            }
        };
        match PuzzleRecord::try_from(row) {
            Ok(record) => records.push(record),
            Err(e) => warn!(line = line + 2, error = %e, "Skipping malformed corpus row"),
        }
    }

    Ok(records)
}
