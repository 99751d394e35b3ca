//! Classified corpus: every usable record normalized, simulated and
//! classified once, then shared read-only with the selectors.

use std::collections::HashMap;

use chess_core::PuzzleRecord;
use chess_puzzler::{classify_with, normalize, ClassifierConfig, MalformedRecord, NormalizedPuzzle, SimError, TacticVerdict};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Why a record could not be classified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error(transparent)]
    Malformed(#[from] MalformedRecord),

    #[error("puzzle {id}: {source}")]
    Simulation { id: String, source: SimError },
}

/// A normalized puzzle together with its verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedPuzzle {
    pub puzzle: NormalizedPuzzle,
    pub verdict: TacticVerdict,
}

impl ClassifiedPuzzle {
    pub fn id(&self) -> &str {
        &self.puzzle.id
    }

    pub fn difficulty(&self) -> f64 {
        self.verdict.true_difficulty_score
    }
}

/// Normalize, simulate and classify one record.
pub fn classify_record(record: &PuzzleRecord, config: &ClassifierConfig) -> Result<ClassifiedPuzzle, PipelineError> {
    let puzzle = normalize(record)?;
    let plies = puzzle.simulate().map_err(|source| PipelineError::Simulation {
        id: record.id.clone(),
        source,
    })?;
    let verdict = classify_with(&puzzle, &plies, config);
    Ok(ClassifiedPuzzle { puzzle, verdict })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedRecord {
    pub id: String,
    pub reason: String,
}

/// Totals from one batch build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub total: usize,
    pub classified: usize,
    /// Classified, but no motif cleared the confidence threshold
    pub unclassified: usize,
    pub duplicates: usize,
    pub dropped: Vec<DroppedRecord>,
}

/// Immutable, id-indexed set of classified puzzles.
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    puzzles: Vec<ClassifiedPuzzle>,
    by_id: HashMap<String, usize>,
}

impl CorpusIndex {
    /// Classify `records` in parallel on the current rayon pool. Bad records
    /// are logged and skipped; the output keeps corpus order.
    pub fn build(records: &[PuzzleRecord], config: &ClassifierConfig) -> (Self, BuildReport) {
        let results: Vec<Result<ClassifiedPuzzle, PipelineError>> = records
            .par_iter()
            .map(|record| classify_record(record, config))
            .collect();

        let mut report = BuildReport { total: records.len(), ..Default::default() };
        let mut classified = Vec::with_capacity(results.len());

        for (record, result) in records.iter().zip(results) {
            match result {
                Ok(puzzle) => classified.push(puzzle),
                Err(e) => {
                    warn!(puzzle_id = %record.id, error = %e, "Dropping puzzle record");
                    report.dropped.push(DroppedRecord { id: record.id.clone(), reason: e.to_string() });
                }
            }
        }

        let (index, duplicates) = Self::from_classified(classified);
        report.duplicates = duplicates;
        report.classified = index.len();
        report.unclassified = index.puzzles.iter().filter(|p| p.verdict.low_confidence).count();

        info!(
            total = report.total,
            classified = report.classified,
            unclassified = report.unclassified,
            dropped = report.dropped.len(),
            duplicates = report.duplicates,
            "Corpus classified"
        );
        (index, report)
    }

    /// Index already-classified puzzles. Later duplicates of an id are
    /// discarded; their count is returned.
    pub fn from_classified(puzzles: Vec<ClassifiedPuzzle>) -> (Self, usize) {
        let mut index = CorpusIndex::default();
        let mut duplicates = 0;

        for puzzle in puzzles {
            if index.by_id.contains_key(puzzle.id()) {
                warn!(puzzle_id = %puzzle.id(), "Duplicate puzzle id, keeping first");
                duplicates += 1;
                continue;
            }
            index.by_id.insert(puzzle.id().to_string(), index.puzzles.len());
            index.puzzles.push(puzzle);
        }

        (index, duplicates)
    }

    pub fn get(&self, id: &str) -> Option<&ClassifiedPuzzle> {
        self.by_id.get(id).map(|&i| &self.puzzles[i])
    }

    pub fn puzzles(&self) -> &[ClassifiedPuzzle] {
        &self.puzzles
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassifiedPuzzle> {
        self.puzzles.iter()
    }

    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }
}
