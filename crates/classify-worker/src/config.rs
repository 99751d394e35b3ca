//! Worker configuration from environment variables

use std::env;
use std::path::PathBuf;

use chess_puzzler::ClassifierConfig;

use crate::error::WorkerError;

#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Lichess-format puzzle CSV
    pub corpus_path: PathBuf,

    /// Directory for verdicts, the build report and the assignment table
    pub output_dir: PathBuf,

    /// Rayon threads used for classification
    pub workers: usize,

    /// Stop after this many records (smoke runs)
    pub corpus_limit: Option<usize>,

    pub classifier: ClassifierConfig,
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, WorkerError> {
        let corpus_path = env::var("CORPUS_PATH")
            .map(PathBuf::from)
            .map_err(|_| WorkerError::Config("CORPUS_PATH not set"))?;

        let output_dir = env::var("OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./out"));

        let workers = env::var("CLASSIFY_WORKERS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or_else(num_cpus::get);

        let corpus_limit = env::var("CORPUS_LIMIT").ok().and_then(|v| v.parse().ok());

        let defaults = ClassifierConfig::default();
        let classifier = ClassifierConfig {
            min_confidence: env::var("MIN_CONFIDENCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.min_confidence),
            fork_target_min_value: env::var("FORK_TARGET_MIN_VALUE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.fork_target_min_value),
            crowd_agreement_bonus: env::var("CROWD_AGREEMENT_BONUS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.crowd_agreement_bonus),
        };

        Ok(Self {
            corpus_path,
            output_dir,
            workers,
            corpus_limit,
            classifier,
        })
    }

    /// Optional `SelectionCriteria` JSON for the lesson selector binary.
    pub fn criteria_path() -> Option<PathBuf> {
        env::var("CRITERIA_PATH").ok().map(PathBuf::from)
    }
}
