pub mod config;
pub mod corpus;
pub mod error;
pub mod output;

use curriculum::{BuildReport, CorpusIndex};
use tracing::info;

use crate::config::WorkerConfig;
use crate::error::WorkerError;

/// Load the configured corpus and classify it on a dedicated rayon pool.
pub fn classify_corpus(config: &WorkerConfig) -> Result<(CorpusIndex, BuildReport), WorkerError> {
    let records = corpus::load_corpus(&config.corpus_path, config.corpus_limit)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()?;
    info!(workers = config.workers, records = records.len(), "Classifying corpus");

    Ok(pool.install(|| CorpusIndex::build(&records, &config.classifier)))
}
