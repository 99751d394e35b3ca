//! Offline corpus classification
//!
//! Classifies every puzzle in a Lichess-format CSV and writes the verdicts,
//! a build report and the (level, theme) assignment table.
//!
//! Usage:
//!   CORPUS_PATH=lichess_db_puzzle.csv OUTPUT_DIR=./out cargo run --release --bin classify-corpus

use classify_worker::config::WorkerConfig;
use classify_worker::{classify_corpus, output};
use curriculum::{default_levels, AssignmentTable};
use tracing::{info, warn};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let config = WorkerConfig::from_env()?;
    info!(
        corpus = %config.corpus_path.display(),
        output = %config.output_dir.display(),
        workers = config.workers,
        min_confidence = config.classifier.min_confidence,
        "Worker config loaded"
    );

    let (index, report) = classify_corpus(&config)?;

    let disputed = index
        .iter()
        .filter(|cp| !cp.verdict.disputed_crowd_themes.is_empty())
        .count();
    if disputed > 0 {
        warn!(disputed, "Puzzles carry crowd tags no detector confirmed");
    }

    output::write_verdicts(&config.output_dir, &index)?;
    output::write_report(&config.output_dir, &report)?;

    let table = AssignmentTable::build(default_levels(), index.puzzles());
    let table_path = output::write_table(&config.output_dir, &table)?;

    info!(
        classified = report.classified,
        unclassified = report.unclassified,
        dropped = report.dropped.len(),
        table = %table_path.display(),
        "Done"
    );
    Ok(())
}
