//! Select one lesson from a classified corpus and print it as JSON.
//!
//! Usage:
//!   CORPUS_PATH=puzzles.csv CRITERIA_PATH=criteria.json cargo run --bin select-lesson

use std::fs;

use classify_worker::classify_corpus;
use classify_worker::config::WorkerConfig;
use curriculum::SelectionCriteria;
use tracing::{info, warn};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let _ = dotenvy::dotenv();

    let config = WorkerConfig::from_env()?;
    let criteria: SelectionCriteria = match WorkerConfig::criteria_path() {
        Some(path) => serde_json::from_str(&fs::read_to_string(&path)?)?,
        None => {
            info!("CRITERIA_PATH not set, selecting from the whole corpus");
            SelectionCriteria::default()
        }
    };

    let (index, _report) = classify_corpus(&config)?;
    let lesson = index.select_lesson(&criteria);

    if let Some(warning) = &lesson.diagnostics.warning {
        warn!(?warning, "Lesson is incomplete");
    }

    println!("{}", serde_json::to_string_pretty(&lesson)?);
    Ok(())
}
