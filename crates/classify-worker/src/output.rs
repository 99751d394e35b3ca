//! Batch outputs: one verdict per line, the build report and the
//! assignment table

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use curriculum::{AssignmentTable, BuildReport, CorpusIndex};
use tracing::info;

use crate::error::WorkerError;

pub const VERDICTS_FILE: &str = "verdicts.jsonl";
pub const REPORT_FILE: &str = "build_report.json";
pub const ASSIGNMENT_TABLE_FILE: &str = "assignment_table.json";

/// Write every verdict as a JSON line, in corpus order.
pub fn write_verdicts(dir: &Path, index: &CorpusIndex) -> Result<PathBuf, WorkerError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(VERDICTS_FILE);
    let mut out = BufWriter::new(File::create(&path)?);
    for cp in index.iter() {
        serde_json::to_writer(&mut out, &cp.verdict)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    info!(path = %path.display(), verdicts = index.len(), "Wrote verdicts");
    Ok(path)
}

pub fn write_report(dir: &Path, report: &BuildReport) -> Result<PathBuf, WorkerError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(REPORT_FILE);
    fs::write(&path, serde_json::to_string_pretty(report)?)?;
    Ok(path)
}

pub fn write_table(dir: &Path, table: &AssignmentTable) -> Result<PathBuf, WorkerError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(ASSIGNMENT_TABLE_FILE);
    table.save(&path)?;
    Ok(path)
}
