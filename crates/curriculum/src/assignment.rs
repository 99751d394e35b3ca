//! Offline assignment table: (level, theme) -> ranked puzzle ids.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chess_core::Theme;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::corpus::ClassifiedPuzzle;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("assignment table I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("assignment table JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A curriculum level: puzzles whose difficulty falls in `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelBand {
    pub level: u8,
    pub min_difficulty: f64,
    pub max_difficulty: f64,
}

impl LevelBand {
    pub fn contains(&self, difficulty: f64) -> bool {
        difficulty >= self.min_difficulty && difficulty < self.max_difficulty
    }
}

/// Six levels covering the whole difficulty scale.
pub fn default_levels() -> Vec<LevelBand> {
    let edges = [0.0, 1000.0, 1300.0, 1600.0, 1900.0, 2200.0, f64::MAX];
    edges
        .windows(2)
        .enumerate()
        .map(|(i, w)| LevelBand { level: i as u8 + 1, min_difficulty: w[0], max_difficulty: w[1] })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentTable {
    pub levels: Vec<LevelBand>,
    pub entries: BTreeMap<u8, BTreeMap<Theme, Vec<String>>>,
}

impl AssignmentTable {
    /// Bucket every classified puzzle under its level and each of its themes.
    /// Lists are ranked by popularity (high first), then difficulty (low
    /// first), then id. Unclassified puzzles land under `other`.
    pub fn build(levels: Vec<LevelBand>, puzzles: &[ClassifiedPuzzle]) -> Self {
        let mut buckets: BTreeMap<u8, BTreeMap<Theme, Vec<&ClassifiedPuzzle>>> = BTreeMap::new();

        for cp in puzzles {
            let Some(band) = levels.iter().find(|b| b.contains(cp.difficulty())) else {
                continue;
            };
            let by_theme = buckets.entry(band.level).or_default();
            for theme in cp.verdict.themes() {
                by_theme.entry(theme.clone()).or_default().push(cp);
            }
        }

        let entries = buckets
            .into_iter()
            .map(|(level, by_theme)| {
                let ranked = by_theme
                    .into_iter()
                    .map(|(theme, mut list)| {
                        list.sort_by(|a, b| {
                            b.puzzle
                                .popularity
                                .cmp(&a.puzzle.popularity)
                                .then_with(|| a.difficulty().total_cmp(&b.difficulty()))
                                .then_with(|| a.id().cmp(b.id()))
                        });
                        (theme, list.into_iter().map(|cp| cp.id().to_string()).collect())
                    })
                    .collect();
                (level, ranked)
            })
            .collect();

        Self { levels, entries }
    }

    pub fn lookup(&self, level: u8, theme: &Theme) -> &[String] {
        self.entries
            .get(&level)
            .and_then(|by_theme| by_theme.get(theme))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Themes with at least one puzzle at `level`, in theme order.
    pub fn themes_for(&self, level: u8) -> Vec<&Theme> {
        self.entries.get(&level).map_or_else(Vec::new, |m| m.keys().collect())
    }

    pub fn level_for(&self, difficulty: f64) -> Option<u8> {
        self.levels.iter().find(|b| b.contains(difficulty)).map(|b| b.level)
    }

    pub fn save(&self, path: &Path) -> Result<(), TableError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!(path = %path.display(), levels = self.entries.len(), "Saved assignment table");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, TableError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
