//! Level-unlock test variants and their rotation.

use chess_core::Theme;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::selector::{RatingBand, SelectionCriteria};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestVariant {
    pub id: String,
    pub name: String,
    pub themes: Vec<Theme>,
}

impl TestVariant {
    /// Mixed-practice criteria covering this variant's themes.
    pub fn criteria(&self, band: RatingBand) -> SelectionCriteria {
        SelectionCriteria::mixed(self.themes.clone()).with_band(band)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantAttempt {
    pub variant_id: String,
    pub attempted_at: DateTime<Utc>,
}

fn last_attempt(variant: &TestVariant, history: &[VariantAttempt]) -> Option<DateTime<Utc>> {
    history
        .iter()
        .filter(|a| a.variant_id == variant.id)
        .map(|a| a.attempted_at)
        .max()
}

/// The variant attempted longest ago, or never. Ties go to list order.
pub fn pick_variant<'v>(variants: &'v [TestVariant], history: &[VariantAttempt]) -> Option<&'v TestVariant> {
    // None sorts before Some, so unattempted variants come first
    variants.iter().min_by_key(|v| last_attempt(v, history))
}
