//! Integration tests: lessons, variants and placement over a classified corpus.

mod common;

use std::collections::HashSet;

use chess_core::Theme;
use chrono::{TimeZone, Utc};
use common::{index_of, BACK_RANK_MATES, KNIGHT_FORKS, SMOTHERED_MATES};
use curriculum::{
    default_levels, pick_placement_item, pick_variant, AssignmentTable, CorpusIndex, EstimatorConfig, RatingEstimate,
    SelectionCriteria, SelectionWarning, TestVariant, Tier, VariantAttempt, LESSON_SIZE,
};

fn corpus() -> CorpusIndex {
    index_of(&[&SMOTHERED_MATES, &BACK_RANK_MATES, &KNIGHT_FORKS])
}

// ===========================================================================
// Lesson selection
// ===========================================================================

#[test]
fn test_focused_lesson_is_complete_and_ordered() {
    let index = corpus();
    let lesson = index.select_lesson(&SelectionCriteria::focused(vec![Theme::SmotheredMate]));

    assert!(lesson.is_complete());
    let ids: HashSet<&str> = lesson.puzzle_ids().into_iter().collect();
    assert_eq!(ids.len(), LESSON_SIZE);
    for slot in &lesson.slots {
        assert!(index.get(&slot.puzzle_id).unwrap().verdict.has_theme(&Theme::SmotheredMate));
        assert_eq!(slot.theme, Theme::SmotheredMate);
    }
    for pair in lesson.slots.windows(2) {
        assert!(pair[0].true_difficulty_score <= pair[1].true_difficulty_score);
    }
    assert_eq!(lesson.slots[0].tier, Tier::Easy);
    assert_eq!(lesson.slots[5].tier, Tier::Hard);
    assert!(lesson.diagnostics.relaxations.is_empty());
    assert_eq!(lesson.diagnostics.pool_size, index.len());
}

#[test]
fn test_excluded_ids_never_selected() {
    let index = corpus();
    let excluded: Vec<String> = SMOTHERED_MATES[..3].iter().map(|p| p.id.to_string()).collect();
    let criteria = SelectionCriteria::focused(vec![Theme::SmotheredMate]).excluding(excluded.clone());
    let lesson = index.select_lesson(&criteria);

    assert!(lesson.is_complete());
    for id in &excluded {
        assert!(!lesson.puzzle_ids().contains(&id.as_str()));
    }
}

#[test]
fn test_small_pool_returns_what_it_has() {
    let index = corpus();
    let excluded = SMOTHERED_MATES[..6].iter().map(|p| p.id.to_string());
    let criteria = SelectionCriteria::focused(vec![Theme::SmotheredMate]).excluding(excluded);
    let lesson = index.select_lesson(&criteria);

    assert_eq!(lesson.slots.len(), 4);
    assert_eq!(
        lesson.diagnostics.warning,
        Some(SelectionWarning::InsufficientCandidates { available: 4, required: LESSON_SIZE })
    );
}

#[test]
fn test_mixed_practice_alternates_themes() {
    let index = corpus();
    let criteria = SelectionCriteria::mixed(vec![Theme::SmotheredMate, Theme::BackRankMate]);
    let lesson = index.select_lesson(&criteria);

    assert!(lesson.is_complete());
    let themes: HashSet<&Theme> = lesson.slots.iter().map(|s| &s.theme).collect();
    assert!(themes.len() >= 2);
    for slot in &lesson.slots {
        assert!(slot.theme == Theme::SmotheredMate || slot.theme == Theme::BackRankMate);
    }
}

#[test]
fn test_selection_is_reproducible() {
    let index = corpus();
    let criteria = SelectionCriteria { seed: Some(42), ..SelectionCriteria::mixed(vec![Theme::Mate]) };
    assert_eq!(index.select_lesson(&criteria), index.select_lesson(&criteria));

    let unseeded = SelectionCriteria::mixed(vec![Theme::Mate]);
    assert_eq!(index.select_lesson(&unseeded), index.select_lesson(&unseeded));
}

#[test]
fn test_selection_serializes_camel_case() {
    let index = corpus();
    let lesson = index.select_lesson(&SelectionCriteria::focused(vec![Theme::BackRankMate]));
    let json = serde_json::to_string(&lesson).unwrap();
    assert!(json.contains("\"puzzleId\""));
    assert!(json.contains("\"trueDifficultyScore\""));
    assert!(json.contains("\"diversityRelaxations\""));

    let criteria: SelectionCriteria =
        serde_json::from_str(r#"{"themes":["fork","pin"],"mixedPractice":true,"minPopularity":50}"#).unwrap();
    assert!(criteria.mixed_practice);
    assert_eq!(criteria.themes, vec![Theme::Fork, Theme::Pin]);
    assert_eq!(criteria.min_popularity, Some(50));
}

// ===========================================================================
// Assignment table
// ===========================================================================

#[test]
fn test_assignment_table_covers_corpus() {
    let index = corpus();
    let table = AssignmentTable::build(default_levels(), index.puzzles());

    let smothered: usize = (1..=6).map(|level| table.lookup(level, &Theme::SmotheredMate).len()).sum();
    assert_eq!(smothered, SMOTHERED_MATES.len());

    for cp in index.iter() {
        let level = table.level_for(cp.difficulty()).unwrap();
        assert!(table.lookup(level, &cp.verdict.primary_theme).iter().any(|id| id == cp.id()));
    }
}

// ===========================================================================
// Variants and placement
// ===========================================================================

#[test]
fn test_variant_rotation_prefers_oldest() {
    let variants: Vec<TestVariant> = ["v1", "v2", "v3"]
        .iter()
        .map(|id| TestVariant { id: id.to_string(), name: id.to_uppercase(), themes: vec![Theme::Fork] })
        .collect();
    let at = |id: &str, day: u32| VariantAttempt {
        variant_id: id.to_string(),
        attempted_at: Utc.with_ymd_and_hms(2024, 5, day, 9, 30, 0).unwrap(),
    };

    assert_eq!(pick_variant(&variants, &[]).unwrap().id, "v1");
    let history = vec![at("v1", 2), at("v2", 1), at("v3", 3)];
    assert_eq!(pick_variant(&variants, &history).unwrap().id, "v2");
}

#[test]
fn test_placement_session_walks_the_pool() {
    let index = corpus();
    let config = EstimatorConfig::default();
    let mut estimate = RatingEstimate::new(1200.0);
    let mut answered: Vec<String> = Vec::new();

    for i in 0..5 {
        let item = pick_placement_item(index.puzzles(), &estimate, &answered).expect("pool not exhausted");
        assert!(!answered.contains(&item.id().to_string()));
        answered.push(item.id().to_string());
        estimate = estimate.after_answer(i % 2 == 0, 5, &config);
    }

    assert_eq!(estimate.answered, 5);
    assert!(estimate.value >= config.min_rating && estimate.value <= config.max_rating);
    // +200 -160 +120 -80 +40
    assert!((estimate.value - 1320.0).abs() < 1e-9);
}
