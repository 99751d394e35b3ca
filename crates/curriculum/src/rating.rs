//! Adaptive placement rating: the estimate moves toward the learner's level
//! in steps that shrink as the session goes on.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::corpus::ClassifiedPuzzle;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EstimatorConfig {
    pub base_step: f64,
    pub min_rating: f64,
    pub max_rating: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self { base_step: 200.0, min_rating: 400.0, max_rating: 2800.0 }
    }
}

/// Move `current` up on a correct answer and down otherwise, by
/// `base_step * (1 - item_index / session_length)`.
pub fn next_rating(current: f64, correct: bool, item_index: usize, session_length: usize, config: &EstimatorConfig) -> f64 {
    let progress = if session_length == 0 { 1.0 } else { item_index as f64 / session_length as f64 };
    let step = config.base_step * (1.0 - progress).clamp(0.0, 1.0);
    let next = if correct { current + step } else { current - step };
    next.clamp(config.min_rating, config.max_rating)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingEstimate {
    pub value: f64,
    /// Items answered so far this session
    pub answered: usize,
}

impl RatingEstimate {
    pub fn new(value: f64) -> Self {
        Self { value, answered: 0 }
    }

    /// The estimate after answering the next item.
    pub fn after_answer(&self, correct: bool, session_length: usize, config: &EstimatorConfig) -> Self {
        Self {
            value: next_rating(self.value, correct, self.answered, session_length, config),
            answered: self.answered + 1,
        }
    }
}

/// The unanswered puzzle whose difficulty is nearest the estimate; ties go
/// to the lower id.
pub fn pick_placement_item<'p>(
    pool: &'p [ClassifiedPuzzle],
    estimate: &RatingEstimate,
    answered_ids: &[String],
) -> Option<&'p ClassifiedPuzzle> {
    let answered: HashSet<&str> = answered_ids.iter().map(String::as_str).collect();
    pool.iter()
        .filter(|cp| !answered.contains(cp.id()))
        .min_by(|a, b| {
            let da = (a.difficulty() - estimate.value).abs();
            let db = (b.difficulty() - estimate.value).abs();
            da.total_cmp(&db).then_with(|| a.id().cmp(b.id()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::classified;
    use chess_core::Theme;

    #[test]
    fn test_steps_shrink_over_session() {
        let config = EstimatorConfig::default();
        assert_eq!(next_rating(1200.0, true, 0, 10, &config), 1400.0);
        assert_eq!(next_rating(1200.0, false, 5, 10, &config), 1100.0);
        assert_eq!(next_rating(1200.0, true, 10, 10, &config), 1200.0);
        assert_eq!(next_rating(1200.0, true, 12, 10, &config), 1200.0);
    }

    #[test]
    fn test_rating_is_clamped() {
        let config = EstimatorConfig::default();
        assert_eq!(next_rating(2750.0, true, 0, 10, &config), 2800.0);
        assert_eq!(next_rating(450.0, false, 0, 10, &config), 400.0);
        assert_eq!(next_rating(1000.0, true, 0, 0, &config), 1000.0);
    }

    #[test]
    fn test_session_converges() {
        let config = EstimatorConfig::default();
        let mut estimate = RatingEstimate::new(1500.0);
        for correct in [true, false, true, false] {
            estimate = estimate.after_answer(correct, 4, &config);
        }
        assert_eq!(estimate.answered, 4);
        // +200 -150 +100 -50
        assert_eq!(estimate.value, 1600.0);
    }

    #[test]
    fn test_placement_item_nearest_unanswered() {
        let pool = vec![
            classified("b", Theme::Fork, 1300.0, 50),
            classified("a", Theme::Fork, 1100.0, 50),
            classified("c", Theme::Fork, 1500.0, 50),
        ];
        let estimate = RatingEstimate::new(1200.0);
        assert_eq!(pick_placement_item(&pool, &estimate, &[]).unwrap().id(), "a");
        assert_eq!(pick_placement_item(&pool, &estimate, &["a".to_string()]).unwrap().id(), "b");
        let all: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert!(pick_placement_item(&pool, &estimate, &all).is_none());
    }
}
