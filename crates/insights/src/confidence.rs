//! Additive confidence scoring.
//!
//! Four independent signals contribute points:
//!
//! | Signal | +2 | +1 | 0 (adds a note) |
//! |---|---|---|---|
//! | duration | ≥ 14 days | ≥ 7 days | "short experiment duration" |
//! | average sample per arm | ≥ 500 | ≥ 100 | "small sample sizes" |
//! | significant / total | ≥ 0.8 or exactly 0 | ≥ 0.5 | "mixed results across metrics" |
//! | metrics with \|d\| > 0.5 | | ≥ half of them | (no note) |
//!
//! A total of 6 or more is high, 3 or more medium, anything else low.

use crate::report::ConfidenceAssessment;
use analytics::{DEFAULT_ALPHA, DidResult, is_significant};
use core_types::ConfidenceLevel;
use indexmap::IndexMap;

const NOTE_SHORT_DURATION: &str = "short experiment duration";
const NOTE_SMALL_SAMPLES: &str = "small sample sizes";
const NOTE_MIXED_RESULTS: &str = "mixed results across metrics";

/// Points awarded per signal, plus the notes collected on zero-point branches.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfidenceScore {
    pub duration: u32,
    pub sample_size: u32,
    pub consistency: u32,
    pub effect_size: u32,
    /// In signal order: duration, sample size, consistency.
    pub notes: Vec<&'static str>,
}

impl ConfidenceScore {
    pub fn total(&self) -> u32 {
        self.duration + self.sample_size + self.consistency + self.effect_size
    }

    pub fn level(&self) -> ConfidenceLevel {
        let total = self.total();
        if total >= 6 {
            ConfidenceLevel::High
        } else if total >= 3 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn reasoning(&self) -> String {
        let level = self.level();
        if self.notes.is_empty() {
            return format!(
                "{} confidence: no limiting factors identified",
                level.capitalized()
            );
        }
        let notes = self.notes.join(", ");
        match level {
            ConfidenceLevel::High => format!("High confidence due to {}", notes),
            ConfidenceLevel::Medium => format!("Medium confidence with {}", notes),
            ConfidenceLevel::Low => format!("Low confidence due to {}", notes),
        }
    }

    pub fn assessment(&self) -> ConfidenceAssessment {
        ConfidenceAssessment {
            level: self.level(),
            reasoning: self.reasoning(),
        }
    }
}

/// Scores a non-empty set of results. An empty set scores only on duration.
pub fn score_confidence(
    results: &IndexMap<String, DidResult>,
    duration_days: u32,
) -> ConfidenceScore {
    let mut score = ConfidenceScore::default();

    score.duration = if duration_days >= 14 {
        2
    } else if duration_days >= 7 {
        1
    } else {
        score.notes.push(NOTE_SHORT_DURATION);
        0
    };

    let total = results.len();
    if total == 0 {
        return score;
    }
    let total_f = total as f64;

    // Summed as f64: per-metric totals can sit anywhere in the i64 range.
    let total_samples: f64 = results
        .values()
        .map(|r| r.sample_size_control as f64 + r.sample_size_treatment as f64)
        .sum();
    let avg_sample = total_samples / (total_f * 2.0);
    score.sample_size = if avg_sample >= 500.0 {
        2
    } else if avg_sample >= 100.0 {
        1
    } else {
        score.notes.push(NOTE_SMALL_SAMPLES);
        0
    };

    let significant = results
        .values()
        .filter(|r| is_significant(r.p_value, DEFAULT_ALPHA))
        .count();
    let ratio = significant as f64 / total_f;
    score.consistency = if ratio >= 0.8 || significant == 0 {
        2
    } else if ratio >= 0.5 {
        1
    } else {
        score.notes.push(NOTE_MIXED_RESULTS);
        0
    };

    let strong = results.values().filter(|r| r.effect_size.abs() > 0.5).count();
    if strong as f64 >= total_f * 0.5 {
        score.effect_size = 1;
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::result;

    fn results(specs: &[(f64, i64, f64)]) -> IndexMap<String, DidResult> {
        specs
            .iter()
            .enumerate()
            .map(|(i, &(p, samples, d))| (format!("m{}", i), result(0.1, p, samples, d)))
            .collect()
    }

    #[test]
    fn huge_sample_sizes_do_not_overflow_the_average() {
        let rs = results(&[(0.01, i64::MAX, 0.9), (0.01, i64::MAX, 0.9)]);
        assert_eq!(score_confidence(&rs, 20).sample_size, 2);
    }

    #[test]
    fn strong_experiment_scores_seven() {
        let rs = results(&[(0.01, 600, 0.9), (0.01, 600, 0.6), (0.05 - 1e-9, 600, 0.2)]);
        let score = score_confidence(&rs, 20);

        assert_eq!(
            (score.duration, score.sample_size, score.consistency, score.effect_size),
            (2, 2, 2, 1)
        );
        assert_eq!(score.total(), 7);
        assert_eq!(score.level(), ConfidenceLevel::High);
        assert_eq!(score.reasoning(), "High confidence: no limiting factors identified");
    }

    #[test]
    fn every_weak_signal_adds_a_note_in_order() {
        let rs = results(&[(0.01, 40, 0.1), (0.5, 40, 0.1), (0.5, 40, 0.1)]);
        let score = score_confidence(&rs, 3);

        assert_eq!(score.total(), 0);
        assert_eq!(score.level(), ConfidenceLevel::Low);
        assert_eq!(
            score.reasoning(),
            "Low confidence due to short experiment duration, small sample sizes, mixed results across metrics"
        );
    }

    #[test]
    fn middle_branches_add_points_without_notes() {
        let rs = results(&[(0.01, 200, 0.1), (0.5, 200, 0.1)]);
        let score = score_confidence(&rs, 10);

        assert_eq!(
            (score.duration, score.sample_size, score.consistency, score.effect_size),
            (1, 1, 1, 0)
        );
        assert_eq!(score.level(), ConfidenceLevel::Medium);
        assert_eq!(score.reasoning(), "Medium confidence: no limiting factors identified");
    }

    #[test]
    fn medium_with_a_note() {
        let rs = results(&[(0.01, 600, 0.1)]);
        let score = score_confidence(&rs, 3);
        assert_eq!(score.total(), 4);
        assert_eq!(score.reasoning(), "Medium confidence with short experiment duration");
    }

    #[test]
    fn no_significant_metrics_counts_as_consistent() {
        let rs = results(&[(0.5, 100, 0.0), (0.2, 100, 0.0)]);
        let score = score_confidence(&rs, 7);
        assert_eq!(score.consistency, 2);
        assert_eq!(score.sample_size, 1);
        assert_eq!(score.duration, 1);
        assert!(score.notes.is_empty());
    }

    #[test]
    fn duration_boundaries() {
        let rs = results(&[(0.01, 600, 0.9)]);
        assert_eq!(score_confidence(&rs, 14).duration, 2);
        assert_eq!(score_confidence(&rs, 13).duration, 1);
        assert_eq!(score_confidence(&rs, 7).duration, 1);
        assert_eq!(score_confidence(&rs, 6).duration, 0);
    }

    #[test]
    fn sample_and_consistency_boundaries() {
        assert_eq!(score_confidence(&results(&[(0.5, 500, 0.0)]), 14).sample_size, 2);
        assert_eq!(score_confidence(&results(&[(0.5, 499, 0.0)]), 14).sample_size, 1);
        assert_eq!(score_confidence(&results(&[(0.5, 99, 0.0)]), 14).sample_size, 0);

        // 4 of 5 significant is exactly 0.8.
        let rs = results(&[
            (0.01, 600, 0.0),
            (0.01, 600, 0.0),
            (0.01, 600, 0.0),
            (0.01, 600, 0.0),
            (0.5, 600, 0.0),
        ]);
        assert_eq!(score_confidence(&rs, 14).consistency, 2);
    }

    #[test]
    fn effect_signal_needs_half_the_metrics() {
        let half = results(&[(0.5, 600, 0.51), (0.5, 600, 0.0)]);
        assert_eq!(score_confidence(&half, 14).effect_size, 1);

        let exactly_half_d = results(&[(0.5, 600, 0.5), (0.5, 600, 0.0)]);
        assert_eq!(score_confidence(&exactly_half_d, 14).effect_size, 0);
    }
}
