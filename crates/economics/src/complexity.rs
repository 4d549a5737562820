use analytics::{DEFAULT_ALPHA, DidResult, is_significant};
use core_types::Complexity;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityEstimate {
    pub complexity: Complexity,
    pub reasoning: String,
    pub recommendations: Vec<String>,
}

/// Rates rollout complexity by how many metrics moved significantly.
pub fn estimate_implementation_complexity(
    results: &IndexMap<String, DidResult>,
) -> ComplexityEstimate {
    let significant = results
        .values()
        .filter(|r| is_significant(r.p_value, DEFAULT_ALPHA))
        .count();

    let (complexity, reasoning, recommendations) = match significant {
        0 => (
            Complexity::Low,
            "No significant effects to implement",
            vec![
                "Monitor results over longer period",
                "Consider alternative approaches",
            ],
        ),
        1 => (
            Complexity::Low,
            "Single metric optimization is straightforward to implement",
            vec!["Focus implementation on single significant metric"],
        ),
        2..=3 => (
            Complexity::Medium,
            "Multiple metrics require coordinated implementation approach",
            vec![
                "Implement changes gradually to monitor individual metric impacts",
                "Consider A/B testing individual components",
            ],
        ),
        _ => (
            Complexity::High,
            "Complex multi-metric optimization requires careful orchestration",
            vec![
                "Develop comprehensive implementation plan",
                "Consider phased rollout to manage complexity",
                "Establish monitoring for all affected metrics",
            ],
        ),
    };

    ComplexityEstimate {
        complexity,
        reasoning: reasoning.to_string(),
        recommendations: recommendations.into_iter().map(String::from).collect(),
    }
}
