use core_types::{Complexity, ConfidenceLevel};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplementationGuidance {
    pub complexity: Complexity,
    /// One of "1-2 weeks", "2-4 weeks", "1-2 months", "2+ months".
    pub estimated_effort: String,
    pub critical_success_factors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceAssessment {
    pub level: ConfidenceLevel,
    pub reasoning: String,
}

/// The recommendation report for one experiment analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightAnalysis {
    pub summary: String,
    pub key_findings: Vec<String>,
    pub recommendations: Vec<String>,
    pub risk_factors: Vec<String>,
    pub implementation_guidance: ImplementationGuidance,
    pub confidence: ConfidenceAssessment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_in_the_persisted_shape() {
        let analysis = InsightAnalysis {
            summary: "s".to_string(),
            key_findings: vec!["f".to_string()],
            recommendations: vec![],
            risk_factors: vec![],
            implementation_guidance: ImplementationGuidance {
                complexity: Complexity::Medium,
                estimated_effort: "2-4 weeks".to_string(),
                critical_success_factors: vec![],
            },
            confidence: ConfidenceAssessment {
                level: ConfidenceLevel::High,
                reasoning: "r".to_string(),
            },
        };

        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["keyFindings"][0], "f");
        assert_eq!(json["implementationGuidance"]["complexity"], "medium");
        assert_eq!(json["implementationGuidance"]["estimatedEffort"], "2-4 weeks");
        assert_eq!(json["confidence"]["level"], "high");

        let back: InsightAnalysis = serde_json::from_value(json).unwrap();
        assert_eq!(back, analysis);
    }
}
