use serde::{Deserialize, Serialize};

/// A closed interval around an estimate, in the estimate's own units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

impl From<(f64, f64)> for ConfidenceInterval {
    fn from((lower, upper): (f64, f64)) -> Self {
        Self { lower, upper }
    }
}

/// The statistical result for a single metric of an experiment.
///
/// This struct is the final output of the `DidEstimator` and serves as the
/// data transfer object for statistical results throughout the entire system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidResult {
    // I. Group Means
    pub treatment_mean: f64,
    pub control_mean: f64,
    pub absolute_difference: f64,
    /// `absolute_difference / control_mean`, or 0 when the control mean is 0.
    pub relative_difference: f64,

    // II. Significance
    pub p_value: f64,
    /// Confidence level in percent (e.g. 95).
    pub confidence_level: u32,
    pub confidence_interval: ConfidenceInterval,

    // III. Sample Sizes (summed over all time points)
    pub sample_size_control: i64,
    pub sample_size_treatment: i64,

    // IV. Practical Significance
    /// Cohen's d.
    pub effect_size: f64,
}
