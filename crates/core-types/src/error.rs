use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Metric value {value} for '{metric_id}' violates validation rule: {rule}")]
    RuleViolation {
        metric_id: String,
        value: String,
        rule: String,
    },
}
