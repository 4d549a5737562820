use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EconomicsError {
    #[error("Experiment duration must be positive, got {0} days")]
    InvalidDuration(String),

    #[error("Non-finite {field} for metric '{metric_id}'")]
    NonFiniteValue {
        metric_id: String,
        field: &'static str,
    },

    #[error("Dollar amount overflowed while computing {0}")]
    Overflow(&'static str),
}
