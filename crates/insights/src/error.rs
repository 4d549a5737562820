use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InsightError {
    #[error("Cannot synthesize insights without at least one analyzed metric")]
    NoResults,
}
