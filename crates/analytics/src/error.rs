use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Cannot perform DiD analysis on an empty time series")]
    EmptySeries,

    #[error("Calculation produced a non-finite value for '{0}'")]
    NonFinite(&'static str),

    #[error("Summed sample sizes overflow a 64-bit count")]
    SampleSizeOverflow,
}
