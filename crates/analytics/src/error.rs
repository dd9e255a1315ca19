use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Strategy and benchmark share no trading dates")]
    NoOverlap,
}
