use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortfolioError {
    #[error("Weighting produced an invalid portfolio: {0}")]
    InvalidPortfolio(#[from] core_types::CoreError),

    #[error("Duplicate instrument '{0}' in ranked list")]
    DuplicateInstrument(String),
}
