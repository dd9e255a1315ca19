use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("Invalid backtest configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Market data error: {0}")]
    Data(#[from] market_data::DataError),

    #[error("Factor calculation error: {0}")]
    Factor(#[from] factors::FactorError),

    #[error("Portfolio construction error: {0}")]
    Portfolio(#[from] portfolio::PortfolioError),

    #[error("Return series error: {0}")]
    Core(#[from] core_types::CoreError),

    #[error("Progress bar template error: {0}")]
    ProgressBarTemplate(String),
}

impl From<indicatif::style::TemplateError> for BacktestError {
    fn from(error: indicatif::style::TemplateError) -> Self {
        BacktestError::ProgressBarTemplate(error.to_string())
    }
}
