use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FactorError {
    #[error("No price data for '{instrument}' between {start} and {end}")]
    DataUnavailable {
        instrument: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("No instrument has a defined composite score on {0}")]
    InsufficientUniverse(NaiveDate),

    #[error("Price {0} cannot be represented as f64")]
    Conversion(String),

    #[error(transparent)]
    Core(#[from] core_types::CoreError),
}
