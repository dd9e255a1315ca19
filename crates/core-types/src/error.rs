use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Calculation error: {0}")]
    Calculation(String),

    #[error("Series for '{instrument}' is not strictly increasing at {date}")]
    UnorderedSeries { instrument: String, date: NaiveDate },

    #[error("Price for '{instrument}' on {date} must be positive")]
    NonPositivePrice { instrument: String, date: NaiveDate },

    #[error("Invalid portfolio weights: {0}")]
    InvalidWeights(String),

    #[error("Unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
}
