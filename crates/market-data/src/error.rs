use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("No price data for '{instrument}' between {start} and {end}")]
    DataUnavailable {
        instrument: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Failed to load environment variables for database connection: {0}")]
    ConnectionConfigError(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Failed to read price file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("An error occurred during JSON deserialization: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Stored prices are malformed: {0}")]
    Malformed(#[from] core_types::CoreError),
}

impl DataError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DataError::DataUnavailable { .. })
    }
}
