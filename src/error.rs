//! Error types for the time-window analysis

use thiserror::Error;

/// Errors that can occur while loading, joining, or persisting tables
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid episode type code: {0}")]
    InvalidEpisodeTypeCode(String),

    #[error("Date parse error in {source_file} (row {row}): {value:?} does not match {format}")]
    DateParseError {
        source_file: String,
        row: usize,
        value: String,
        format: &'static str,
    },

    #[error("Window around {date} extends {days} days past the supported date range")]
    DateOutOfRange { date: chrono::NaiveDate, days: u32 },

    #[error("Missing required column {column:?} in {source_file}")]
    SchemaError { source_file: String, column: String },

    #[error("Row {row} of {source_file} has no value for required column {column:?}")]
    MissingValue {
        source_file: String,
        row: usize,
        column: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
