//! Source table loaders
//!
//! This module provides loaders that read the delimited episode and message
//! sources, check their headers, and map each retained row to a typed record.

mod episodes;
mod messages;

pub use episodes::EpisodeLoader;
pub use messages::MessageLoader;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::AnalysisError;

/// Trait for loaders that turn a delimited source into typed records
pub trait TableLoader {
    type Record;

    /// Read records from any reader; `source_name` is used in error messages
    fn read<R: Read>(&self, reader: R, source_name: &str)
        -> Result<Vec<Self::Record>, AnalysisError>;

    /// Read records from a file on disk
    fn load(&self, path: &Path) -> Result<Vec<Self::Record>, AnalysisError> {
        let file = File::open(path)?;
        self.read(BufReader::new(file), &path.display().to_string())
    }
}

/// Build a reader that accepts rows shorter than the header
fn flexible_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new().flexible(true).from_reader(reader)
}

/// Fail with a schema error naming the first required column absent from `headers`
fn require_columns(
    headers: &StringRecord,
    required: &[&str],
    source_name: &str,
) -> Result<(), AnalysisError> {
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(AnalysisError::SchemaError {
                source_file: source_name.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Fail with a missing-value error naming the first required column a short
/// row does not reach
fn require_values(
    record: &StringRecord,
    headers: &StringRecord,
    required: &[&str],
    source_name: &str,
) -> Result<(), AnalysisError> {
    for column in required {
        let reached = headers
            .iter()
            .position(|h| h == *column)
            .is_some_and(|idx| idx < record.len());
        if !reached {
            return Err(AnalysisError::MissingValue {
                source_file: source_name.to_string(),
                row: record_line(record),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Deserialize a row against only the headers it reaches, so trailing
/// optional columns may be absent
fn deserialize_row<T: DeserializeOwned>(
    record: &StringRecord,
    headers: &StringRecord,
) -> Result<T, AnalysisError> {
    if record.len() >= headers.len() {
        return Ok(record.deserialize(Some(headers))?);
    }
    let reached: StringRecord = headers.iter().take(record.len()).collect();
    Ok(record.deserialize(Some(&reached))?)
}

fn parse_date(
    value: &str,
    format: &'static str,
    source_name: &str,
    row: usize,
) -> Result<NaiveDate, AnalysisError> {
    NaiveDate::parse_from_str(value, format).map_err(|_| AnalysisError::DateParseError {
        source_file: source_name.to_string(),
        row,
        value: value.to_string(),
        format,
    })
}

/// Line number of a record in its source, for error messages
fn record_line(record: &StringRecord) -> usize {
    record.position().map(|p| p.line() as usize).unwrap_or(0)
}
