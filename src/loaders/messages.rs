//! Message log loader
//!
//! Keeps only outgoing messages and parses their dates.

use log::{debug, info};
use serde::Deserialize;
use std::io::Read;

use super::{deserialize_row, flexible_reader, parse_date, record_line, require_columns, require_values, TableLoader};
use crate::error::AnalysisError;
use crate::types::MessageRecord;

/// Date format of the `date` column
pub const MESSAGE_DATE_FORMAT: &str = "%Y-%m-%d";

/// `in_out` value marking an outgoing message
pub const OUTGOING: &str = "out";

const REQUIRED_COLUMNS: [&str; 4] = ["participant", "in_out", "date", "time"];

#[derive(Debug, Deserialize)]
struct MessageRow {
    participant: String,
    in_out: String,
    date: String,
    time: String,
}

/// Loader for outgoing message records
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageLoader;

impl TableLoader for MessageLoader {
    type Record = MessageRecord;

    fn read<R: Read>(&self, reader: R, source_name: &str) -> Result<Vec<MessageRecord>, AnalysisError> {
        let mut reader = flexible_reader(reader);
        let headers = reader.headers()?.clone();
        require_columns(&headers, &REQUIRED_COLUMNS, source_name)?;
        debug!("{source_name}: columns {:?}", headers.iter().collect::<Vec<_>>());

        let mut messages = Vec::new();
        let mut total = 0usize;

        for result in reader.records() {
            let record = result?;
            total += 1;
            require_values(&record, &headers, &REQUIRED_COLUMNS, source_name)?;
            let row: MessageRow = deserialize_row(&record, &headers)?;

            if row.in_out != OUTGOING {
                continue;
            }

            let comparison_date =
                parse_date(&row.date, MESSAGE_DATE_FORMAT, source_name, record_line(&record))?;
            messages.push(MessageRecord {
                participant: row.participant,
                date: row.date,
                time: row.time,
                comparison_date,
            });
        }

        info!(
            "Loaded {} outgoing messages from {} ({} rows read)",
            messages.len(),
            source_name,
            total
        );
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_keeps_only_outgoing() {
        let csv = "participant,in_out,date,time,contact\n\
                   p1,out,2020-01-12,08:15:00,c1\n\
                   p1,in,2020-01-12,08:16:00,c1\n\
                   p2,out,2020-01-20,22:00:00,c2\n";
        let messages = MessageLoader.read(csv.as_bytes(), "sms.csv").unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].participant, "p1");
        assert_eq!(messages[0].date, "2020-01-12");
        assert_eq!(messages[0].time, "08:15:00");
        assert_eq!(
            messages[0].comparison_date,
            NaiveDate::from_ymd_opt(2020, 1, 12).unwrap()
        );
        assert_eq!(messages[1].participant, "p2");
    }

    #[test]
    fn test_incoming_rows_skip_date_validation() {
        let csv = "participant,in_out,date,time\n\
                   p1,in,garbage,08:16:00\n\
                   p1,out,2020-01-12,08:15:00\n";
        let messages = MessageLoader.read(csv.as_bytes(), "sms.csv").unwrap();
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn test_malformed_outgoing_date() {
        let csv = "participant,in_out,date,time\np1,out,01/12/2020,08:15:00\n";
        let err = MessageLoader.read(csv.as_bytes(), "sms.csv").unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::DateParseError { row: 2, format: MESSAGE_DATE_FORMAT, .. }
        ));
    }

    #[test]
    fn test_short_rows() {
        let csv = "participant,in_out,date,time,contact\n\
                   p1,out,2020-01-12,08:15:00\n";
        let messages = MessageLoader.read(csv.as_bytes(), "sms.csv").unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].time, "08:15:00");

        let csv = "participant,in_out,date,time,contact\n\
                   p1,out,2020-01-12\n";
        let err = MessageLoader.read(csv.as_bytes(), "sms.csv").unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::MissingValue { row: 2, ref column, .. } if column == "time"
        ));
    }

    #[test]
    fn test_missing_direction_column() {
        let csv = "participant,date,time\np1,2020-01-12,08:15:00\n";
        let err = MessageLoader.read(csv.as_bytes(), "sms.csv").unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::SchemaError { ref column, .. } if column == "in_out"
        ));
    }
}
