//! Episode source loader
//!
//! Selects and renames the five episode columns, keeps only the requested
//! episode type, and derives the analysis window around each episode date.

use chrono::{Datelike, Days, NaiveDate};
use log::{debug, info};
use serde::Deserialize;
use std::io::Read;

use super::{deserialize_row, flexible_reader, parse_date, record_line, require_columns, require_values, TableLoader};
use crate::error::AnalysisError;
use crate::types::{EpisodeRecord, EpisodeType};

/// Date format of the `EndDate` column
pub const EPISODE_DATE_FORMAT: &str = "%m/%d/%y";

/// chrono reads a `%y` of `69` as 2069; the episode dates put 69-99 in the 1900s
fn pivot_two_digit_year(date: NaiveDate) -> NaiveDate {
    if date.year() == 2069 {
        date.with_year(1969).unwrap_or(date)
    } else {
        date
    }
}

const REQUIRED_COLUMNS: [&str; 5] = ["ID", "episode", "EndDate", "Certainty", "episodeNum"];

/// Raw episode row as it appears in the source
#[derive(Debug, Deserialize)]
struct EpisodeRow {
    #[serde(rename = "ID")]
    id: String,
    episode: String,
    #[serde(rename = "EndDate")]
    end_date: String,
    #[serde(rename = "Certainty")]
    certainty: String,
    #[serde(rename = "episodeNum")]
    episode_num: String,
}

/// Loader for episode records of one type
#[derive(Debug, Clone)]
pub struct EpisodeLoader {
    episode_type: EpisodeType,
    begin_day: u32,
    end_day: u32,
}

impl EpisodeLoader {
    pub fn new(episode_type: EpisodeType, begin_day: u32, end_day: u32) -> Self {
        Self {
            episode_type,
            begin_day,
            end_day,
        }
    }

    fn to_record(&self, row: EpisodeRow, episode_date: NaiveDate) -> Result<EpisodeRecord, AnalysisError> {
        let begin_date = episode_date
            .checked_sub_days(Days::new(self.begin_day.into()))
            .ok_or(AnalysisError::DateOutOfRange {
                date: episode_date,
                days: self.begin_day,
            })?;
        let end_date = episode_date
            .checked_add_days(Days::new(self.end_day.into()))
            .ok_or(AnalysisError::DateOutOfRange {
                date: episode_date,
                days: self.end_day,
            })?;

        Ok(EpisodeRecord {
            participant_episode: format!("{}_{}", row.id, row.episode_num),
            participant: row.id,
            episode_type: self.episode_type,
            episode_date,
            certainty: row.certainty,
            episode_num: row.episode_num,
            begin_date,
            end_date,
        })
    }
}

impl TableLoader for EpisodeLoader {
    type Record = EpisodeRecord;

    fn read<R: Read>(&self, reader: R, source_name: &str) -> Result<Vec<EpisodeRecord>, AnalysisError> {
        let mut reader = flexible_reader(reader);
        let headers = reader.headers()?.clone();
        require_columns(&headers, &REQUIRED_COLUMNS, source_name)?;
        debug!("{source_name}: columns {:?}", headers.iter().collect::<Vec<_>>());

        let wanted = self.episode_type.as_str();
        let mut episodes = Vec::new();
        let mut total = 0usize;

        for result in reader.records() {
            let record = result?;
            total += 1;
            require_values(&record, &headers, &REQUIRED_COLUMNS, source_name)?;
            let row: EpisodeRow = deserialize_row(&record, &headers)?;

            // Other episode types are dropped before their dates are looked at
            if row.episode != wanted {
                continue;
            }

            let episode_date = pivot_two_digit_year(parse_date(
                &row.end_date,
                EPISODE_DATE_FORMAT,
                source_name,
                record_line(&record),
            )?);
            episodes.push(self.to_record(row, episode_date)?);
        }

        info!(
            "Loaded {} {} episodes from {} ({} rows read)",
            episodes.len(),
            wanted,
            source_name,
            total
        );
        Ok(episodes)
    }
}
