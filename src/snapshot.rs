//! CSV snapshot persistence
//!
//! Every stage's output is written to a fixed file name inside the configured
//! output directory. Writes are plain overwrites.

use log::debug;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::error::AnalysisError;
use crate::pivot::PivotTable;
use crate::types::{AggregateRow, EpisodeRecord, GroupedCount, JoinedRecord};

pub const EPISODES_FILE: &str = "relabeled_episodes.csv";
pub const JOINED_FILE: &str = "trans_data.csv";
pub const GROUPED_FILE: &str = "deindexed.csv";
pub const PIVOT_FILE: &str = "pivoted_data.csv";
pub const AGGREGATE_FILE: &str = "reset_data.csv";

const EPISODE_COLUMNS: &[&str] = &[
    "participant",
    "episode_type",
    "episode_date",
    "certainty",
    "episode_num",
    "participant_episode",
    "begin_date",
    "end_date",
];

const JOINED_COLUMNS: &[&str] = &[
    "participant",
    "date",
    "time",
    "comparison_date",
    "episode_type",
    "episode_date",
    "certainty",
    "episode_num",
    "participant_episode",
    "begin_date",
    "end_date",
    "relative_date",
];

const GROUPED_COLUMNS: &[&str] = &["participant_episode", "relative_date", "certainty", "count"];

const AGGREGATE_COLUMNS: &[&str] = &["relative_date", "mean", "stddev"];

/// Writer for the per-stage CSV snapshots
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    output_dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn write_episodes(&self, episodes: &[EpisodeRecord]) -> Result<PathBuf, AnalysisError> {
        self.write_rows(EPISODES_FILE, EPISODE_COLUMNS, episodes)
    }

    pub fn write_joined(&self, rows: &[JoinedRecord]) -> Result<PathBuf, AnalysisError> {
        self.write_rows(JOINED_FILE, JOINED_COLUMNS, rows)
    }

    pub fn write_grouped(&self, rows: &[GroupedCount]) -> Result<PathBuf, AnalysisError> {
        self.write_rows(GROUPED_FILE, GROUPED_COLUMNS, rows)
    }

    pub fn write_aggregate(&self, rows: &[AggregateRow]) -> Result<PathBuf, AnalysisError> {
        self.write_rows(AGGREGATE_FILE, AGGREGATE_COLUMNS, rows)
    }

    /// Write the wide pivot table; empty cells mark days without messages
    pub fn write_pivot(&self, table: &PivotTable) -> Result<PathBuf, AnalysisError> {
        let path = self.prepare(PIVOT_FILE)?;
        let mut writer = csv::Writer::from_path(&path)?;

        let mut header = vec!["relative_date"];
        header.extend(table.participant_episodes.iter().map(String::as_str));
        writer.write_record(&header)?;

        for row in &table.rows {
            let mut record = vec![row.relative_date.to_string()];
            record.extend(
                row.counts
                    .iter()
                    .map(|c| c.map(|n| n.to_string()).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }
        writer.flush()?;

        debug!("Wrote {} pivot rows to {}", table.rows.len(), path.display());
        Ok(path)
    }

    /// Header is written explicitly so empty tables still carry their columns
    fn write_rows<T: Serialize>(
        &self,
        file_name: &str,
        columns: &[&str],
        rows: &[T],
    ) -> Result<PathBuf, AnalysisError> {
        let path = self.prepare(file_name)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)?;

        writer.write_record(columns)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        debug!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(path)
    }

    fn prepare(&self, file_name: &str) -> Result<PathBuf, AnalysisError> {
        fs::create_dir_all(&self.output_dir)?;
        Ok(self.output_dir.join(file_name))
    }
}
