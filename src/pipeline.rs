//! Pipeline orchestration
//!
//! This module provides the public API for a full analysis run: load the
//! episode and message sources, join them, optionally dump the per-participant
//! pivot, and aggregate daily counts. Each stage's output is persisted as a CSV
//! snapshot before the next stage runs.

use log::info;
use std::path::{Path, PathBuf};

use crate::aggregate::Aggregator;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::join::Joiner;
use crate::loaders::{EpisodeLoader, MessageLoader, TableLoader};
use crate::pivot::PivotDumper;
use crate::snapshot::SnapshotWriter;
use crate::types::{AggregateRow, JoinedRecord};

/// Row counts and written files from one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub episodes: usize,
    pub messages: usize,
    pub joined: usize,
    pub aggregate: Vec<AggregateRow>,
    pub written: Vec<PathBuf>,
}

/// Run the full analysis with the given configuration.
///
/// # Example
/// ```ignore
/// let config = AnalysisConfig::new(EpisodeType::Attempt, 7, 7);
/// let summary = analyze_time_window(Path::new("sms.csv"), Path::new("episodes.csv"), &config)?;
/// ```
pub fn analyze_time_window(
    messages_file: &Path,
    episodes_file: &Path,
    config: &AnalysisConfig,
) -> Result<RunSummary, AnalysisError> {
    WindowAnalyzer::new(config.clone()).run(messages_file, episodes_file)
}

/// Analyzer holding the run configuration and snapshot writer
pub struct WindowAnalyzer {
    config: AnalysisConfig,
    writer: SnapshotWriter,
}

impl WindowAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        let writer = SnapshotWriter::new(config.output_dir.clone());
        Self { config, writer }
    }

    /// Run every stage in order; the first error aborts the run.
    ///
    /// Pipeline stages:
    /// 1. EpisodeLoader - relabel, filter by type, compute windows
    /// 2. MessageLoader - keep outgoing messages, parse dates
    /// 3. Joiner - join by participant, keep in-window rows
    /// 4. PivotDumper - diagnostic tables (only with `dump_participants`)
    /// 5. Aggregator - mean/stddev of daily counts per relative day
    pub fn run(&self, messages_file: &Path, episodes_file: &Path) -> Result<RunSummary, AnalysisError> {
        let mut written = Vec::new();

        // Stage 1: episodes
        let episode_loader = EpisodeLoader::new(
            self.config.episode_type,
            self.config.begin_day,
            self.config.end_day,
        );
        let episodes = episode_loader.load(episodes_file)?;
        written.push(self.writer.write_episodes(&episodes)?);

        // Stage 2: messages
        let messages = MessageLoader.load(messages_file)?;

        // Stage 3: join and window filter
        let joined = Joiner::join(&messages, &episodes);
        written.push(self.writer.write_joined(&joined)?);

        // Stage 4: optional diagnostics
        if self.config.dump_participants {
            written.extend(self.dump_participants(&joined)?);
        }

        // Stage 5: aggregate
        let aggregate = Aggregator::aggregate(&joined);
        written.push(self.writer.write_aggregate(&aggregate)?);

        info!(
            "Run complete: {} episodes, {} messages, {} joined rows, {} relative days",
            episodes.len(),
            messages.len(),
            joined.len(),
            aggregate.len()
        );

        Ok(RunSummary {
            episodes: episodes.len(),
            messages: messages.len(),
            joined: joined.len(),
            aggregate,
            written,
        })
    }

    fn dump_participants(&self, joined: &[JoinedRecord]) -> Result<Vec<PathBuf>, AnalysisError> {
        let grouped = PivotDumper::grouped_counts(joined);
        let grouped_path = self.writer.write_grouped(&grouped)?;
        let table = PivotDumper::pivot(&grouped);
        let pivot_path = self.writer.write_pivot(&table)?;
        Ok(vec![grouped_path, pivot_path])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{AGGREGATE_FILE, EPISODES_FILE, GROUPED_FILE, JOINED_FILE, PIVOT_FILE};
    use crate::types::EpisodeType;
    use std::fs;
    use tempfile::TempDir;

    fn sample_episodes_csv() -> &'static str {
        "ID,episode,EndDate,Certainty,episodeNum\n\
         p1,Attempt,01/10/20,high,1\n\
         p2,Attempt,01/10/20,low,1\n\
         p3,Ideation,01/10/20,low,1\n"
    }

    fn sample_messages_csv() -> &'static str {
        "participant,in_out,date,time\n\
         p1,out,2020-01-12,08:00:00\n\
         p1,out,2020-01-12,09:00:00\n\
         p1,in,2020-01-12,09:30:00\n\
         p1,out,2020-01-20,10:00:00\n\
         p2,out,2020-01-12,11:00:00\n\
         p2,out,2020-01-08,11:00:00\n\
         p3,out,2020-01-12,12:00:00\n"
    }

    fn write_inputs(dir: &TempDir) -> (PathBuf, PathBuf) {
        let messages = dir.path().join("sms.csv");
        let episodes = dir.path().join("episodes.csv");
        fs::write(&messages, sample_messages_csv()).unwrap();
        fs::write(&episodes, sample_episodes_csv()).unwrap();
        (messages, episodes)
    }

    #[test]
    fn test_full_run() {
        let dir = tempfile::tempdir().unwrap();
        let (messages, episodes) = write_inputs(&dir);
        let out = dir.path().join("out");
        let config = AnalysisConfig::new(EpisodeType::Attempt, 3, 5).with_output_dir(&out);

        let summary = analyze_time_window(&messages, &episodes, &config).unwrap();

        assert_eq!(summary.episodes, 2);
        assert_eq!(summary.messages, 6);
        // p1 x2 on day 2, p2 on days 2 and -2; the 01-20 message and p3 drop out
        assert_eq!(summary.joined, 4);
        assert_eq!(
            summary.written,
            vec![
                out.join(EPISODES_FILE),
                out.join(JOINED_FILE),
                out.join(AGGREGATE_FILE)
            ]
        );
        assert!(!out.join(PIVOT_FILE).exists());

        let days: Vec<i64> = summary.aggregate.iter().map(|r| r.relative_date).collect();
        assert_eq!(days, vec![-2, 2]);
        assert!((summary.aggregate[0].mean - 1.0).abs() < 1e-12);
        assert!(summary.aggregate[0].stddev.is_nan());
        assert!((summary.aggregate[1].mean - 1.5).abs() < 1e-12);
        assert!((summary.aggregate[1].stddev - 0.5_f64.sqrt()).abs() < 1e-12);

        let result = fs::read_to_string(out.join(AGGREGATE_FILE)).unwrap();
        assert!(result.starts_with("relative_date,mean,stddev\n-2,1.0,NaN\n"));

        let joined = fs::read_to_string(out.join(JOINED_FILE)).unwrap();
        assert_eq!(joined.lines().count(), 5);
        assert!(joined.contains("p1,2020-01-12,08:00:00,2020-01-12,Attempt,2020-01-10,high,1,p1_1,2020-01-07,2020-01-15,2"));
    }

    #[test]
    fn test_dump_participants_writes_pivot() {
        let dir = tempfile::tempdir().unwrap();
        let (messages, episodes) = write_inputs(&dir);
        let config = AnalysisConfig::new(EpisodeType::Attempt, 3, 5)
            .with_output_dir(dir.path())
            .with_dump_participants(true);

        let summary = WindowAnalyzer::new(config).run(&messages, &episodes).unwrap();
        assert_eq!(summary.written.len(), 5);

        let grouped = fs::read_to_string(dir.path().join(GROUPED_FILE)).unwrap();
        assert!(grouped.contains("p1_1,2,high,2\n"));

        let pivot = fs::read_to_string(dir.path().join(PIVOT_FILE)).unwrap();
        assert_eq!(pivot, "relative_date,p1_1,p2_1\n-2,,1\n2,2,1\n");
    }

    #[test]
    fn test_missing_input_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig::default().with_output_dir(dir.path());
        let result = analyze_time_window(
            &dir.path().join("missing.csv"),
            &dir.path().join("missing-episodes.csv"),
            &config,
        );
        assert!(matches!(result, Err(AnalysisError::Io(_))));
    }

    #[test]
    fn test_bad_message_date_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let (_, episodes) = write_inputs(&dir);
        let messages = dir.path().join("bad-sms.csv");
        fs::write(&messages, "participant,in_out,date,time\np1,out,12/01/2020,08:00\n").unwrap();

        let config = AnalysisConfig::new(EpisodeType::Attempt, 3, 5).with_output_dir(dir.path());
        let result = analyze_time_window(&messages, &episodes, &config);

        assert!(matches!(result, Err(AnalysisError::DateParseError { .. })));
        // Episodes were already persisted; the joined snapshot never was
        assert!(dir.path().join(EPISODES_FILE).exists());
        assert!(!dir.path().join(JOINED_FILE).exists());
    }
}
