//! Run configuration
//!
//! Everything a run needs besides the two input paths is carried here and
//! passed explicitly into the analyzer.

use std::path::PathBuf;

use crate::types::EpisodeType;

/// Parameters for one analysis run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Episodes of this type are analyzed; others are dropped on load
    pub episode_type: EpisodeType,
    /// Days before the episode date at which the window opens
    pub begin_day: u32,
    /// Days after the episode date at which the window closes
    pub end_day: u32,
    /// Also write the per-participant diagnostic tables
    pub dump_participants: bool,
    /// Directory the CSV snapshots are written into
    pub output_dir: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            episode_type: EpisodeType::Attempt,
            begin_day: 0,
            end_day: 0,
            dump_participants: false,
            output_dir: PathBuf::from("."),
        }
    }
}

impl AnalysisConfig {
    /// Create a config for the given episode type and window, writing to the
    /// current directory
    pub fn new(episode_type: EpisodeType, begin_day: u32, end_day: u32) -> Self {
        Self {
            episode_type,
            begin_day,
            end_day,
            ..Default::default()
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_dump_participants(mut self, dump: bool) -> Self {
        self.dump_participants = dump;
        self
    }
}
