//! Core table types for the time-window pipeline
//!
//! Each stage consumes one of these row types and produces a new vector of the
//! next: episodes and messages are joined into `JoinedRecord`s, which are then
//! counted into `DailyCount`/`GroupedCount` rows and finally `AggregateRow`s.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::AnalysisError;

/// Clinical episode classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EpisodeType {
    Attempt,
    Ideation,
    Depression,
    Positive,
}

impl EpisodeType {
    /// Normalize a user-supplied code to an episode type.
    ///
    /// Only the first character is significant and it is matched
    /// case-insensitively, so `"a"`, `"A"` and `"attempt"` all map to
    /// `Attempt`.
    pub fn from_code(code: &str) -> Result<Self, AnalysisError> {
        let first = code.chars().next().map(|c| c.to_ascii_lowercase());
        match first {
            Some('a') => Ok(EpisodeType::Attempt),
            Some('i') => Ok(EpisodeType::Ideation),
            Some('d') => Ok(EpisodeType::Depression),
            Some('p') => Ok(EpisodeType::Positive),
            _ => Err(AnalysisError::InvalidEpisodeTypeCode(code.to_string())),
        }
    }

    /// Canonical name as it appears in the episode source
    pub fn as_str(&self) -> &'static str {
        match self {
            EpisodeType::Attempt => "Attempt",
            EpisodeType::Ideation => "Ideation",
            EpisodeType::Depression => "Depression",
            EpisodeType::Positive => "Positive",
        }
    }
}

impl FromStr for EpisodeType {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl fmt::Display for EpisodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One episode row after relabeling, with its analysis window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeRecord {
    pub participant: String,
    pub episode_type: EpisodeType,
    pub episode_date: NaiveDate,
    pub certainty: String,
    pub episode_num: String,
    /// `participant` and `episode_num` joined by `_`
    pub participant_episode: String,
    /// First day of the window (inclusive)
    pub begin_date: NaiveDate,
    /// Last day of the window (inclusive)
    pub end_date: NaiveDate,
}

/// One outgoing message row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageRecord {
    pub participant: String,
    /// Date string exactly as read
    pub date: String,
    pub time: String,
    /// `date` parsed for window comparisons
    pub comparison_date: NaiveDate,
}

/// A message paired with one episode whose window contains it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedRecord {
    pub participant: String,
    pub date: String,
    pub time: String,
    pub comparison_date: NaiveDate,
    pub episode_type: EpisodeType,
    pub episode_date: NaiveDate,
    pub certainty: String,
    pub episode_num: String,
    pub participant_episode: String,
    pub begin_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Whole days from the episode to the message; negative means before
    pub relative_date: i64,
}

impl JoinedRecord {
    /// Pair a message with an episode, computing the relative day offset
    pub fn new(message: &MessageRecord, episode: &EpisodeRecord) -> Self {
        Self {
            participant: message.participant.clone(),
            date: message.date.clone(),
            time: message.time.clone(),
            comparison_date: message.comparison_date,
            episode_type: episode.episode_type,
            episode_date: episode.episode_date,
            certainty: episode.certainty.clone(),
            episode_num: episode.episode_num.clone(),
            participant_episode: episode.participant_episode.clone(),
            begin_date: episode.begin_date,
            end_date: episode.end_date,
            relative_date: (message.comparison_date - episode.episode_date).num_days(),
        }
    }

    /// Whether the message date lies inside the episode window
    pub fn in_window(&self) -> bool {
        self.begin_date <= self.comparison_date && self.comparison_date <= self.end_date
    }
}

/// Message count for one participant-episode on one relative day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub participant_episode: String,
    pub relative_date: i64,
    pub count: usize,
}

/// Message count bucketed by participant-episode, relative day and certainty
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupedCount {
    pub participant_episode: String,
    pub relative_date: i64,
    pub certainty: String,
    pub count: usize,
}

/// Mean and sample standard deviation of daily counts for one relative day
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateRow {
    pub relative_date: i64,
    pub mean: f64,
    /// NaN when only one participant-episode contributed
    pub stddev: f64,
}
