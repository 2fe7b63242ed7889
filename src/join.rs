//! Message/episode join
//!
//! Pairs every outgoing message with each episode of the same participant,
//! keeps the pairs whose message date falls inside the episode window, and
//! annotates them with the day offset from the episode.

use log::{debug, info};
use std::collections::HashMap;

use crate::types::{EpisodeRecord, JoinedRecord, MessageRecord};

/// Joiner for messages and episode windows
pub struct Joiner;

impl Joiner {
    /// Left-join messages to episodes by participant, then keep in-window rows.
    ///
    /// Message order is preserved; a message matching several episodes is
    /// repeated once per episode, in episode order. Messages without a
    /// matching window are dropped.
    pub fn join(messages: &[MessageRecord], episodes: &[EpisodeRecord]) -> Vec<JoinedRecord> {
        let mut by_participant: HashMap<&str, Vec<&EpisodeRecord>> = HashMap::new();
        for episode in episodes {
            by_participant
                .entry(episode.participant.as_str())
                .or_default()
                .push(episode);
        }

        let mut unmatched = 0usize;
        let mut joined = Vec::new();
        for message in messages {
            match by_participant.get(message.participant.as_str()) {
                Some(matches) => {
                    joined.extend(matches.iter().map(|ep| JoinedRecord::new(message, ep)));
                }
                None => unmatched += 1,
            }
        }
        debug!(
            "Join produced {} candidate rows; {} messages had no episode",
            joined.len(),
            unmatched
        );

        let joined = Self::retain_in_window(joined);
        info!("{} message/episode rows fall inside a window", joined.len());
        joined
    }

    /// Keep rows with `begin_date <= comparison_date <= end_date`
    pub fn retain_in_window(mut rows: Vec<JoinedRecord>) -> Vec<JoinedRecord> {
        rows.retain(JoinedRecord::in_window);
        rows
    }
}
