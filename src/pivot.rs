//! Diagnostic pivot of per-participant daily counts
//!
//! Produces the long (`GroupedCount`) and wide (`PivotTable`) views of how many
//! messages each participant-episode sent on each relative day.

use log::info;
use std::collections::{BTreeMap, BTreeSet};

use crate::types::{GroupedCount, JoinedRecord};

/// Wide table: one row per relative day, one column per participant-episode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PivotTable {
    /// Column keys, sorted
    pub participant_episodes: Vec<String>,
    pub rows: Vec<PivotRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotRow {
    pub relative_date: i64,
    /// Parallel to `PivotTable::participant_episodes`; `None` where no messages were sent
    pub counts: Vec<Option<usize>>,
}

/// Builder for the diagnostic pivot tables
pub struct PivotDumper;

impl PivotDumper {
    /// Count rows per (participant_episode, relative_date, certainty), sorted by key
    pub fn grouped_counts(rows: &[JoinedRecord]) -> Vec<GroupedCount> {
        let mut counts: BTreeMap<(&str, i64, &str), usize> = BTreeMap::new();
        for row in rows {
            let key = (
                row.participant_episode.as_str(),
                row.relative_date,
                row.certainty.as_str(),
            );
            *counts.entry(key).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|((participant_episode, relative_date, certainty), count)| GroupedCount {
                participant_episode: participant_episode.to_string(),
                relative_date,
                certainty: certainty.to_string(),
                count,
            })
            .collect()
    }

    /// Reshape grouped counts into a wide table.
    ///
    /// Buckets that differ only by certainty land in the same cell and are summed.
    pub fn pivot(grouped: &[GroupedCount]) -> PivotTable {
        let participant_episodes: Vec<String> = grouped
            .iter()
            .map(|g| g.participant_episode.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let column_of: BTreeMap<&str, usize> = participant_episodes
            .iter()
            .enumerate()
            .map(|(idx, key)| (key.as_str(), idx))
            .collect();

        let mut by_day: BTreeMap<i64, Vec<Option<usize>>> = BTreeMap::new();
        for group in grouped {
            let cells = by_day
                .entry(group.relative_date)
                .or_insert_with(|| vec![None; participant_episodes.len()]);
            if let Some(&col) = column_of.get(group.participant_episode.as_str()) {
                let cell = &mut cells[col];
                *cell = Some(cell.unwrap_or(0) + group.count);
            }
        }

        let rows: Vec<PivotRow> = by_day
            .into_iter()
            .map(|(relative_date, counts)| PivotRow {
                relative_date,
                counts,
            })
            .collect();

        info!(
            "Pivoted {} participant-episodes over {} relative days",
            participant_episodes.len(),
            rows.len()
        );

        PivotTable {
            participant_episodes,
            rows,
        }
    }
}
