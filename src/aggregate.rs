//! Daily count aggregation
//!
//! Two explicit grouping passes: messages are first counted per
//! participant-episode and relative day, then those counts are summarized
//! per relative day as a mean and sample standard deviation.

use log::info;
use std::collections::BTreeMap;

use crate::types::{AggregateRow, DailyCount, JoinedRecord};

/// Aggregator for joined message rows
pub struct Aggregator;

impl Aggregator {
    /// Count joined rows and summarize the counts per relative day
    pub fn aggregate(rows: &[JoinedRecord]) -> Vec<AggregateRow> {
        let counts = Self::daily_counts(rows);
        let summary = Self::summarize(&counts);
        info!(
            "Aggregated {} daily counts into {} relative days",
            counts.len(),
            summary.len()
        );
        summary
    }

    /// First pass: messages per (participant_episode, relative_date), sorted by key
    pub fn daily_counts(rows: &[JoinedRecord]) -> Vec<DailyCount> {
        let mut counts: BTreeMap<(&str, i64), usize> = BTreeMap::new();
        for row in rows {
            *counts
                .entry((row.participant_episode.as_str(), row.relative_date))
                .or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|((participant_episode, relative_date), count)| DailyCount {
                participant_episode: participant_episode.to_string(),
                relative_date,
                count,
            })
            .collect()
    }

    /// Second pass: mean and sample stddev of the counts for each relative day
    pub fn summarize(counts: &[DailyCount]) -> Vec<AggregateRow> {
        let mut by_day: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
        for count in counts {
            by_day
                .entry(count.relative_date)
                .or_default()
                .push(count.count as f64);
        }

        by_day
            .into_iter()
            .map(|(relative_date, values)| AggregateRow {
                relative_date,
                mean: mean(&values),
                stddev: sample_std(&values),
            })
            .collect()
    }
}

/// Arithmetic mean; NaN for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation with the N-1 denominator; NaN for fewer than two values
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EpisodeType;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn joined(participant_episode: &str, relative_date: i64) -> JoinedRecord {
        let episode_date = NaiveDate::from_ymd_opt(2020, 1, 10).unwrap();
        let date = episode_date + chrono::Duration::days(relative_date);
        JoinedRecord {
            participant: participant_episode.split('_').next().unwrap_or_default().to_string(),
            date: date.format("%Y-%m-%d").to_string(),
            time: "09:00:00".to_string(),
            comparison_date: date,
            episode_type: EpisodeType::Attempt,
            episode_date,
            certainty: "high".to_string(),
            episode_num: "1".to_string(),
            participant_episode: participant_episode.to_string(),
            begin_date: episode_date - chrono::Duration::days(7),
            end_date: episode_date + chrono::Duration::days(7),
            relative_date,
        }
    }

    #[test]
    fn test_daily_counts() {
        let rows = vec![
            joined("p2_1", 0),
            joined("p1_1", 1),
            joined("p1_1", 1),
            joined("p1_1", -1),
        ];

        let counts = Aggregator::daily_counts(&rows);
        assert_eq!(
            counts,
            vec![
                DailyCount {
                    participant_episode: "p1_1".to_string(),
                    relative_date: -1,
                    count: 1
                },
                DailyCount {
                    participant_episode: "p1_1".to_string(),
                    relative_date: 1,
                    count: 2
                },
                DailyCount {
                    participant_episode: "p2_1".to_string(),
                    relative_date: 0,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_mean_and_sample_std() {
        // p1_1 sends 2 on day 0, p2_1 sends 4, p3_1 sends 6
        let mut rows = Vec::new();
        for (key, n) in [("p1_1", 2), ("p2_1", 4), ("p3_1", 6)] {
            for _ in 0..n {
                rows.push(joined(key, 0));
            }
        }

        let summary = Aggregator::aggregate(&rows);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].relative_date, 0);
        assert!((summary[0].mean - 4.0).abs() < 1e-12);
        // sqrt(((2-4)^2 + 0 + (6-4)^2) / 2) = 2
        assert!((summary[0].stddev - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_observation_stddev_is_nan() {
        let rows = vec![joined("p1_1", 3), joined("p1_1", 3), joined("p1_1", -2), joined("p2_1", -2)];

        let summary = Aggregator::aggregate(&rows);
        let days: Vec<i64> = summary.iter().map(|r| r.relative_date).collect();
        assert_eq!(days, vec![-2, 3]);

        assert_eq!(summary[0].stddev, 0.0);
        assert!((summary[1].mean - 2.0).abs() < 1e-12);
        assert!(summary[1].stddev.is_nan());
    }

    #[test]
    fn test_empty_input() {
        assert!(Aggregator::aggregate(&[]).is_empty());
        assert!(mean(&[]).is_nan());
        assert!(sample_std(&[1.0]).is_nan());
    }
}
