//! SMS Timewindow - message activity around clinical episodes
//!
//! Joins clinical episode records with outgoing message logs and summarizes how
//! message volume changes in a window around each episode through a linear
//! pipeline: episode loading → message loading → window join → (optional
//! pivot dump) → daily count aggregation.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod join;
pub mod loaders;
pub mod pipeline;
pub mod pivot;
pub mod snapshot;
pub mod types;

pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use pipeline::{analyze_time_window, RunSummary, WindowAnalyzer};
pub use types::{AggregateRow, EpisodeRecord, EpisodeType, JoinedRecord, MessageRecord};

/// Crate version, reported by the CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
