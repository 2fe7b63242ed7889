//! Timewindow CLI - message activity around clinical episodes
//!
//! Reads a message log and an episode file, writes the per-stage CSV snapshots
//! and the final per-day aggregate into the output directory.

use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

use sms_timewindow::{AnalysisConfig, AnalysisError, EpisodeType, WindowAnalyzer, VERSION};

/// Timewindow - aggregate outgoing messages around clinical episodes
#[derive(Parser)]
#[command(name = "timewindow")]
#[command(version = VERSION)]
#[command(about = "Aggregate outgoing message counts by day relative to each episode", long_about = None)]
struct Cli {
    /// Input aggregate message file with all participants
    #[arg(short = 'i', long)]
    input_file: PathBuf,

    /// Input aggregate episodes file with participants
    #[arg(short = 'E', long)]
    episodes_file: PathBuf,

    /// Number of days before an episode at which the window begins
    #[arg(short = 'b', long)]
    begin_day: u32,

    /// Number of days after an episode at which the window ends
    #[arg(short = 'e', long)]
    end_day: u32,

    /// Episode type: [a]ttempt, [i]deation, [d]epression or [p]ositive
    #[arg(short = 't', long, default_value = "a", value_parser = EpisodeType::from_code)]
    episode_type: EpisodeType,

    /// Also write the per-participant count tables (deindexed.csv, pivoted_data.csv)
    #[arg(short = 'd', long)]
    dump_participants: bool,

    /// Directory for the CSV outputs
    #[arg(short = 'o', long, default_value = ".")]
    output_dir: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AnalysisError> {
    let config = AnalysisConfig::new(cli.episode_type, cli.begin_day, cli.end_day)
        .with_dump_participants(cli.dump_participants)
        .with_output_dir(cli.output_dir);

    let summary = WindowAnalyzer::new(config).run(&cli.input_file, &cli.episodes_file)?;

    for path in &summary.written {
        info!("Wrote {}", path.display());
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<AnalysisError> for CliError {
    fn from(e: AnalysisError) -> Self {
        let message = e.to_string();
        let (code, hint) = match e {
            AnalysisError::InvalidEpisodeTypeCode(_) => (
                "INVALID_EPISODE_TYPE",
                Some("Use one of a, i, d or p"),
            ),
            AnalysisError::DateParseError { .. } => (
                "DATE_PARSE_ERROR",
                Some("Episode dates must be MM/DD/YY and message dates YYYY-MM-DD"),
            ),
            AnalysisError::DateOutOfRange { .. } => (
                "DATE_OUT_OF_RANGE",
                Some("Reduce --begin-day or --end-day"),
            ),
            AnalysisError::SchemaError { .. } => (
                "SCHEMA_ERROR",
                Some("Check the input file headers"),
            ),
            AnalysisError::MissingValue { .. } => (
                "MISSING_VALUE",
                Some("Fill the required column in the reported row"),
            ),
            AnalysisError::Csv(_) => ("CSV_ERROR", Some("Check the delimited file syntax")),
            AnalysisError::Io(_) => ("IO_ERROR", Some("Check file paths and permissions")),
        };

        CliError {
            code: code.to_string(),
            message,
            hint: hint.map(str::to_string),
        }
    }
}
