//! Command-line front end for the inflow tools.
//!
//! Every tool the host agent exposes is reachable here, which makes the
//! tools easy to try against the live workflow or a directory of saved
//! responses:
//!
//! ```text
//! inflow_service pictures --feed daily-forecast --start 2025-08-05 --end 2025-08-09
//! inflow_service inflow --statistic bias-table --start 2025-07-25 --end 2025-07-29
//! inflow_service inflow --statistic by-date-table --hourly --mock-dir json_files_hours \
//!     --start "2025-08-07 09:00:00" --end "2025-08-07 18:00:00"
//! ```

use clap::{Parser, Subcommand};
use inflow_service::config::{self, Config};
use inflow_service::dev_mode::MockFileSource;
use inflow_service::ingest::SeriesSource;
use inflow_service::ingest::workflow::WorkflowClient;
use inflow_service::logging::{self, DataSource};
use inflow_service::model::{Granularity, entries_to_map};
use inflow_service::pictures::{self, FeedKind};
use inflow_service::tools::{self, InflowRequest, StatisticKind};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "inflow_service", about = "Dadu River inflow data tools")]
struct Cli {
    /// TOML configuration file
    #[arg(long, default_value = "inflow.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve rainfall picture URLs for a date/time window
    Pictures {
        #[arg(long, value_enum)]
        feed: FeedKind,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// hourly-actual only: one summed picture for the whole window
        #[arg(long)]
        range: bool,
    },
    /// Inflow bounds and forecast bias tables
    Inflow {
        #[arg(long, value_enum)]
        statistic: StatisticKind,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Station name; repeat for several, omit for the default roster
        #[arg(long = "station")]
        stations: Vec<String>,
        /// Hourly series (`YYYY-MM-DD HH:MM:SS` window)
        #[arg(long)]
        hourly: bool,
        /// Read saved responses from this directory instead of the workflow
        #[arg(long)]
        mock_dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config::load(Some(&cli.config)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init_logger(
        config.logging.min_level(),
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );

    match run(cli.command, config) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            logging::error(DataSource::System, None, &e.to_string());
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// `--range` only exists for the hourly-actual feed.
fn check_range_feed(feed: FeedKind, range: bool) -> Result<(), String> {
    if range && feed != FeedKind::HourlyActual {
        return Err(format!(
            "--range is only supported with --feed hourly-actual (got {:?})",
            feed
        ));
    }
    Ok(())
}

fn run(command: Command, config: Config) -> Result<String, Box<dyn std::error::Error>> {
    match command {
        Command::Pictures { feed, start, end, range } => {
            check_range_feed(feed, range)?;
            let entries = if range {
                let client = reqwest::blocking::Client::builder()
                    .timeout(Duration::from_secs(config.workflow.timeout_secs))
                    .build()?;
                pictures::resolve_hourly_actual_range(&client, &config.pictures, &start, &end)?
            } else {
                pictures::resolve(feed, &start, &end, &config.pictures)?
            };
            Ok(serde_json::to_string_pretty(&entries_to_map(&entries))?)
        }
        Command::Inflow { statistic, start, end, stations, hourly, mock_dir } => {
            let request = InflowRequest {
                start,
                end,
                stations,
                granularity: if hourly { Granularity::Hourly } else { Granularity::Daily },
            };

            let source: Box<dyn SeriesSource> = match mock_dir.or(config.mock.dir) {
                Some(dir) => {
                    logging::info(
                        DataSource::System,
                        None,
                        &format!("Reading series from {}", dir.display()),
                    );
                    Box::new(MockFileSource::new(dir))
                }
                None => Box::new(WorkflowClient::new(config.workflow)?),
            };

            Ok(tools::run(source.as_ref(), &request, statistic)?.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("inflow_service").chain(args.iter().copied()))
            .expect("arguments parse")
            .command
    }

    #[test]
    fn test_range_flag_rejected_for_other_feeds() {
        let Command::Pictures { feed, range, .. } = parse(&[
            "pictures", "--feed", "daily-forecast", "--start", "2025-08-05", "--end", "2025-08-09",
            "--range",
        ]) else {
            panic!("expected pictures subcommand");
        };
        assert!(check_range_feed(feed, range).is_err());

        let result = run(
            parse(&[
                "pictures", "--feed", "hourly-forecast", "--start", "2025-08-07 09:00:00",
                "--end", "2025-08-07 18:00:00", "--range",
            ]),
            Config::default(),
        );
        assert!(result.unwrap_err().to_string().contains("--range"));
    }

    #[test]
    fn test_range_flag_accepted_for_hourly_actual() {
        assert!(check_range_feed(FeedKind::HourlyActual, true).is_ok());
        assert!(check_range_feed(FeedKind::DailyActual, false).is_ok());
    }
}
