//! Pallet conveyor log inspector - Entry Point

use chrono::Duration;
use clap::{Parser, Subcommand};
use palletrace::service::{ConveyorService, DEFAULT_RECENT_COUNT};
use std::path::PathBuf;
use tracing::info;

/// Conveyor log inspector - parses controller logs into dashboard views
#[derive(Parser, Debug)]
#[command(name = "palletrace")]
#[command(version)]
#[command(about = "Parses warehouse conveyor controller logs into pallet tracking views")]
pub struct Args {
    /// Path to the controller log file (overrides config)
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Path to the facility layout JSON file (overrides config)
    #[arg(long)]
    pub layout: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// View to produce (the full event stream if omitted)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Dashboard views, each emitted as JSON on stdout.
#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Full ordered event stream
    Stream,
    /// Fault events only, in stream order
    Faults,
    /// Chronological history of one pallet
    History {
        /// Eight-digit pallet identifier
        pallet: String,
    },
    /// Per-pallet states plus the active-roster picks
    States,
    /// Most recent arrivals, destination assignments and exits
    Recent {
        /// Events per bucket
        #[arg(short = 'n', long, default_value_t = DEFAULT_RECENT_COUNT)]
        count: usize,
    },
    /// Mean observed transit time per directed edge
    TravelTimes,
    /// Advance the simulation clock and print each snapshot
    Step {
        /// Virtual seconds per step (config step_seconds if omitted)
        #[arg(long)]
        delta: Option<i64>,
        /// Number of steps to take
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// Facility layout passthrough
    Layout,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Precedence chain: defaults, config file, env vars, CLI args.
    let config = {
        let config_file = palletrace::config::load_config_with_precedence(args.config.clone())?;
        let merged = palletrace::config::merge_config(config_file);
        let with_env = palletrace::config::apply_env_overrides(merged);
        palletrace::config::apply_cli_overrides(with_env, args.log.clone(), args.layout.clone())
    };

    palletrace::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let mut service = ConveyorService::new(
        config.log_path,
        config.layout_path,
        config.default_travel_seconds,
    );

    let output = match args.command.unwrap_or(Command::Stream) {
        Command::Stream => serde_json::to_value(service.parse_stream()?.events())?,
        Command::Faults => serde_json::to_value(service.parse_stream()?.faults())?,
        Command::History { pallet } => {
            let id = palletrace::model::PalletId::new(&pallet)?;
            serde_json::to_value(service.pallet_history(&id)?)?
        }
        Command::States => serde_json::to_value(service.pallet_states()?)?,
        Command::Recent { count } => serde_json::to_value(service.recent(count)?)?,
        Command::TravelTimes => serde_json::to_value(service.travel_times()?)?,
        Command::Step { delta, count } => {
            let delta = Duration::seconds(delta.unwrap_or(config.step_seconds));
            let snapshots: Vec<_> = (0..count)
                .map(|_| service.step(delta))
                .collect::<Result<_, _>>()?;
            serde_json::to_value(snapshots)?
        }
        Command::Layout => serde_json::to_value(service.layout())?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_help_does_not_error() {
        let result = Args::try_parse_from(["palletrace", "--help"]);
        // Help returns Err with DisplayHelp, which is success
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_does_not_error() {
        let result = Args::try_parse_from(["palletrace", "--version"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_no_args_defaults() {
        let args = Args::parse_from(["palletrace"]);
        assert_eq!(args.log, None);
        assert_eq!(args.layout, None);
        assert_eq!(args.config, None);
        assert_eq!(args.command, None);
    }

    #[test]
    fn test_log_path_flag() {
        let args = Args::parse_from(["palletrace", "--log", "/var/log/conveyor.txt"]);
        assert_eq!(args.log, Some(PathBuf::from("/var/log/conveyor.txt")));
    }

    #[test]
    fn test_layout_path_flag() {
        let args = Args::parse_from(["palletrace", "--layout", "floor.json"]);
        assert_eq!(args.layout, Some(PathBuf::from("floor.json")));
    }

    #[test]
    fn test_config_path_flag() {
        let args = Args::parse_from(["palletrace", "--config", "/custom/config.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_history_requires_pallet_argument() {
        let result = Args::try_parse_from(["palletrace", "history"]);
        assert!(result.is_err());

        let args = Args::parse_from(["palletrace", "history", "11112222"]);
        assert_eq!(
            args.command,
            Some(Command::History {
                pallet: "11112222".to_string()
            })
        );
    }

    #[test]
    fn test_recent_count_defaults_to_ten() {
        let args = Args::parse_from(["palletrace", "recent"]);
        assert_eq!(args.command, Some(Command::Recent { count: 10 }));
    }

    #[test]
    fn test_recent_count_flag() {
        let args = Args::parse_from(["palletrace", "recent", "-n", "25"]);
        assert_eq!(args.command, Some(Command::Recent { count: 25 }));
    }

    #[test]
    fn test_step_defaults() {
        let args = Args::parse_from(["palletrace", "step"]);
        assert_eq!(
            args.command,
            Some(Command::Step {
                delta: None,
                count: 1
            })
        );
    }

    #[test]
    fn test_step_with_delta_and_count() {
        let args = Args::parse_from(["palletrace", "step", "--delta", "10", "-n", "5"]);
        assert_eq!(
            args.command,
            Some(Command::Step {
                delta: Some(10),
                count: 5
            })
        );
    }

    #[test]
    fn test_combined_flags() {
        let args = Args::parse_from([
            "palletrace",
            "--log",
            "logs.txt",
            "--layout",
            "layout.json",
            "states",
        ]);
        assert_eq!(args.log, Some(PathBuf::from("logs.txt")));
        assert_eq!(args.layout, Some(PathBuf::from("layout.json")));
        assert_eq!(args.command, Some(Command::States));
    }

    #[test]
    fn test_paths_flow_through_config_precedence_chain() {
        use palletrace::config::{apply_cli_overrides, merge_config, ConfigFile};

        let config_file = ConfigFile {
            log_path: Some(PathBuf::from("/from/file/logs.txt")),
            ..ConfigFile::default()
        };

        let merged = merge_config(Some(config_file));
        assert_eq!(
            merged.log_path,
            PathBuf::from("/from/file/logs.txt"),
            "Config file should override the default log path"
        );

        let with_cli =
            apply_cli_overrides(merged, Some(PathBuf::from("/from/cli/logs.txt")), None);
        assert_eq!(
            with_cli.log_path,
            PathBuf::from("/from/cli/logs.txt"),
            "CLI log path should override all other sources"
        );
    }
}
