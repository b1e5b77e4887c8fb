//! Command-line interface definitions.
//!
//! Defines the `revpace` CLI with `clap`: uploading snapshots, comparing
//! them, drawing booking curves, and the price, KPI and pace reports built
//! from historical exports.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use super::paths;
use crate::domain::forecast::WeightingMethod;
use crate::infrastructure::config::settings::StorageBackend;

/// Booking pace, pick-up and price forecasting for a campsite
#[derive(Parser, Debug)]
#[command(name = "revpace")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to the configuration file
    #[arg(short, long, global = true, default_value_os_t = paths::default_config())]
    pub config: PathBuf,

    /// Snapshot store location (overrides the config file and REVPACE_STORE)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Snapshot store backend
    #[arg(long, global = true, value_enum)]
    pub backend: Option<BackendArg>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Sqlite,
    Csv,
    Wide,
}

impl From<BackendArg> for StorageBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Sqlite => StorageBackend::Sqlite,
            BackendArg::Csv => StorageBackend::Csv,
            BackendArg::Wide => StorageBackend::Wide,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    /// Newer years weigh more (1, 2, ... N)
    Weighted,
    /// Every year weighs the same
    Simple,
}

impl From<MethodArg> for WeightingMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Weighted => WeightingMethod::Weighted,
            MethodArg::Simple => WeightingMethod::Simple,
        }
    }
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store one or more daily reservation snapshots
    Import(ImportArgs),

    /// Show pick-up between two snapshots
    Pickup(PickupArgs),

    /// Show the booking curve of a stay range
    Curve(CurveArgs),

    /// List stored snapshots
    Snapshots,

    /// Recommend prices for the season from historical daily data
    Forecast(ForecastArgs),

    /// Compare occupancy, ADR and RevPAR across years
    Kpi(ReportArgs),

    /// Monthly reservations and revenue per year
    Pace(ReportArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subcommands for `revpace config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Generate a new configuration file from template.
    Init(ConfigInitArgs),
    /// Display the effective configuration with defaults applied.
    Show,
    /// Validate the configuration file.
    Validate,
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Wide CSV exports (one snapshot each)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Snapshot date (default: date in the file name, then the file time)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Store without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Show what would be stored without writing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct PickupArgs {
    /// Compare this export against the store without storing it
    #[arg(conflicts_with_all = ["from", "to"])]
    pub file: Option<PathBuf>,

    /// Snapshot date of FILE
    #[arg(long, requires = "file")]
    pub date: Option<NaiveDate>,

    /// Older stored snapshot date
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,

    /// Newer stored snapshot date
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,

    /// Only this room type
    #[arg(short, long)]
    pub room_type: Option<String>,

    /// Include unchanged stay dates
    #[arg(long)]
    pub all: bool,

    /// Write the pick-up table to a CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CurveArgs {
    /// Room type code
    #[arg(short, long, required_unless_present = "all", conflicts_with = "all")]
    pub room_type: Option<String>,

    /// One curve per configured room type
    #[arg(long)]
    pub all: bool,

    /// First stay date (inclusive)
    #[arg(long)]
    pub from: NaiveDate,

    /// Last stay date (inclusive)
    #[arg(long)]
    pub to: NaiveDate,

    /// Write the curve points to a CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ForecastArgs {
    /// Daily history export (date, price, occupancy)
    pub file: PathBuf,

    /// Year weighting
    #[arg(long, value_enum)]
    pub method: Option<MethodArg>,

    /// Occupancy percent for the largest increase
    #[arg(long)]
    pub high: Option<u8>,

    /// Occupancy percent below which prices are discounted
    #[arg(long)]
    pub low: Option<u8>,

    /// First day of the projected season
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day of the projected season
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Write the recommended prices to a CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments shared by `kpi` and `pace`.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Input exports
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Write the report to a CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = parse(&["revpace", "snapshots", "--json", "--backend", "csv", "-vv"]);
        assert!(cli.json);
        assert_eq!(cli.backend, Some(BackendArg::Csv));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Snapshots));
    }

    #[test]
    fn import_takes_many_files_and_a_date() {
        let cli = parse(&["revpace", "import", "a.csv", "b.csv", "--date", "2025-03-01", "-y"]);
        let Commands::Import(args) = cli.command else {
            panic!("expected import");
        };
        assert_eq!(args.files.len(), 2);
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert!(args.yes);
    }

    #[test]
    fn import_requires_a_file() {
        assert!(Cli::try_parse_from(["revpace", "import"]).is_err());
    }

    #[test]
    fn curve_needs_room_type_or_all() {
        assert!(Cli::try_parse_from(["revpace", "curve", "--from", "2025-08-01", "--to", "2025-08-02"]).is_err());
        assert!(Cli::try_parse_from([
            "revpace", "curve", "--all", "-r", "N-4", "--from", "2025-08-01", "--to", "2025-08-02"
        ])
        .is_err());
        let cli = parse(&["revpace", "curve", "--all", "--from", "2025-08-01", "--to", "2025-08-02"]);
        assert!(matches!(cli.command, Commands::Curve(CurveArgs { all: true, .. })));
    }

    #[test]
    fn pickup_dates_come_in_pairs() {
        assert!(Cli::try_parse_from(["revpace", "pickup", "--from", "2025-01-01"]).is_err());
        assert!(Cli::try_parse_from(["revpace", "pickup", "x.csv", "--from", "2025-01-01", "--to", "2025-01-02"]).is_err());
        let cli = parse(&["revpace", "pickup", "--from", "2025-01-01", "--to", "2025-01-10"]);
        let Commands::Pickup(args) = cli.command else {
            panic!("expected pickup");
        };
        assert_eq!(args.to, NaiveDate::from_ymd_opt(2025, 1, 10));
    }

    #[test]
    fn invalid_dates_are_rejected() {
        assert!(Cli::try_parse_from(["revpace", "import", "a.csv", "--date", "2025-02-30"]).is_err());
    }

    #[test]
    fn forecast_method_maps_to_domain() {
        let cli = parse(&["revpace", "forecast", "h.csv", "--method", "simple"]);
        let Commands::Forecast(args) = cli.command else {
            panic!("expected forecast");
        };
        assert_eq!(args.method.map(WeightingMethod::from), Some(WeightingMethod::Simple));
    }

    #[test]
    fn color_defaults_to_auto() {
        let cli = parse(&["revpace", "snapshots"]);
        assert!(matches!(cli.color, ColorChoice::Auto));
    }
}
