use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

/// The standard tables of a load-test dashboard.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TableKind {
    Apdex,
    Statistics,
    Errors,
    #[value(name = "top5-errors")]
    Top5Errors,
}

impl FromStr for TableKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apdex" => Ok(TableKind::Apdex),
            "statistics" => Ok(TableKind::Statistics),
            "errors" => Ok(TableKind::Errors),
            "top5-errors" => Ok(TableKind::Top5Errors),
            _ => Err(anyhow!(
                "Invalid table: {}. Valid values are 'apdex', 'statistics', 'errors' or 'top5-errors'",
                s
            )),
        }
    }
}

#[derive(Parser)]
#[command(version, name = "loadtest-dashboard")]
pub struct Cli {
    /// Increase verbosity level (can be specified multiple times.) The first level sets level
    /// "info", second sets level "debug", and third sets level "trace" for the logger.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct CliInput {
    /// JSON file with the datasets produced by the load-test run
    #[arg(short, long)]
    pub input: PathBuf,
}

#[derive(Args, Default)]
pub struct CliFilter {
    /// Case-insensitive regular expression selecting the rows to show by their label
    #[arg(short = 'f', long)]
    pub series_filter: Option<String>,

    /// Only show rows of transaction controllers in tables that distinguish them
    #[arg(long)]
    pub controllers_only: bool,

    /// Apply the series filter to every table, not only to tables that
    /// distinguish controllers from samples
    #[arg(long)]
    pub filter_all_series: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the dashboard page (HTML) or a tab-separated dump of its tables (CSV, '-' for
    /// stdout)
    Report {
        #[command(flatten)]
        input: CliInput,

        /// Output file, the format is inferred from the extension
        #[arg(short, long, default_value = "dashboard.html")]
        output: PathBuf,

        #[command(flatten)]
        filter: CliFilter,

        /// Restrict the report to these tables (all tables when omitted)
        #[arg(short, long, value_enum)]
        table: Vec<TableKind>,

        /// Title of the report page
        #[arg(long)]
        title: Option<String>,

        /// HTML template with {{PLACEHOLDER}} markers
        #[arg(long)]
        template: Option<PathBuf>,

        /// CSS file inlined into the page
        #[arg(long)]
        custom_css: Option<PathBuf>,
    },

    /// Check that every dataset of the input is well-formed without rendering it
    Check {
        #[command(flatten)]
        input: CliInput,
    },

    /// Show the configuration sources and effective settings
    Config {},
}

#[cfg(test)]
mod test {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert()
    }

    #[test]
    fn verify_table_kind_parsing() {
        assert_eq!("apdex".parse::<TableKind>().unwrap(), TableKind::Apdex);
        assert_eq!(
            "top5-errors".parse::<TableKind>().unwrap(),
            TableKind::Top5Errors
        );
        assert!("Statistics".parse::<TableKind>().is_err());
        assert!("".parse::<TableKind>().is_err());
    }

    #[test]
    fn verify_report_arguments() {
        let cli = Cli::try_parse_from([
            "loadtest-dashboard",
            "-vv",
            "report",
            "-i",
            "data.json",
            "-f",
            "^GET",
            "--controllers-only",
            "-t",
            "statistics",
            "-t",
            "top5-errors",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Report {
                input,
                output,
                filter,
                table,
                ..
            } => {
                assert_eq!(input.input, PathBuf::from("data.json"));
                assert_eq!(output, PathBuf::from("dashboard.html"));
                assert_eq!(filter.series_filter.as_deref(), Some("^GET"));
                assert!(filter.controllers_only);
                assert!(!filter.filter_all_series);
                assert_eq!(table, vec![TableKind::Statistics, TableKind::Top5Errors]);
            }
            _ => panic!("expected report command"),
        }
    }
}
