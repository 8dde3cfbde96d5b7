use crate::aggregate::DEFAULT_TOP_N;
use crate::commands::query::DEFAULT_PRECISION;
use crate::config::{DEFAULT_DATA_DIR, DataPaths};
use crate::filter::SegmentSelection;
use crate::pipeline::FilterParams;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const MAX_TOP_N: usize = 100;
const MAX_PRECISION: usize = 12;

#[derive(Parser, Debug)]
#[command(name = "shopdash")]
#[command(about = "Terminal dashboard for e-commerce RFM segments and per-state sales")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Directory holding full_df.csv and rfm.csv
    #[arg(long, global = true, env = "SHOPDASH_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Transaction table (defaults to <data-dir>/full_df.csv)
    #[arg(long, global = true, env = "SHOPDASH_TRANSACTIONS")]
    pub transactions: Option<PathBuf>,

    /// Customer RFM table (defaults to <data-dir>/rfm.csv)
    #[arg(long, global = true, env = "SHOPDASH_RFM")]
    pub rfm: Option<PathBuf>,

    /// Write logs to this file (the TUI otherwise keeps logging off)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive two-page dashboard (default)
    View {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Print the dashboard figures for a filter
    Report {
        #[command(flatten)]
        filter: FilterArgs,

        /// Which page to print
        #[arg(long, value_enum, default_value = "all")]
        page: ReportPage,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Output as CSV
        #[arg(long)]
        csv: bool,
    },

    /// List segments and the purchase date bounds
    Segments,

    /// Execute raw SQL against the loaded tables (`transactions`, `rfm`, `meta`)
    Query {
        /// SQL query to execute
        sql: String,

        /// Decimal places for REAL columns
        #[arg(long, default_value_t = DEFAULT_PRECISION)]
        precision: usize,

        /// Output rows as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// First purchase day to include (YYYY-MM-DD, defaults to earliest)
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last purchase day to include (YYYY-MM-DD, defaults to latest)
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Segment to include; repeat for several, `all` for every segment
    #[arg(long = "segment", short = 's')]
    pub segments: Vec<String>,

    /// Number of states in the top-N charts
    #[arg(long, short = 'n', default_value_t = DEFAULT_TOP_N)]
    pub top: usize,
}

impl Default for FilterArgs {
    fn default() -> Self {
        FilterArgs {
            start: None,
            end: None,
            segments: Vec::new(),
            top: DEFAULT_TOP_N,
        }
    }
}

impl FilterArgs {
    pub fn params(&self) -> FilterParams {
        FilterParams {
            start: self.start,
            end: self.end,
            segments: SegmentSelection::from_args(&self.segments),
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportPage {
    #[default]
    All,
    Customers,
    States,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}'. Expected YYYY-MM-DD, e.g. 2018-01-31", s))
}

impl Cli {
    pub fn data_paths(&self) -> DataPaths {
        DataPaths::resolve(&self.data_dir, self.transactions.clone(), self.rfm.clone())
    }

    /// Whether the command takes over the terminal
    pub fn is_interactive(&self) -> bool {
        matches!(self.command, None | Some(Command::View { .. }))
    }

    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Some(Command::View { filter }) => validate_top(filter.top),
            Some(Command::Report {
                filter, json, csv, ..
            }) => {
                if *json && *csv {
                    return Err("--json and --csv cannot be combined".to_string());
                }
                validate_top(filter.top)
            }
            Some(Command::Query { precision, .. }) if *precision > MAX_PRECISION => Err(format!(
                "Precision must be at most {}, got {}",
                MAX_PRECISION, precision
            )),
            _ => Ok(()),
        }
    }
}

fn validate_top(top: usize) -> Result<(), String> {
    if top == 0 || top > MAX_TOP_N {
        return Err(format!(
            "Top-N must be between 1 and {}, got {}",
            MAX_TOP_N, top
        ));
    }
    Ok(())
}
