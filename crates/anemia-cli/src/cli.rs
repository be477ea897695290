//! CLI argument definitions for the anemia dashboard.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use anemia_model::FieldFilter;

#[derive(Parser)]
#[command(
    name = "anemia-dash",
    version,
    about = "Childhood anemia survey dashboard",
    long_about = "Explore childhood anemia risk factors in a household survey extract.\n\n\
                  Renders a static HTML dashboard (or JSON chart data) filtered by\n\
                  residence, wealth, education, and iron intake, and prints value\n\
                  counts and grouped proportions in the terminal."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow survey cell values (filter values, categories) in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Render the dashboard for a survey CSV.
    Render(RenderArgs),

    /// List the dataset's columns with kind and value counts.
    Fields(SourceArgs),

    /// Show the observed values of one field with their counts.
    Values(ValuesArgs),

    /// Print the share of each outcome value within each group.
    Proportions(ProportionsArgs),

    /// Print the built-in report definition as TOML.
    ReportTemplate,
}

/// Input file plus the optional report definition that may rename its headers.
#[derive(Args)]
pub struct SourceArgs {
    /// Survey CSV file.
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Report definition TOML (default: built-in six-chart dashboard).
    #[arg(long = "report", value_name = "FILE")]
    pub report: Option<PathBuf>,
}

#[derive(Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Keep only records where FIELD equals VALUE (repeatable, one per field).
    #[arg(long = "filter", value_name = "FIELD=VALUE")]
    pub filters: Vec<FieldFilter>,

    /// Output file (default: <CSV stem>-dashboard.html next to the CSV).
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format to generate.
    #[arg(long = "format", value_enum, default_value = "html")]
    pub format: OutputFormatArg,

    /// Charts per grid row (overrides the report definition).
    #[arg(
        long = "columns",
        value_name = "N",
        value_parser = clap::value_parser!(u16).range(1..=6)
    )]
    pub columns: Option<u16>,

    /// Page title (overrides the report definition).
    #[arg(long = "title", value_name = "TITLE")]
    pub title: Option<String>,
}

#[derive(Args)]
pub struct ValuesArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Field whose observed values to list.
    #[arg(value_name = "FIELD")]
    pub field: String,

    /// Count only records where FIELD equals VALUE (repeatable).
    #[arg(long = "filter", value_name = "FIELD=VALUE")]
    pub filters: Vec<FieldFilter>,
}

#[derive(Args)]
pub struct ProportionsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Grouping field (one row per observed value).
    #[arg(long = "by", value_name = "FIELD")]
    pub by: String,

    /// Outcome field whose shares are computed within each group.
    #[arg(long = "outcome", value_name = "FIELD", default_value = "Anemia_Level")]
    pub outcome: String,

    /// Aggregate only records where FIELD equals VALUE (repeatable).
    #[arg(long = "filter", value_name = "FIELD=VALUE")]
    pub filters: Vec<FieldFilter>,

    /// Print the table as JSON instead of a terminal table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Html,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
