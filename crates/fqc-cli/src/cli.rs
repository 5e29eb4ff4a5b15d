//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "fqc",
    version,
    about = "Form QC - coordinate visit validation, report QC state, log visit events",
    long_about = "Form QC pipeline tools over a directory-backed metadata store.\n\n\
                  coordinate: validate one participant/module sequence in visit order.\n\
                  report:     write QC status or error CSV reports.\n\
                  events:     emit submit and QC outcome events."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

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

    /// Allow participant identifiers in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Pipeline configuration file (TOML).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Root directory of the metadata store.
    #[arg(long = "store", value_name = "DIR", global = true, default_value = ".")]
    pub store: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate the pending visits of one participant and module in date order.
    Coordinate(CoordinateArgs),

    /// Write a QC status or error report over every file in the store.
    Report(ReportArgs),

    /// Record submissions and emit submit/outcome events for finished visits.
    Events(EventsArgs),
}

#[derive(Parser)]
pub struct CoordinateArgs {
    /// Participant identifier.
    #[arg(long = "ptid")]
    pub ptid: String,

    /// Module of the visits.
    #[arg(long = "module")]
    pub module: String,

    /// JSON file with the pending visits: a list of
    /// `{file, ptid, module, visit_date, visitnum?, packet?}` objects.
    #[arg(value_name = "VISITS_JSON")]
    pub visits: PathBuf,
}

#[derive(Parser)]
pub struct ReportArgs {
    /// Report to produce.
    #[arg(long = "kind", value_enum, default_value = "status")]
    pub kind: ReportKindArg,

    /// Output CSV file (default: stdout).
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct EventsArgs {
    /// Submission CSV whose rows are recorded as pending submissions.
    #[arg(long = "submission", value_name = "CSV")]
    pub submission: Option<PathBuf>,

    /// Upload time of the submission (RFC 3339, default: now).
    #[arg(long = "uploaded-at", value_name = "TIMESTAMP")]
    pub uploaded_at: Option<String>,

    /// Directory receiving one JSON file per event.
    #[arg(long = "events-dir", value_name = "DIR")]
    pub events_dir: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportKindArg {
    Status,
    Error,
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
