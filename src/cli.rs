use clap::{Parser, Subcommand, Args, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "traffic-analyser")]
#[command(author, version, about = "Access log parser and traffic statistics")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON configuration file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Log per-line diagnostics to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a log, export it to CSV and print traffic statistics
    Analyze(AnalyzeArgs),

    /// Parse a log and write the records to CSV
    Export(ExportArgs),

    /// Show how many lines matched the grammar and why the rest were dropped
    Stats(StatsArgs),
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Access log to analyze
    #[arg(default_value = "sample-log.log")]
    pub file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// CSV file for the parsed records (overrides config)
    #[arg(long, short = 'o')]
    pub csv: Option<PathBuf>,

    /// Skip writing the CSV file
    #[arg(long)]
    pub no_csv: bool,

    /// Number of sample records to print
    #[arg(long, short = 'n')]
    pub sample: Option<usize>,

    /// Entries in the IP and per-minute rankings
    #[arg(long)]
    pub top: Option<usize>,

    /// Request count above which an IP is suspicious
    #[arg(long, short = 't')]
    pub threshold: Option<usize>,

    /// chrono format of the datetime field
    #[arg(long)]
    pub timestamp_format: Option<String>,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Access log to export
    #[arg(default_value = "sample-log.log")]
    pub file: PathBuf,

    /// Output CSV file (overrides config)
    #[arg(long, short = 'o')]
    pub output_file: Option<PathBuf>,
}

#[derive(Args)]
pub struct StatsArgs {
    /// Access log to inspect
    #[arg(default_value = "sample-log.log")]
    pub file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// Pretty-printed JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
