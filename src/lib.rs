pub mod models;
pub mod error;
pub mod parsers;
pub mod log_parser;
pub mod statistics;
pub mod aggregator;
pub mod exporter;
pub mod config;
pub mod report;
pub mod logging;
pub mod cli;
pub mod commands;

pub use models::*;
pub use error::{IoErrorKind, ParseError};
pub use parsers::{AccessLogGrammar, LineGrammar, ACCESS_LOG_GRAMMAR};
pub use log_parser::{parse_log_file, LogParser};
pub use statistics::{ParseStatistics, StatisticsMonitor};
pub use aggregator::{
    detect_suspicious_ips, requests_per_minute_per_ip, top_ips, top_n_requests_per_minute, top_paths,
    top_user_agents,
};
pub use exporter::{load_csv, read_csv, save_to_csv, write_csv};
pub use config::AnalyzerConfig;
pub use report::TrafficReport;
