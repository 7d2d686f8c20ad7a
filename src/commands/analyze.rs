use crate::cli::{AnalyzeArgs, OutputFormat};
use crate::commands::output::render_report;
use crate::config::AnalyzerConfig;
use crate::exporter::save_to_csv;
use crate::report::TrafficReport;
use crate::LogParser;

pub fn run_analyze(args: AnalyzeArgs, config: AnalyzerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let config = apply_overrides(config, &args);
    config.validate()?;

    let table = LogParser::new().parse(&args.file)?;

    if !args.no_csv {
        save_to_csv(&table, &config.csv_output)?;
        let notice = format!("Data saved to {}", config.csv_output.display());
        match args.output {
            OutputFormat::Json => eprintln!("{}", notice),
            OutputFormat::Table => println!("{}", notice),
        }
    }

    let report = TrafficReport::build(&table, &config);
    match args.output {
        OutputFormat::Table => print!("{}", render_report(&report)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

/// Command-line values take precedence over the configuration file
pub fn apply_overrides(mut config: AnalyzerConfig, args: &AnalyzeArgs) -> AnalyzerConfig {
    if let Some(path) = &args.csv {
        config.csv_output = path.clone();
    }
    if let Some(sample) = args.sample {
        config.sample_size = sample;
    }
    if let Some(top) = args.top {
        config.top_ips = top;
        config.top_requests_per_minute = top;
    }
    if let Some(threshold) = args.threshold {
        config.suspicious_threshold = threshold;
    }
    if let Some(format) = &args.timestamp_format {
        config.timestamp_format = format.clone();
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::exporter::load_csv;
    use clap::Parser;
    use std::io::Write;
    use std::path::PathBuf;

    fn analyze_args(argv: &[&str]) -> AnalyzeArgs {
        let mut full = vec!["traffic-analyser", "analyze"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Analyze(args) => args,
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let args = analyze_args(&["log.txt", "--top", "3", "-t", "7", "-o", "out.csv", "--timestamp-format", "%s"]);
        let config = apply_overrides(AnalyzerConfig::default(), &args);

        assert_eq!(config.top_ips, 3);
        assert_eq!(config.top_requests_per_minute, 3);
        assert_eq!(config.suspicious_threshold, 7);
        assert_eq!(config.csv_output, PathBuf::from("out.csv"));
        assert_eq!(config.timestamp_format, "%s");
        assert_eq!(config.top_paths, 10);
    }

    #[test]
    fn test_run_analyze_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("access.log");
        let csv_path = dir.path().join("traffic_data.csv");
        let mut log = std::fs::File::create(&log_path).unwrap();
        writeln!(log, r#"192.168.0.1 - US - [01/06/2024:12:00:00] "GET / HTTP/1.1" 200 10 "-" "curl/8.0" 5"#).unwrap();
        writeln!(log, "not a log line").unwrap();
        drop(log);

        let args = analyze_args(&[
            log_path.to_str().unwrap(),
            "--csv",
            csv_path.to_str().unwrap(),
            "--output",
            "json",
        ]);
        run_analyze(args, AnalyzerConfig::default()).unwrap();

        let exported = load_csv(&csv_path).unwrap();
        assert_eq!(exported.len(), 1);
        assert_eq!(exported.records()[0].ip, "192.168.0.1");
    }

    #[test]
    fn test_run_analyze_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = analyze_args(&[dir.path().join("missing.log").to_str().unwrap(), "--no-csv"]);
        assert!(run_analyze(args, AnalyzerConfig::default()).is_err());
    }
}
