use crate::cli::ExportArgs;
use crate::config::AnalyzerConfig;
use crate::exporter::save_to_csv;
use crate::LogParser;

pub fn run_export(args: ExportArgs, config: AnalyzerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let output_path = args.output_file.unwrap_or(config.csv_output);
    let table = LogParser::new().parse(&args.file)?;

    save_to_csv(&table, &output_path)?;
    println!("Data saved to {}", output_path.display());
    eprintln!("Exported {} records from {}", table.len(), args.file.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_empty_log_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("empty.log");
        let csv_path = dir.path().join("out.csv");
        std::fs::write(&log_path, "").unwrap();

        let args = ExportArgs {
            file: log_path,
            output_file: Some(csv_path.clone()),
        };
        run_export(args, AnalyzerConfig::default()).unwrap();

        assert_eq!(
            std::fs::read_to_string(&csv_path).unwrap(),
            "ip,country,datetime,method,path,status,size,ua,duration\n"
        );
    }

    #[test]
    fn test_export_missing_log_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = ExportArgs {
            file: dir.path().join("missing.log"),
            output_file: Some(dir.path().join("out.csv")),
        };
        assert!(run_export(args, AnalyzerConfig::default()).is_err());
        assert!(!dir.path().join("out.csv").exists());
    }
}
