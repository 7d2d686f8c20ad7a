use crate::cli::{OutputFormat, StatsArgs};
use crate::commands::output::render_parse_statistics;
use crate::statistics::StatisticsMonitor;
use crate::LogParser;

pub fn run_stats(args: StatsArgs, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut monitor = StatisticsMonitor::with_settings(verbose, 10_000);
    let table = LogParser::new().parse_with_monitor(&args.file, &mut monitor)?;
    let stats = monitor.into_statistics();
    let source = args.file.to_string_lossy();

    match args.output {
        OutputFormat::Table => {
            print!("{}", render_parse_statistics(&source, &stats)?);
            println!("\nRecords in table: {}", table.len());
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
    }

    Ok(())
}
