use colored::*;
use std::fmt::{self, Write};
use crate::models::{Column, KeyCount, LogRecord};
use crate::report::TrafficReport;
use crate::statistics::ParseStatistics;

/// First records in a fixed-width layout, followed by the total
pub fn render_sample(records: &[LogRecord], total: usize) -> Result<String, fmt::Error> {
    let mut output = String::new();

    let header = Column::ALL.iter().map(Column::name).collect::<Vec<_>>();
    writeln!(output, "{}", format_row(&header).dimmed())?;
    for record in records {
        let fields = Column::ALL.iter().map(|c| record.field(*c)).collect::<Vec<_>>();
        writeln!(output, "{}", format_row(&fields))?;
    }
    writeln!(output, "Total records processed: {}", total)?;

    Ok(output)
}

fn format_row(fields: &[&str]) -> String {
    format!(
        "{:<15} {:<7} {:<20} {:<6} {:<24} {:<6} {:>8} {:<24} {:>8}",
        fields[0], fields[1], fields[2], fields[3], fields[4], fields[5], fields[6], fields[7], fields[8]
    )
}

/// A titled key/count list
pub fn render_ranking(title: &str, entries: &[KeyCount]) -> Result<String, fmt::Error> {
    let mut output = String::new();
    writeln!(output, "\n{}:", title.cyan().bold())?;
    if entries.is_empty() {
        writeln!(output, "  {}", "(none)".dimmed())?;
        return Ok(output);
    }

    let max_count = entries.iter().map(|e| e.count).max().unwrap_or(1).max(1);
    for entry in entries {
        let bar_len = (entry.count as f64 / max_count as f64 * 30.0) as usize;
        let bar = "█".repeat(bar_len);
        writeln!(output, "  {:40} {:>8} {}", entry.key, entry.count, bar.green())?;
    }
    Ok(output)
}

pub fn render_report(report: &TrafficReport) -> Result<String, fmt::Error> {
    let mut output = render_sample(&report.sample, report.total_records)?;

    output.push_str(&render_ranking(&format!("Top {} IPs by request count", report.top_ips.len()), &report.top_ips)?);
    output.push_str(&render_ranking(
        &format!("Suspicious IPs (more than {} requests)", report.suspicious_threshold),
        &report.suspicious_ips,
    )?);

    match (&report.top_requests_per_minute, &report.timestamp_error) {
        (Some(ranking), _) => {
            output.push_str(&render_ranking("Peak requests per minute per IP", ranking)?);
        }
        (None, error) => {
            writeln!(output, "\n{}:", "Peak requests per minute per IP".cyan().bold())?;
            let reason = error.as_deref().unwrap_or("timestamps unavailable");
            writeln!(output, "  {} {}", "skipped:".yellow(), reason)?;
        }
    }

    output.push_str(&render_ranking(&format!("Top {} paths", report.top_paths.len()), &report.top_paths)?);
    output.push_str(&render_ranking(
        &format!("Top {} user agents", report.top_user_agents.len()),
        &report.top_user_agents,
    )?);
    Ok(output)
}

pub fn render_parse_statistics(source: &str, stats: &ParseStatistics) -> Result<String, fmt::Error> {
    let mut output = String::new();

    writeln!(output, "\n{}", "═".repeat(50).cyan())?;
    writeln!(output, "{} {}", "SUMMARY".cyan().bold(), source.dimmed())?;
    writeln!(output, "{}", "═".repeat(50).cyan())?;
    writeln!(output, "Total lines:      {}", stats.total_lines.to_string().white().bold())?;
    writeln!(output, "Matched:          {} ({:.1}%)", stats.matched_lines.to_string().green(), stats.match_rate())?;
    writeln!(output, "Dropped:          {} ({:.1}%)", stats.dropped_lines.to_string().yellow(), stats.drop_rate())?;
    writeln!(output, "Avg line time:    {:.1}μs", stats.processing_time_micros.avg_time)?;

    let reasons = stats.sorted_drop_reasons();
    if !reasons.is_empty() {
        writeln!(output, "\n{}:", "Drop reasons (expected token)".dimmed())?;
        for (reason, count) in reasons {
            writeln!(output, "  {:40} {:>8}", reason, count)?;
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;
    use crate::models::tests::record;
    use crate::models::LogTable;

    #[test]
    fn test_render_sample() {
        colored::control::set_override(false);
        let records = vec![record("192.168.1.1", "01/06/2024:12:00:00")];
        let output = render_sample(&records, 7).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].starts_with("ip"));
        assert!(lines[1].starts_with("192.168.1.1"));
        assert!(lines[1].contains("/index.html"));
        assert_eq!(lines[2], "Total records processed: 7");
    }

    #[test]
    fn test_render_ranking() {
        colored::control::set_override(false);
        let output = render_ranking("Top IPs", &[KeyCount::new("1.2.3.4", 4), KeyCount::new("5.6.7.8", 2)]).unwrap();
        assert!(output.contains("Top IPs:"));
        assert!(output.contains("1.2.3.4"));
        assert!(output.lines().any(|l| l.contains("5.6.7.8") && l.contains(" 2 ")));

        let empty = render_ranking("Suspicious", &[]).unwrap();
        assert!(empty.contains("(none)"));
    }

    #[test]
    fn test_render_report_with_skipped_rates() {
        colored::control::set_override(false);
        let table = LogTable::from_records(vec![record("1.2.3.4", "not a date")]);
        let report = TrafficReport::build(&table, &AnalyzerConfig::default());
        let output = render_report(&report).unwrap();

        assert!(output.contains("Total records processed: 1"));
        assert!(output.contains("Suspicious IPs (more than 1000 requests)"));
        assert!(output.contains("skipped:"));
        assert!(output.contains("Top 1 user agents"));
    }

    #[test]
    fn test_render_parse_statistics() {
        colored::control::set_override(false);
        let mut stats = ParseStatistics::new();
        stats.record_match(1);
        stats.record_drop(
            &crate::error::ParseError::MalformedLine { expected: "ip digits".to_string(), position: 0 },
            1,
        );
        let output = render_parse_statistics("access.log", &stats).unwrap();

        assert!(output.contains("Total lines:      2"));
        assert!(output.contains("Dropped:          1 (50.0%)"));
        assert!(output.contains("ip digits"));
    }
}
