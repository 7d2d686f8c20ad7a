use serde::Serialize;
use tracing::warn;
use crate::aggregator;
use crate::config::AnalyzerConfig;
use crate::models::{KeyCount, LogRecord, LogTable};

/// Every aggregate the `analyze` command prints, computed in one pass over the config
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficReport {
    pub total_records: usize,
    pub sample: Vec<LogRecord>,
    pub top_ips: Vec<KeyCount>,
    pub suspicious_threshold: usize,
    pub suspicious_ips: Vec<KeyCount>,
    /// `None` when the datetime column could not be normalized
    pub top_requests_per_minute: Option<Vec<KeyCount>>,
    pub timestamp_error: Option<String>,
    pub top_paths: Vec<KeyCount>,
    pub top_user_agents: Vec<KeyCount>,
}

impl TrafficReport {
    /// Build the report without touching `table`; timestamps are parsed on a copy
    pub fn build(table: &LogTable, config: &AnalyzerConfig) -> Self {
        let (top_requests_per_minute, timestamp_error) =
            match table.clone().with_timestamps(&config.timestamp_format) {
                Ok(timed) => match aggregator::top_n_requests_per_minute(&timed, config.top_requests_per_minute) {
                    Ok(ranking) => (Some(ranking), None),
                    Err(e) => (None, Some(e.to_string())),
                },
                Err(e) => {
                    warn!(error = %e, "skipping per-minute rates");
                    (None, Some(e.to_string()))
                }
            };

        Self {
            total_records: table.len(),
            sample: table.head(config.sample_size).to_vec(),
            top_ips: aggregator::top_ips(table, config.top_ips),
            suspicious_threshold: config.suspicious_threshold,
            suspicious_ips: aggregator::detect_suspicious_ips(table, config.suspicious_threshold),
            top_requests_per_minute,
            timestamp_error,
            top_paths: aggregator::top_paths(table, config.top_paths),
            top_user_agents: aggregator::top_user_agents(table, config.top_user_agents),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::record;

    fn config() -> AnalyzerConfig {
        AnalyzerConfig {
            sample_size: 2,
            top_ips: 1,
            suspicious_threshold: 1,
            top_requests_per_minute: 5,
            ..AnalyzerConfig::default()
        }
    }

    #[test]
    fn test_build_with_parseable_timestamps() {
        let table: LogTable = vec![
            record("192.168.0.1", "01/06/2024:12:00:00"),
            record("10.0.0.2", "01/06/2024:12:00:10"),
            record("192.168.0.1", "01/06/2024:12:00:20"),
        ]
        .into_iter()
        .collect();

        let report = TrafficReport::build(&table, &config());

        assert_eq!(report.total_records, 3);
        assert_eq!(report.sample.len(), 2);
        assert_eq!(report.top_ips, vec![KeyCount::new("192.168.0.1", 2)]);
        assert_eq!(report.suspicious_ips, vec![KeyCount::new("192.168.0.1", 2)]);
        assert_eq!(
            report.top_requests_per_minute,
            Some(vec![KeyCount::new("192.168.0.1", 2), KeyCount::new("10.0.0.2", 1)])
        );
        assert!(report.timestamp_error.is_none());
        assert_eq!(report.top_paths, vec![KeyCount::new("/index.html", 3)]);
        // the caller's table is never annotated
        assert!(!table.has_timestamps());
    }

    #[test]
    fn test_build_with_unparseable_timestamps() {
        let table = LogTable::from_records(vec![record("1.2.3.4", "2024-06-01T12:00:00")]);
        let report = TrafficReport::build(&table, &config());

        assert!(report.top_requests_per_minute.is_none());
        assert!(report.timestamp_error.unwrap().contains("2024-06-01T12:00:00"));
        assert_eq!(report.top_ips.len(), 1);
    }

    #[test]
    fn test_build_on_empty_table() {
        let report = TrafficReport::build(&LogTable::new(), &AnalyzerConfig::default());
        assert_eq!(report.total_records, 0);
        assert!(report.sample.is_empty());
        assert_eq!(report.top_requests_per_minute, Some(Vec::new()));
    }
}
