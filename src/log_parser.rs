use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::debug;
use crate::error::ParseError;
use crate::models::LogTable;
use crate::parsers::{AccessLogGrammar, LineGrammar, ACCESS_LOG_GRAMMAR};
use crate::statistics::{ParseStatistics, StatisticsMonitor};

/// Reads a log file line by line into a `LogTable`.
///
/// Lines the grammar rejects are skipped without error. Only I/O failures
/// (missing file, permission, non-UTF-8 content) abort a parse.
#[derive(Debug, Clone)]
pub struct LogParser<G: LineGrammar = AccessLogGrammar> {
    grammar: G,
}

impl LogParser<AccessLogGrammar> {
    pub fn new() -> Self {
        Self {
            grammar: ACCESS_LOG_GRAMMAR,
        }
    }
}

impl Default for LogParser<AccessLogGrammar> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: LineGrammar> LogParser<G> {
    pub fn with_grammar(grammar: G) -> Self {
        Self { grammar }
    }

    pub fn parse<P: AsRef<Path>>(&self, path: P) -> Result<LogTable, ParseError> {
        let (reader, source) = open(path.as_ref())?;
        self.parse_reader(reader, &source)
    }

    /// Parse any buffered source; `source` only labels errors
    pub fn parse_reader<R: BufRead>(&self, reader: R, source: &str) -> Result<LogTable, ParseError> {
        self.scan(reader, source, None)
    }

    /// Parse and also count matched and dropped lines
    pub fn parse_with_statistics<P: AsRef<Path>>(&self, path: P) -> Result<(LogTable, ParseStatistics), ParseError> {
        let mut monitor = StatisticsMonitor::new();
        let table = self.parse_with_monitor(path, &mut monitor)?;
        Ok((table, monitor.into_statistics()))
    }

    pub fn parse_with_monitor<P: AsRef<Path>>(
        &self,
        path: P,
        monitor: &mut StatisticsMonitor,
    ) -> Result<LogTable, ParseError> {
        let (reader, source) = open(path.as_ref())?;
        self.scan(reader, &source, Some(monitor))
    }

    pub fn parse_reader_with_monitor<R: BufRead>(
        &self,
        reader: R,
        source: &str,
        monitor: &mut StatisticsMonitor,
    ) -> Result<LogTable, ParseError> {
        self.scan(reader, source, Some(monitor))
    }

    fn scan<R: BufRead>(
        &self,
        reader: R,
        source: &str,
        mut monitor: Option<&mut StatisticsMonitor>,
    ) -> Result<LogTable, ParseError> {
        let mut table = LogTable::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| ParseError::io("read", source, &e))?;
            let start_time = Instant::now();
            let outcome = self.grammar.parse_line(&line);
            let processing_time = whole_micros(start_time.elapsed());

            match outcome {
                Ok(record) => {
                    if let Some(monitor) = monitor.as_deref_mut() {
                        monitor.record_match(index + 1, processing_time);
                    }
                    table.push(record);
                }
                Err(error) => {
                    if let Some(monitor) = monitor.as_deref_mut() {
                        monitor.record_drop(index + 1, &error, processing_time);
                    }
                }
            }
        }

        debug!(source, records = table.len(), "parsed log source");
        Ok(table)
    }
}

/// Saturates at `u64::MAX`
fn whole_micros(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
}

fn open(path: &Path) -> Result<(BufReader<File>, String), ParseError> {
    let source = path.to_string_lossy().to_string();
    let file = File::open(path).map_err(|e| ParseError::io("open", &source, &e))?;
    Ok((BufReader::new(file), source))
}

/// Parse a log file with the access log grammar
pub fn parse_log_file<P: AsRef<Path>>(path: P) -> Result<LogTable, ParseError> {
    LogParser::new().parse(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IoErrorKind;
    use crate::models::HttpMethod;
    use quickcheck_macros::quickcheck;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    const SAMPLE_LOG: &str = concat!(
        "192.168.1.1 - US - [2024-06-01T12:00:00] \"GET /index.html HTTP/1.1\" 200 1234 \"-\" \"Mozilla/5.0\" 150\n",
        "10.0.0.2 - GB - [2024-06-01T12:01:00] \"POST /submit HTTP/1.1\" 404 567 \"-\" \"curl/7.68.0\" 200\n",
        "172.16.0.3 - FR - [2024-06-01T12:02:00] \"HEAD /status HTTP/1.1\" 301 89 \"-\" \"python-requests/2.25.1\" 50\n",
    );

    fn write_temp(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_log_file_basic() {
        let file = write_temp(SAMPLE_LOG.as_bytes());
        let table = parse_log_file(file.path()).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.columns().len(), 9);
        let rows = table.records();
        assert_eq!(rows[0].ip, "192.168.1.1");
        assert_eq!(rows[1].country, "GB");
        assert_eq!(rows[2].method, HttpMethod::Head);
        assert_eq!(rows[0].path, "/index.html");
        assert_eq!(rows[1].status, "404");
        assert_eq!(rows[2].ua, "python-requests/2.25.1");
        assert_eq!(rows[0].duration, "150");
    }

    #[test]
    fn test_parse_log_file_empty() {
        let file = write_temp(b"");
        let table = parse_log_file(file.path()).unwrap();

        assert!(table.is_empty());
        assert_eq!(table.columns()[0], "ip");
    }

    #[test]
    fn test_parse_log_file_invalid_lines() {
        let content = format!("invalid log line\n{}", SAMPLE_LOG.lines().next().unwrap());
        let file = write_temp(content.as_bytes());
        let table = parse_log_file(file.path()).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].ip, "192.168.1.1");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_log_file(dir.path().join("missing.log")).unwrap_err();
        assert_eq!(err.io_kind(), Some(IoErrorKind::NotFound));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_permission_denied() {
        use std::os::unix::fs::PermissionsExt;

        let file = write_temp(SAMPLE_LOG.as_bytes());
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o000)).unwrap();
        // root ignores file modes
        if File::open(file.path()).is_ok() {
            return;
        }

        let err = parse_log_file(file.path()).unwrap_err();
        assert_eq!(err.io_kind(), Some(IoErrorKind::PermissionDenied));
    }

    #[test]
    fn test_invalid_utf8_is_io_error() {
        let mut content = SAMPLE_LOG.as_bytes().to_vec();
        content.extend_from_slice(&[0xff, 0xfe, b'\n']);
        let file = write_temp(&content);

        let err = parse_log_file(file.path()).unwrap_err();
        assert_eq!(err.io_kind(), Some(IoErrorKind::InvalidData));
    }

    #[test]
    fn test_parse_with_statistics_counts_drops() {
        let content = format!("invalid log line\n\n{}", SAMPLE_LOG);
        let file = write_temp(content.as_bytes());
        let (table, stats) = LogParser::new().parse_with_statistics(file.path()).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(stats.total_lines, 5);
        assert_eq!(stats.matched_lines, 3);
        assert_eq!(stats.dropped_lines, 2);
        assert_eq!(stats.drop_reasons.get("ip digits"), Some(&2));
    }

    #[test]
    fn test_parse_reader_preserves_order() {
        let table = LogParser::new().parse_reader(Cursor::new(SAMPLE_LOG), "memory").unwrap();
        let ips: Vec<&str> = table.iter().map(|r| r.ip.as_str()).collect();
        assert_eq!(ips, vec!["192.168.1.1", "10.0.0.2", "172.16.0.3"]);
    }

    #[test]
    fn test_whole_micros_saturates() {
        assert_eq!(whole_micros(Duration::from_micros(42)), 42);
        assert_eq!(whole_micros(Duration::MAX), u64::MAX);
    }

    #[quickcheck]
    fn prop_record_count_equals_valid_lines(layout: Vec<bool>) -> bool {
        let valid = SAMPLE_LOG.lines().next().unwrap();
        let content: String = layout
            .iter()
            .map(|is_valid| if *is_valid { format!("{}\n", valid) } else { "garbage line\n".to_string() })
            .collect();

        let table = LogParser::new().parse_reader(Cursor::new(content), "memory").unwrap();
        table.len() == layout.iter().filter(|v| **v).count()
    }
}
