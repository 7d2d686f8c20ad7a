use crate::error::ParseError;
use crate::models::LogRecord;

/// Common interface for single-line grammars
pub trait LineGrammar {
    /// Extract a record, or report where and why the line was rejected
    fn parse_line(&self, line: &str) -> Result<LogRecord, ParseError>;

    /// Extract a record, discarding the rejection reason
    fn match_line(&self, line: &str) -> Option<LogRecord> {
        self.parse_line(line).ok()
    }

    fn can_parse(&self, line: &str) -> bool {
        self.match_line(line).is_some()
    }
}

pub mod access_log;

pub use access_log::{AccessLogGrammar, ACCESS_LOG_GRAMMAR};
