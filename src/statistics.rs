use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};
use crate::error::ParseError;

/// Line-level parsing statistics for monitoring and debugging
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseStatistics {
    /// Total number of lines read
    pub total_lines: usize,
    /// Lines that matched the grammar
    pub matched_lines: usize,
    /// Lines that were dropped
    pub dropped_lines: usize,
    /// Dropped lines keyed by the token the grammar expected
    pub drop_reasons: HashMap<String, usize>,
    /// Processing time statistics (in microseconds)
    pub processing_time_micros: ProcessingTimeStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingTimeStats {
    pub total_time: u64,
    pub min_time: u64,
    pub max_time: u64,
    pub avg_time: f64,
}

impl ParseStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a matched line
    pub fn record_match(&mut self, processing_time_micros: u64) {
        self.total_lines += 1;
        self.matched_lines += 1;
        self.update_processing_time(processing_time_micros);
    }

    /// Record a dropped line
    pub fn record_drop(&mut self, error: &ParseError, processing_time_micros: u64) {
        self.total_lines += 1;
        self.dropped_lines += 1;
        *self.drop_reasons.entry(Self::reason(error)).or_insert(0) += 1;
        self.update_processing_time(processing_time_micros);
    }

    /// Matched lines as a percentage of lines read
    pub fn match_rate(&self) -> f64 {
        if self.total_lines == 0 {
            0.0
        } else {
            (self.matched_lines as f64 / self.total_lines as f64) * 100.0
        }
    }

    /// Dropped lines as a percentage of lines read
    pub fn drop_rate(&self) -> f64 {
        if self.total_lines == 0 {
            0.0
        } else {
            (self.dropped_lines as f64 / self.total_lines as f64) * 100.0
        }
    }

    /// Drop reasons, most frequent first, ties by name
    pub fn sorted_drop_reasons(&self) -> Vec<(&str, usize)> {
        let mut reasons: Vec<(&str, usize)> = self
            .drop_reasons
            .iter()
            .map(|(reason, count)| (reason.as_str(), *count))
            .collect();
        reasons.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        reasons
    }

    fn update_processing_time(&mut self, time_micros: u64) {
        let stats = &mut self.processing_time_micros;
        stats.total_time = stats.total_time.saturating_add(time_micros);

        if self.total_lines == 1 || time_micros < stats.min_time {
            stats.min_time = time_micros;
        }
        if time_micros > stats.max_time {
            stats.max_time = time_micros;
        }

        stats.avg_time = stats.total_time as f64 / self.total_lines as f64;
    }

    fn reason(error: &ParseError) -> String {
        match error {
            ParseError::MalformedLine { expected, .. } => expected.clone(),
            other => other.type_name().to_string(),
        }
    }
}

/// Statistics collector that reports progress through `tracing`
#[derive(Debug, Clone)]
pub struct StatisticsMonitor {
    stats: ParseStatistics,
    debug_output_enabled: bool,
    report_interval: usize,
    last_report_line: usize,
}

impl StatisticsMonitor {
    pub fn new() -> Self {
        Self::with_settings(false, 10_000)
    }

    pub fn with_settings(debug_output_enabled: bool, report_interval: usize) -> Self {
        Self {
            stats: ParseStatistics::new(),
            debug_output_enabled,
            report_interval,
            last_report_line: 0,
        }
    }

    pub fn record_match(&mut self, line_number: usize, processing_time_micros: u64) {
        self.stats.record_match(processing_time_micros);
        if self.debug_output_enabled {
            debug!(line_number, processing_time_micros, "line matched");
        }
        self.check_and_report();
    }

    pub fn record_drop(&mut self, line_number: usize, error: &ParseError, processing_time_micros: u64) {
        self.stats.record_drop(error, processing_time_micros);
        if self.debug_output_enabled {
            debug!(line_number, processing_time_micros, reason = %error, "line dropped");
        }
        self.check_and_report();
    }

    pub fn get_statistics(&self) -> &ParseStatistics {
        &self.stats
    }

    pub fn into_statistics(self) -> ParseStatistics {
        self.stats
    }

    pub fn reset(&mut self) {
        self.stats = ParseStatistics::new();
        self.last_report_line = 0;
    }

    /// Compact status line for continuous monitoring
    pub fn generate_status_line(&self) -> String {
        let stats = &self.stats;
        format!(
            "Lines: {} | Matched: {:.1}% | Dropped: {:.1}% | Avg Time: {:.1}μs",
            stats.total_lines,
            stats.match_rate(),
            stats.drop_rate(),
            stats.processing_time_micros.avg_time
        )
    }

    fn check_and_report(&mut self) {
        if self.report_interval == 0 {
            return;
        }
        if self.stats.total_lines - self.last_report_line >= self.report_interval {
            info!("{}", self.generate_status_line());
            self.last_report_line = self.stats.total_lines;
        }
    }
}

impl Default for StatisticsMonitor {
    fn default() -> Self {
        Self::new()
    }
}
