use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::error::ParseError;

/// Timestamp layout used by the access logs, `day/month/year:hour:minute:second`
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%d/%m/%Y:%H:%M:%S";

/// Name of the derived column attached by timestamp normalization
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// HTTP methods accepted by the access log grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Head,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 3] = [HttpMethod::Get, HttpMethod::Post, HttpMethod::Head];

    /// Exact, case-sensitive match against the closed method set
    pub fn from_token(token: &str) -> Option<HttpMethod> {
        match token {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "HEAD" => Some(HttpMethod::Head),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named columns of a `LogTable`, in export order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Ip,
    Country,
    Datetime,
    Method,
    Path,
    Status,
    Size,
    Ua,
    Duration,
}

impl Column {
    pub const ALL: [Column; 9] = [
        Column::Ip,
        Column::Country,
        Column::Datetime,
        Column::Method,
        Column::Path,
        Column::Status,
        Column::Size,
        Column::Ua,
        Column::Duration,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Column::Ip => "ip",
            Column::Country => "country",
            Column::Datetime => "datetime",
            Column::Method => "method",
            Column::Path => "path",
            Column::Status => "status",
            Column::Size => "size",
            Column::Ua => "ua",
            Column::Duration => "duration",
        }
    }

    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.iter().copied().find(|column| column.name() == name)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One access log line, every field kept as the captured text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub ip: String,
    pub country: String,
    /// Raw bracketed text, not validated as a date
    pub datetime: String,
    pub method: HttpMethod,
    pub path: String,
    pub status: String,
    pub size: String,
    pub ua: String,
    pub duration: String,
}

impl LogRecord {
    /// Borrow the text of a column
    pub fn field(&self, column: Column) -> &str {
        match column {
            Column::Ip => &self.ip,
            Column::Country => &self.country,
            Column::Datetime => &self.datetime,
            Column::Method => self.method.as_str(),
            Column::Path => &self.path,
            Column::Status => &self.status,
            Column::Size => &self.size,
            Column::Ua => &self.ua,
            Column::Duration => &self.duration,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status.parse().ok()
    }

    pub fn size_bytes(&self) -> Option<u64> {
        self.size.parse().ok()
    }

    pub fn duration_value(&self) -> Option<u64> {
        self.duration.parse().ok()
    }

    /// Parse the raw `datetime` text with the given chrono format
    pub fn parse_datetime(&self, format: &str) -> Result<NaiveDateTime, ParseError> {
        NaiveDateTime::parse_from_str(&self.datetime, format).map_err(|_| ParseError::TimestampParseError {
            input: self.datetime.clone(),
            format: format.to_string(),
        })
    }
}

/// Ordered records from one parse, plus the optional parsed-timestamp column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogTable {
    records: Vec<LogRecord>,
    timestamps: Option<Vec<NaiveDateTime>>,
}

impl LogTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<LogRecord>) -> Self {
        Self {
            records,
            timestamps: None,
        }
    }

    pub fn push(&mut self, record: LogRecord) {
        self.records.push(record);
        // a new row invalidates a previously normalized column
        self.timestamps = None;
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LogRecord> {
        self.records.iter()
    }

    pub fn head(&self, n: usize) -> &[LogRecord] {
        &self.records[..n.min(self.records.len())]
    }

    /// Column names, available even when the table has no rows
    pub fn columns(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Column::ALL.iter().map(Column::name).collect();
        if self.timestamps.is_some() {
            names.push(TIMESTAMP_COLUMN);
        }
        names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns().contains(&name)
    }

    pub fn has_timestamps(&self) -> bool {
        self.timestamps.is_some()
    }

    /// Parse every `datetime` into the timestamp column.
    ///
    /// All-or-nothing: on the first unparseable value the table keeps no
    /// timestamp column and the error is returned.
    pub fn normalize_timestamps(&mut self, format: &str) -> Result<(), ParseError> {
        let parsed = self
            .records
            .iter()
            .map(|record| record.parse_datetime(format))
            .collect::<Result<Vec<_>, _>>();

        match parsed {
            Ok(timestamps) => {
                self.timestamps = Some(timestamps);
                Ok(())
            }
            Err(e) => {
                self.timestamps = None;
                Err(e)
            }
        }
    }

    /// Consuming form of `normalize_timestamps`
    pub fn with_timestamps(mut self, format: &str) -> Result<Self, ParseError> {
        self.normalize_timestamps(format)?;
        Ok(self)
    }

    /// Parsed timestamps aligned with `records()`, or a `SchemaError`
    pub fn timestamps(&self) -> Result<&[NaiveDateTime], ParseError> {
        self.timestamps.as_deref().ok_or_else(|| ParseError::SchemaError {
            missing_field: TIMESTAMP_COLUMN.to_string(),
            available_fields: self.columns().iter().map(|c| c.to_string()).collect(),
        })
    }
}

impl<'a> IntoIterator for &'a LogTable {
    type Item = &'a LogRecord;
    type IntoIter = std::slice::Iter<'a, LogRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<LogRecord> for LogTable {
    fn from_iter<I: IntoIterator<Item = LogRecord>>(iter: I) -> Self {
        Self::from_records(iter.into_iter().collect())
    }
}

/// A key and how many rows carried it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCount {
    pub key: String,
    pub count: usize,
}

impl KeyCount {
    pub fn new(key: impl Into<String>, count: usize) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}
