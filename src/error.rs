use std::fmt;
use std::io;
use serde::{Deserialize, Serialize};

/// Serialisable subset of `std::io::ErrorKind` relevant to reading log files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IoErrorKind {
    NotFound,
    PermissionDenied,
    /// File content is not valid UTF-8
    InvalidData,
    Other,
}

impl From<io::ErrorKind> for IoErrorKind {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => IoErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => IoErrorKind::PermissionDenied,
            io::ErrorKind::InvalidData => IoErrorKind::InvalidData,
            _ => IoErrorKind::Other,
        }
    }
}

/// Error types for log parsing, aggregation and export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParseError {
    /// I/O error while opening, reading or writing a file
    IoError {
        operation: String,
        path: String,
        kind: IoErrorKind,
        error_message: String,
    },
    /// A line did not match the access log grammar
    MalformedLine {
        expected: String,
        position: usize,
    },
    /// A table or CSV source lacks a column an operation depends on
    SchemaError {
        missing_field: String,
        available_fields: Vec<String>,
    },
    /// Timestamp normalization failed
    TimestampParseError {
        input: String,
        format: String,
    },
    /// A value could not populate a typed field
    FieldExtractionError {
        field_name: String,
        error_message: String,
    },
    /// CSV writer or reader failure
    CsvError {
        error_message: String,
    },
    /// Configuration error
    ConfigurationError {
        parameter: String,
        error_message: String,
    },
}

impl ParseError {
    /// Build an `IoError` from a `std::io::Error`, keeping its kind
    pub fn io(operation: &str, path: &str, error: &io::Error) -> Self {
        ParseError::IoError {
            operation: operation.to_string(),
            path: path.to_string(),
            kind: error.kind().into(),
            error_message: error.to_string(),
        }
    }

    /// Kind of the underlying I/O failure, if this is an I/O error
    pub fn io_kind(&self) -> Option<IoErrorKind> {
        match self {
            ParseError::IoError { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Short variant name, used as a key in statistics
    pub fn type_name(&self) -> &'static str {
        match self {
            ParseError::IoError { .. } => "IoError",
            ParseError::MalformedLine { .. } => "MalformedLine",
            ParseError::SchemaError { .. } => "SchemaError",
            ParseError::TimestampParseError { .. } => "TimestampParseError",
            ParseError::FieldExtractionError { .. } => "FieldExtractionError",
            ParseError::CsvError { .. } => "CsvError",
            ParseError::ConfigurationError { .. } => "ConfigurationError",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::IoError { operation, path, kind, error_message } => {
                write!(f, "I/O error during {} of '{}' ({:?}): {}", operation, path, kind, error_message)
            }
            ParseError::MalformedLine { expected, position } => {
                write!(f, "Malformed line: expected {} at byte {}", expected, position)
            }
            ParseError::SchemaError { missing_field, available_fields } => {
                write!(f, "Missing required field '{}', available: {:?}", missing_field, available_fields)
            }
            ParseError::TimestampParseError { input, format } => {
                write!(f, "Failed to parse timestamp '{}' with format '{}'", input, format)
            }
            ParseError::FieldExtractionError { field_name, error_message } => {
                write!(f, "Failed to extract field '{}': {}", field_name, error_message)
            }
            ParseError::CsvError { error_message } => {
                write!(f, "CSV error: {}", error_message)
            }
            ParseError::ConfigurationError { parameter, error_message } => {
                write!(f, "Configuration error for '{}': {}", parameter, error_message)
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl From<csv::Error> for ParseError {
    fn from(error: csv::Error) -> Self {
        ParseError::CsvError {
            error_message: error.to_string(),
        }
    }
}
