use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use crate::error::ParseError;
use crate::models::DEFAULT_TIMESTAMP_FORMAT;

/// Report settings; every field has a default so config files may be partial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Records shown in the sample dump
    pub sample_size: usize,

    /// Entries in the top IP ranking
    pub top_ips: usize,

    /// IPs with more requests than this are reported as suspicious
    pub suspicious_threshold: usize,

    /// Entries in the peak requests-per-minute ranking
    pub top_requests_per_minute: usize,

    pub top_paths: usize,
    pub top_user_agents: usize,

    /// chrono format for the bracketed datetime field
    pub timestamp_format: String,

    /// Where `analyze` writes the parsed table
    pub csv_output: PathBuf,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            sample_size: 5,
            top_ips: 20,
            suspicious_threshold: 1000,
            top_requests_per_minute: 20,
            top_paths: 10,
            top_user_agents: 10,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            csv_output: PathBuf::from("traffic_data.csv"),
        }
    }
}

impl AnalyzerConfig {
    /// Load a JSON configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let source = path.to_string_lossy().to_string();
        let content = fs::read_to_string(path).map_err(|e| ParseError::io("read", &source, &e))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ParseError> {
        let config: AnalyzerConfig = serde_json::from_str(content).map_err(|e| ParseError::ConfigurationError {
            parameter: "config".to_string(),
            error_message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ParseError> {
        if self.timestamp_format.trim().is_empty() {
            return Err(ParseError::ConfigurationError {
                parameter: "timestamp_format".to_string(),
                error_message: "must not be empty".to_string(),
            });
        }
        if self.csv_output.as_os_str().is_empty() {
            return Err(ParseError::ConfigurationError {
                parameter: "csv_output".to_string(),
                error_message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
