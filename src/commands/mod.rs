pub mod analyze;
pub mod export;
pub mod stats;
pub mod output;

pub use analyze::run_analyze;
pub use export::run_export;
pub use stats::run_stats;

use std::path::Path;
use crate::config::AnalyzerConfig;
use crate::error::ParseError;

/// Configuration from `--config`, or the defaults
pub fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig, ParseError> {
    match path {
        Some(path) => AnalyzerConfig::load(path),
        None => Ok(AnalyzerConfig::default()),
    }
}
