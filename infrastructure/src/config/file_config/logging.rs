//! Log output settings from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for daily-rolling diagnostic log files
    pub dir: Option<PathBuf>,
    /// JSONL file receiving one line per run event
    pub event_log: Option<PathBuf>,
}
