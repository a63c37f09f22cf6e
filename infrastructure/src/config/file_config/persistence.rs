//! Run persistence settings from TOML (`[persistence]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePersistenceConfig {
    pub enabled: bool,
    /// SQLite database file; parent directories are created on open
    pub path: PathBuf,
    /// Number of most recent runs loaded into memory at startup
    pub bootstrap_limit: usize,
}

impl Default for FilePersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("./data/orchestrator.db"),
            bootstrap_limit: 20,
        }
    }
}
