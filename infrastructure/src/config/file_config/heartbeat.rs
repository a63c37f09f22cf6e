//! Heartbeat settings from TOML (`[heartbeat]` section)

use council_application::{HEARTBEAT_FLOOR, HeartbeatConfig};
use council_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileHeartbeatConfig {
    pub interval_ms: u64,
    pub timeout_ms: u64,
}

impl Default for FileHeartbeatConfig {
    fn default() -> Self {
        Self {
            interval_ms: 15_000,
            timeout_ms: 5_000,
        }
    }
}

impl FileHeartbeatConfig {
    /// Clamped runtime settings, with a warning for each adjusted value.
    pub fn to_heartbeat_config(&self) -> (HeartbeatConfig, Vec<ConfigIssue>) {
        let floor = HEARTBEAT_FLOOR.as_millis() as u64;
        let issues = [
            ("heartbeat.interval_ms", self.interval_ms),
            ("heartbeat.timeout_ms", self.timeout_ms),
        ]
        .into_iter()
        .filter(|(_, value)| *value < floor)
        .map(|(field, value)| {
            ConfigIssue::warning(
                ConfigIssueCode::HeartbeatClamped,
                format!("{}: {} raised to {}", field, value, floor),
            )
        })
        .collect();

        let config = HeartbeatConfig::clamped(
            Duration::from_millis(self.interval_ms),
            Duration::from_millis(self.timeout_ms),
        );
        (config, issues)
    }
}
