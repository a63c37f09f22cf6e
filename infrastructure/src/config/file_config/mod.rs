//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into validated application
//! settings by [`FileConfig::to_council_config`] and friends.

mod council;
mod heartbeat;
mod logging;
mod persistence;
mod server;

pub use council::FileCouncilConfig;
pub use heartbeat::FileHeartbeatConfig;
pub use logging::FileLoggingConfig;
pub use persistence::FilePersistenceConfig;
pub use server::FileServerConfig;

use council_application::{CouncilConfig, HeartbeatConfig};
use council_domain::config::has_errors;
use council_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration that cannot start the orchestrator
#[derive(Error, Debug)]
pub enum ConfigValidationError {
    #[error("invalid configuration:\n{}", format_issues(.0))]
    Invalid(Vec<ConfigIssue>),
}

fn format_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("  - {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: FileServerConfig,
    pub council: FileCouncilConfig,
    pub heartbeat: FileHeartbeatConfig,
    pub persistence: FilePersistenceConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.council.parse_members().1);
        issues.extend(self.council.parse_chairman().1);

        if self.council.timeout_ms == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "council.timeout_ms cannot be 0",
            ));
        }

        issues.extend(self.heartbeat.to_heartbeat_config().1);
        issues
    }

    /// Build the runtime council settings, failing on any error-level issue.
    pub fn to_council_config(&self) -> Result<CouncilConfig, ConfigValidationError> {
        let issues = self.validate();
        if has_errors(&issues) {
            return Err(ConfigValidationError::Invalid(
                issues
                    .into_iter()
                    .filter(|i| i.severity == council_domain::Severity::Error)
                    .collect(),
            ));
        }

        let (members, _) = self.council.parse_members();
        let (chairman, _) = self.council.parse_chairman();
        let Some(chairman) = chairman else {
            return Err(ConfigValidationError::Invalid(self.council.parse_chairman().1));
        };

        CouncilConfig::new(
            members,
            chairman,
            Duration::from_millis(self.council.timeout_ms),
        )
        .map_err(|e| {
            ConfigValidationError::Invalid(vec![ConfigIssue::error(
                ConfigIssueCode::NoMembers,
                e.to_string(),
            )])
        })
    }

    pub fn heartbeat_config(&self) -> HeartbeatConfig {
        self.heartbeat.to_heartbeat_config().0
    }
}

/// Accept either a TOML array or one comma-separated string
pub(crate) fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        List(Vec<String>),
        One(String),
    }

    Ok(match StringOrList::deserialize(deserializer)? {
        StringOrList::List(values) => values,
        StringOrList::One(value) => value
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect(),
    })
}
