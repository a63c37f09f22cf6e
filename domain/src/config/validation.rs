//! Startup configuration issues.
//!
//! Validation collects every issue instead of stopping at the first, so a
//! user can fix a configuration in one pass. Any [`Severity::Error`] blocks
//! startup; warnings are logged and the adjusted value is used.
//!
//! ```
//! use council_domain::config::{ConfigIssue, ConfigIssueCode, Severity, has_errors};
//!
//! let issues = vec![ConfigIssue::warning(
//!     ConfigIssueCode::HeartbeatClamped,
//!     "heartbeat.interval_ms raised to 1000",
//! )];
//! assert!(!has_errors(&issues));
//! ```

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the orchestrator cannot start.
    Error,
    /// Non-fatal: a value was adjusted.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    NoMembers,
    InvalidBackendUrl,
    DuplicateMember,
    ZeroTimeout,
    HeartbeatClamped,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}

pub fn has_errors(issues: &[ConfigIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_blocks() {
        let issues = vec![
            ConfigIssue::warning(ConfigIssueCode::HeartbeatClamped, "clamped"),
            ConfigIssue::error(ConfigIssueCode::NoMembers, "no members"),
        ];
        assert!(has_errors(&issues));
        assert_eq!(issues[1].to_string(), "error: no members");
    }
}
