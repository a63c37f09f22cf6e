//! Council membership from TOML (`[council]` section)
//!
//! ```toml
//! [council]
//! members = ["http://localhost:8001", "http://localhost:8002"]
//! chairman = "http://localhost:9100"
//! timeout_ms = 60000
//! ```
//!
//! `members` may also be a single comma-separated string, which is the
//! natural form for `COUNCIL_COUNCIL__MEMBERS`.

use council_domain::{BackendId, ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCouncilConfig {
    #[serde(deserialize_with = "super::string_or_list")]
    pub members: Vec<String>,
    pub chairman: String,
    /// Deadline for each member and chairman call
    pub timeout_ms: u64,
}

impl Default for FileCouncilConfig {
    fn default() -> Self {
        Self {
            members: Vec::new(),
            chairman: "http://localhost:9100".to_string(),
            timeout_ms: 60_000,
        }
    }
}

impl FileCouncilConfig {
    /// Parse member URLs, reporting every invalid or duplicate entry.
    pub fn parse_members(&self) -> (Vec<BackendId>, Vec<ConfigIssue>) {
        let mut members = Vec::new();
        let mut issues = Vec::new();
        let mut seen = HashSet::new();

        if self.members.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::NoMembers,
                "council.members must include at least one URL",
            ));
        }

        for raw in &self.members {
            match BackendId::parse(raw) {
                Ok(member) => {
                    if seen.insert(member.clone()) {
                        members.push(member);
                    } else {
                        issues.push(ConfigIssue::error(
                            ConfigIssueCode::DuplicateMember,
                            format!("council.members: '{}' is listed more than once", member),
                        ));
                    }
                }
                Err(e) => issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidBackendUrl,
                    format!("council.members: {}", e),
                )),
            }
        }

        (members, issues)
    }

    pub fn parse_chairman(&self) -> (Option<BackendId>, Vec<ConfigIssue>) {
        match BackendId::parse(&self.chairman) {
            Ok(chairman) => (Some(chairman), Vec::new()),
            Err(e) => (
                None,
                vec![ConfigIssue::error(
                    ConfigIssueCode::InvalidBackendUrl,
                    format!("council.chairman: {}", e),
                )],
            ),
        }
    }
}
