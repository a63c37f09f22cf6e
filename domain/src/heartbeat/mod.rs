//! Heartbeat records for member and chairman backends

use crate::contract::HealthReport;
use crate::core::backend::BackendId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    #[default]
    Unknown,
    Ok,
    Error,
}

/// Liveness record for one backend
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HeartbeatStatus {
    pub status: HealthState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ok_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_latency_ms: Option<u64>,
    pub consecutive_failures: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_response: Option<HealthReport>,
}

impl HeartbeatStatus {
    pub fn mark_ok(&mut self, at: DateTime<Utc>, latency_ms: u64, response: HealthReport) {
        self.status = HealthState::Ok;
        self.last_checked_at = Some(at);
        self.last_ok_at = Some(at);
        self.last_latency_ms = Some(latency_ms);
        self.consecutive_failures = 0;
        self.last_error = None;
        self.last_response = Some(response);
    }

    /// Record a failed probe. The last good payload is kept.
    pub fn mark_error(&mut self, at: DateTime<Utc>, latency_ms: u64, message: impl Into<String>) {
        self.status = HealthState::Error;
        self.last_checked_at = Some(at);
        self.last_error_at = Some(at);
        self.last_latency_ms = Some(latency_ms);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_error = Some(message.into());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChairmanHeartbeat {
    pub url: BackendId,
    pub status: HeartbeatStatus,
}

/// Point-in-time view of every backend's heartbeat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatSnapshot {
    pub interval_ms: u64,
    pub timeout_ms: u64,
    /// End of the last completed round (or monitor creation)
    pub updated_at: DateTime<Utc>,
    pub members: BTreeMap<BackendId, HeartbeatStatus>,
    pub chairman: ChairmanHeartbeat,
}

impl HeartbeatSnapshot {
    /// Fresh snapshot with every backend `unknown`
    pub fn new(
        members: &[BackendId],
        chairman: BackendId,
        interval_ms: u64,
        timeout_ms: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            interval_ms,
            timeout_ms,
            updated_at: created_at,
            members: members
                .iter()
                .map(|m| (m.clone(), HeartbeatStatus::default()))
                .collect(),
            chairman: ChairmanHeartbeat {
                url: chairman,
                status: HeartbeatStatus::default(),
            },
        }
    }
}
