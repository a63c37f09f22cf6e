//! Application-level configuration.
//!
//! Validated runtime settings the use cases consume. File and environment
//! loading lives in the infrastructure layer, which produces these.

use council_domain::{BackendId, DomainError};
use std::time::Duration;

/// Lower bound applied to heartbeat interval and timeout
pub const HEARTBEAT_FLOOR: Duration = Duration::from_millis(1000);

/// Council membership and per-call deadline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouncilConfig {
    members: Vec<BackendId>,
    chairman: BackendId,
    timeout: Duration,
}

impl CouncilConfig {
    /// Members keep their configured order, which is also the display order.
    pub fn new(
        members: Vec<BackendId>,
        chairman: BackendId,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        if members.is_empty() {
            return Err(DomainError::NoMembers);
        }
        Ok(Self {
            members,
            chairman,
            timeout,
        })
    }

    pub fn members(&self) -> &[BackendId] {
        &self.members
    }

    pub fn chairman(&self) -> &BackendId {
        &self.chairman
    }

    /// Deadline applied to each individual backend call
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Heartbeat polling settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl HeartbeatConfig {
    /// Both values are raised to [`HEARTBEAT_FLOOR`] if below it.
    pub fn clamped(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval: interval.max(HEARTBEAT_FLOOR),
            timeout: timeout.max(HEARTBEAT_FLOOR),
        }
    }
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(15_000),
            timeout: Duration::from_millis(5_000),
        }
    }
}
