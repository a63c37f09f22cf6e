//! Heartbeat Monitor
//!
//! Polls every member's and the chairman's `/health` endpoint on a fixed
//! interval, independent of request traffic. At most one round is in flight;
//! a tick that fires while a round is running is skipped, not queued.

use crate::config::HeartbeatConfig;
use crate::ports::council_gateway::CouncilGateway;
use chrono::Utc;
use council_domain::{BackendId, HeartbeatSnapshot};
use futures::future::join_all;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub struct HeartbeatMonitor {
    gateway: Arc<dyn CouncilGateway>,
    members: Vec<BackendId>,
    chairman: BackendId,
    config: HeartbeatConfig,
    snapshot: RwLock<HeartbeatSnapshot>,
    round_in_flight: AtomicBool,
    cancellation: CancellationToken,
}

impl HeartbeatMonitor {
    pub fn new(
        gateway: Arc<dyn CouncilGateway>,
        members: Vec<BackendId>,
        chairman: BackendId,
        config: HeartbeatConfig,
    ) -> Self {
        let snapshot = HeartbeatSnapshot::new(
            &members,
            chairman.clone(),
            config.interval.as_millis() as u64,
            config.timeout.as_millis() as u64,
            Utc::now(),
        );
        Self {
            gateway,
            members,
            chairman,
            config,
            snapshot: RwLock::new(snapshot),
            round_in_flight: AtomicBool::new(false),
            cancellation: CancellationToken::new(),
        }
    }

    /// Start polling. The first round begins immediately.
    ///
    /// Each tick spawns its round, so a slow round does not delay the
    /// schedule; overlapping ticks are dropped by [`Self::probe_once`].
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(monitor.config.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = monitor.cancellation.cancelled() => break,
                    _ = ticker.tick() => {
                        let round = Arc::clone(&monitor);
                        tokio::spawn(async move {
                            round.probe_once().await;
                        });
                    }
                }
            }
            debug!("Heartbeat monitor stopped");
        })
    }

    /// Run one probe round unless another is already running.
    ///
    /// Returns `false` when the round was skipped.
    pub async fn probe_once(&self) -> bool {
        if self
            .round_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Heartbeat round already in flight, skipping");
            return false;
        }
        let _in_flight = InFlight(&self.round_in_flight);

        let backends: Vec<&BackendId> = self
            .members
            .iter()
            .chain(std::iter::once(&self.chairman))
            .collect();
        let probes = backends.iter().map(|backend| {
            let gateway = Arc::clone(&self.gateway);
            let timeout = self.config.timeout;
            async move {
                let started = Instant::now();
                let result = gateway.health(backend, timeout).await;
                (*backend, started.elapsed().as_millis() as u64, result)
            }
        });
        let results = join_all(probes).await;

        {
            let mut snapshot = self.snapshot.write();
            for (index, (backend, latency_ms, result)) in results.into_iter().enumerate() {
                let now = Utc::now();
                // the chairman is probed last
                let status = if index < self.members.len() {
                    snapshot.members.get_mut(backend)
                } else {
                    Some(&mut snapshot.chairman.status)
                };
                let Some(status) = status else { continue };
                match result {
                    Ok(report) => status.mark_ok(now, latency_ms, report),
                    Err(e) => {
                        warn!("Heartbeat to {} failed: {}", backend, e);
                        status.mark_error(now, latency_ms, e.to_string());
                    }
                }
            }
            snapshot.updated_at = Utc::now();
        }

        true
    }

    /// Latest fully written heartbeat table
    pub fn snapshot(&self) -> HeartbeatSnapshot {
        self.snapshot.read().clone()
    }

    /// Cancel the polling interval. A round already running may finish.
    pub fn stop(&self) {
        self.cancellation.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// Clears the single-flight flag when a round ends, even if it panicked
/// or its future was dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
