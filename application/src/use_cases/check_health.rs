//! Check Health use case
//!
//! Probes every member and the chairman live, using the request timeout,
//! and pairs the result with the heartbeat monitor's latest snapshot.

use crate::config::CouncilConfig;
use crate::ports::council_gateway::CouncilGateway;
use crate::services::heartbeat::HeartbeatMonitor;
use chrono::{DateTime, Utc};
use council_domain::{BackendId, HealthReport, HeartbeatSnapshot};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProbeResult {
    Ok { data: HealthReport },
    Error { error: String },
}

impl ProbeResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, ProbeResult::Ok { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberProbe {
    pub member_url: BackendId,
    #[serde(flatten)]
    pub result: ProbeResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChairmanProbe {
    pub chairman_url: BackendId,
    #[serde(flatten)]
    pub result: ProbeResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthOutput {
    /// True only when every probe succeeded
    pub ok: bool,
    pub members: Vec<MemberProbe>,
    pub chairman: ChairmanProbe,
    pub timestamp: DateTime<Utc>,
    pub heartbeat: HeartbeatSnapshot,
}

pub struct CheckHealthUseCase {
    gateway: Arc<dyn CouncilGateway>,
    config: CouncilConfig,
    heartbeat: Arc<HeartbeatMonitor>,
}

impl CheckHealthUseCase {
    pub fn new(
        gateway: Arc<dyn CouncilGateway>,
        config: CouncilConfig,
        heartbeat: Arc<HeartbeatMonitor>,
    ) -> Self {
        Self {
            gateway,
            config,
            heartbeat,
        }
    }

    pub async fn execute(&self) -> HealthOutput {
        let timeout = self.config.timeout();
        let member_probes = join_all(self.config.members().iter().map(|member| async move {
            MemberProbe {
                member_url: member.clone(),
                result: self.probe(member, timeout).await,
            }
        }));
        let chairman = self.config.chairman();
        let chairman_probe = async {
            ChairmanProbe {
                chairman_url: chairman.clone(),
                result: self.probe(chairman, timeout).await,
            }
        };
        let (members, chairman) = tokio::join!(member_probes, chairman_probe);

        HealthOutput {
            ok: members.iter().all(|m| m.result.is_ok()) && chairman.result.is_ok(),
            members,
            chairman,
            timestamp: Utc::now(),
            heartbeat: self.heartbeat.snapshot(),
        }
    }

    /// Latest heartbeat table without probing
    pub fn heartbeat(&self) -> HeartbeatSnapshot {
        self.heartbeat.snapshot()
    }

    async fn probe(&self, backend: &BackendId, timeout: std::time::Duration) -> ProbeResult {
        match self.gateway.health(backend, timeout).await {
            Ok(data) => ProbeResult::Ok { data },
            Err(e) => ProbeResult::Error {
                error: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HeartbeatConfig;
    use crate::testing::ScriptedGateway;
    use std::time::Duration;

    fn backend(url: &str) -> BackendId {
        BackendId::parse(url).unwrap()
    }

    fn setup(gateway: Arc<ScriptedGateway>) -> CheckHealthUseCase {
        let members = vec![backend("http://m1"), backend("http://m2")];
        let config =
            CouncilConfig::new(members.clone(), backend("http://chair"), Duration::from_secs(1))
                .unwrap();
        let heartbeat = Arc::new(HeartbeatMonitor::new(
            gateway.clone(),
            members,
            backend("http://chair"),
            HeartbeatConfig::default(),
        ));
        CheckHealthUseCase::new(gateway, config, heartbeat)
    }

    #[tokio::test]
    async fn test_all_healthy() {
        let output = setup(Arc::new(ScriptedGateway::new())).execute().await;
        assert!(output.ok);
        assert_eq!(output.members.len(), 2);

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["members"][0]["member_url"], "http://m1");
        assert_eq!(json["members"][0]["status"], "ok");
        assert_eq!(json["chairman"]["chairman_url"], "http://chair");
        assert!(json["heartbeat"]["members"].is_object());
    }

    #[tokio::test]
    async fn test_one_failure_clears_ok() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.set_healthy(&backend("http://chair"), false);
        let output = setup(gateway).execute().await;

        assert!(!output.ok);
        assert!(output.members.iter().all(|m| m.result.is_ok()));
        let json = serde_json::to_value(&output.chairman).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "Transport error: connection refused");
    }
}
