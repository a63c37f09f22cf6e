use super::ResponseContract;
use serde::{Deserialize, Serialize};

/// Body of `GET /health` on any backend
///
/// Members report `member_id` and chairmen `chairman_id`; older services
/// report `ollama_base_url`. All are folded into the same fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub ok: bool,
    #[serde(default, alias = "member_id", alias = "chairman_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default, alias = "ollama_base_url")]
    pub backend_url: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseContract for HealthReport {
    fn violation(&self) -> Option<String> {
        None
    }
}
