//! HTTP server configuration from TOML (`[server]` section)

use serde::{Deserialize, Serialize};

/// Example:
///
/// ```toml
/// [server]
/// host = "0.0.0.0"
/// port = 9000
/// cors_origins = ["http://localhost:5173"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed browser origins; any `http://localhost:<port>` is always allowed
    #[serde(deserialize_with = "super::string_or_list")]
    pub cors_origins: Vec<String>,
    pub body_limit_bytes: usize,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9000,
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:5174".to_string(),
            ],
            body_limit_bytes: 1024 * 1024,
        }
    }
}

impl FileServerConfig {
    /// `host:port` to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
