//! Single-shot JSON client with per-call deadlines

use council_application::GatewayError;
use council_domain::ResponseContract;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Longest error body kept in a [`GatewayError::Status`]
const MAX_ERROR_BODY: usize = 512;

/// Thin wrapper over a shared `reqwest` connection pool.
///
/// Calls are never retried; the caller's timeout bounds the whole
/// exchange, including reading the body.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    connect_timeout: Duration,
}

impl BackendClient {
    pub fn new(connect_timeout: Duration) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            connect_timeout,
        })
    }

    /// `GET url`, decoding the JSON body into `T`
    pub async fn get<T>(&self, url: &str, timeout: Duration) -> Result<T, GatewayError>
    where
        T: DeserializeOwned + ResponseContract,
    {
        self.send(self.http.get(url), url, timeout).await
    }

    /// `POST url` with a JSON body, decoding the JSON response into `T`
    pub async fn post<B, T>(&self, url: &str, body: &B, timeout: Duration) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + ResponseContract,
    {
        self.send(self.http.post(url).json(body), url, timeout).await
    }

    async fn send<T>(
        &self,
        request: RequestBuilder,
        url: &str,
        timeout: Duration,
    ) -> Result<T, GatewayError>
    where
        T: DeserializeOwned + ResponseContract,
    {
        let timeout_ms = timeout.as_millis() as u64;
        let connect_ms = self.connect_timeout.as_millis();
        // a connect timeout is bounded by the client, not the call deadline
        let classify = |e: reqwest::Error| {
            if e.is_connect() && e.is_timeout() {
                GatewayError::Transport(format!("connect timed out after {}ms", connect_ms))
            } else if e.is_timeout() {
                GatewayError::Timeout(timeout_ms)
            } else {
                GatewayError::Transport(e.to_string())
            }
        };

        let response = request.timeout(timeout).send().await.map_err(classify)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(url, status = status.as_u16(), "backend returned error status");
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: error_body(&body),
            });
        }

        let bytes = response.bytes().await.map_err(classify)?;
        let decoded: T = serde_json::from_slice(&bytes)
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        if let Some(violation) = decoded.violation() {
            return Err(GatewayError::InvalidResponse(violation));
        }
        Ok(decoded)
    }
}

fn error_body(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    if body.len() <= MAX_ERROR_BODY {
        return Some(body.to_string());
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    Some(format!("{}...", &body[..end]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::HealthReport;

    #[test]
    fn test_error_body_trimmed_and_truncated() {
        assert_eq!(error_body("  \n"), None);
        assert_eq!(error_body(" busy \n").as_deref(), Some("busy"));

        let long = "é".repeat(MAX_ERROR_BODY);
        let truncated = error_body(&long).unwrap();
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= MAX_ERROR_BODY + 3);
    }

    #[tokio::test]
    async fn test_connect_failure_is_transport_not_call_timeout() {
        // non-routable, so the connect either hangs past 1ms or fails outright
        let client = BackendClient::new(Duration::from_millis(1)).unwrap();
        let err = client
            .get::<HealthReport>("http://10.255.255.1:81/health", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)), "{:?}", err);
    }
}
