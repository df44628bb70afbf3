//! Oracle reached through the LLM proxy endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{Oracle, OracleError, OracleReply, OracleRequest};

pub const DEFAULT_PROXY_URL: &str = "http://localhost:8789/.netlify/functions/llm-proxy";

#[derive(Debug, Clone)]
pub struct ProxyOracle {
    client: reqwest::Client,
    url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl ProxyOracle {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Turn a proxy response into a reply or an error carrying the proxy's
/// own message.
pub fn parse_proxy_response(status: u16, body: &str) -> Result<OracleReply, OracleError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_else(|_| body.trim().to_string());
        let message = if message.is_empty() {
            "LLM proxy error.".to_string()
        } else {
            message
        };
        return Err(OracleError::Status { status, message });
    }

    serde_json::from_str(body).map_err(|e| OracleError::Decode(e.to_string()))
}

#[async_trait]
impl Oracle for ProxyOracle {
    async fn complete(&self, request: &OracleRequest) -> Result<OracleReply, OracleError> {
        debug!(mode = %request.mode, url = %self.url, "LLM proxy request started");
        let resp = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .inspect_err(|e| warn!(error = %e, "LLM proxy unreachable"))?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;
        let reply = parse_proxy_response(status, &body)
            .inspect_err(|e| warn!(mode = %request.mode, status, error = %e, "LLM proxy request failed"))?;
        debug!(mode = %request.mode, meta = ?reply.meta, "LLM proxy success");
        Ok(reply)
    }
}
