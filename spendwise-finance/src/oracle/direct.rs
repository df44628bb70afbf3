//! Oracle that calls an OpenAI-compatible chat completions API directly,
//! doing in-process what the proxy does server-side.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::prompts::{ChatMessage, messages_for};
use super::{Oracle, OracleError, OracleMeta, OracleMode, OracleReply, OracleRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Resolved upstream endpoint; built from config and environment by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectOracleConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for DirectOracleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectOracle {
    client: reqwest::Client,
    config: DirectOracleConfig,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    error: Option<UpstreamError>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpstreamError {
    message: Option<String>,
}

impl DirectOracle {
    pub fn new(mut config: DirectOracleConfig) -> Self {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &DirectOracleConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str, OracleError> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| OracleError::NotConfigured("Missing GROQ_API_KEY for the LLM proxy.".to_string()))
    }
}

#[async_trait]
impl Oracle for DirectOracle {
    async fn complete(&self, request: &OracleRequest) -> Result<OracleReply, OracleError> {
        request.validate()?;
        let api_key = self.api_key()?;

        let body = ChatRequest {
            model: &self.config.model,
            temperature: request.mode.temperature(),
            max_tokens: request.mode.max_tokens(),
            messages: messages_for(request),
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        let resp = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await
            .inspect_err(|e| warn!(mode = %request.mode, error = %e, "upstream LLM request failed"))?;

        let status = resp.status().as_u16();
        let text = resp.text().await?;
        let reply = parse_chat_response(status, &text, &self.config.model, request.mode)
            .inspect_err(|e| warn!(mode = %request.mode, status, error = %e, "upstream LLM error"))?;
        info!(mode = %request.mode, model = %self.config.model, chars = reply.content.len(), "LLM completion received");
        Ok(reply)
    }
}

/// Map a chat-completions response to a reply. Failures carry the
/// upstream `error.message` when there is one.
pub fn parse_chat_response(
    status: u16,
    body: &str,
    model: &str,
    mode: OracleMode,
) -> Result<OracleReply, OracleError> {
    let data: Option<ChatResponse> = serde_json::from_str(body).ok();

    if !(200..300).contains(&status) {
        let message = data
            .and_then(|d| d.error)
            .and_then(|e| e.message)
            .unwrap_or_else(|| "LLM request failed.".to_string());
        return Err(OracleError::Status { status, message });
    }

    let data = data.ok_or_else(|| OracleError::Decode("upstream body is not JSON".to_string()))?;
    let content = data
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default();

    Ok(OracleReply {
        content,
        meta: Some(OracleMeta {
            model: model.to_string(),
            mode,
        }),
    })
}
