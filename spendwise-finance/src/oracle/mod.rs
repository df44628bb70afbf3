//! The LLM oracle contract.
//!
//! A request names a `mode` plus the payload that mode needs; a reply is
//! the model's raw text `content` and optional `meta`. Transports decide
//! how the request reaches a model.

pub mod direct;
pub mod prompts;
pub mod proxy;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use spendwise_core::{Category, RawTransaction};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use direct::{DirectOracle, DirectOracleConfig};
pub use proxy::ProxyOracle;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OracleMode {
    Extract,
    Categorize,
}

impl OracleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OracleMode::Extract => "extract",
            OracleMode::Categorize => "categorize",
        }
    }

    /// Upstream sampling temperature
    pub fn temperature(&self) -> f32 {
        match self {
            OracleMode::Extract => 0.0,
            OracleMode::Categorize => 0.1,
        }
    }

    pub fn max_tokens(&self) -> u32 {
        match self {
            OracleMode::Extract => 900,
            OracleMode::Categorize => 600,
        }
    }
}

impl fmt::Display for OracleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OracleMode {
    type Err = OracleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "extract" => Ok(OracleMode::Extract),
            "categorize" => Ok(OracleMode::Categorize),
            _ => Err(OracleError::InvalidRequest("Unsupported mode.".to_string())),
        }
    }
}

/// A transaction as sent for categorization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionLine {
    pub description: String,
    pub amount: f64,
    pub date: String,
}

impl From<&RawTransaction> for TransactionLine {
    fn from(t: &RawTransaction) -> Self {
        Self {
            description: t.match_text().to_string(),
            amount: t.amount,
            date: t.date.clone().unwrap_or_default(),
        }
    }
}

/// A registry entry as sent for categorization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryEntry {
    pub id: String,
    pub label: String,
    pub helper: String,
}

impl From<Category> for CategoryEntry {
    fn from(c: Category) -> Self {
        Self {
            id: c.id().to_string(),
            label: c.label().to_string(),
            helper: c.helper().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OracleRequest {
    pub mode: OracleMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<TransactionLine>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<CategoryEntry>>,
}

impl OracleRequest {
    pub fn extract(statement: impl Into<String>) -> Self {
        Self {
            mode: OracleMode::Extract,
            statement: Some(statement.into()),
            transactions: None,
            categories: None,
        }
    }

    /// Categorize `transactions` against the full registry.
    pub fn categorize(transactions: &[RawTransaction]) -> Self {
        Self {
            mode: OracleMode::Categorize,
            statement: None,
            transactions: Some(transactions.iter().map(TransactionLine::from).collect()),
            categories: Some(Category::ALL.into_iter().map(CategoryEntry::from).collect()),
        }
    }

    /// Payload rules the proxy enforces before calling upstream.
    pub fn validate(&self) -> Result<(), OracleError> {
        match self.mode {
            OracleMode::Extract => {
                let has_statement = self
                    .statement
                    .as_deref()
                    .map(|s| !s.is_empty())
                    .unwrap_or(false);
                if !has_statement {
                    return Err(OracleError::InvalidRequest("Missing statement text.".to_string()));
                }
            }
            OracleMode::Categorize => {
                let has_transactions = self
                    .transactions
                    .as_ref()
                    .map(|t| !t.is_empty())
                    .unwrap_or(false);
                if !has_transactions {
                    return Err(OracleError::InvalidRequest(
                        "Missing transactions to categorize.".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OracleMeta {
    pub model: String,
    pub mode: OracleMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OracleReply {
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<OracleMeta>,
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("LLM oracle not configured: {0}")]
    NotConfigured(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{message} (status {status})")]
    Status { status: u16, message: String },
    #[error("LLM proxy unreachable: {0}")]
    Transport(String),
    #[error("unexpected LLM response: {0}")]
    Decode(String),
}

impl OracleError {
    pub fn status(&self) -> Option<u16> {
        match self {
            OracleError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for OracleError {
    fn from(e: reqwest::Error) -> Self {
        OracleError::Transport(e.to_string())
    }
}

/// Opaque text-completion service. One call, one round-trip, no retries.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn complete(&self, request: &OracleRequest) -> Result<OracleReply, OracleError>;
}
