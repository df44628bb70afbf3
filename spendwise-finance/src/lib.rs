//! spendwise-finance: oracle client, bucket rules, ingestion pipeline and summary insights

pub mod category_rules;
pub mod insights;
pub mod llm_client;
pub mod oracle;
pub mod pipeline;

pub use category_rules::{categorize_description, is_payment, resolve_bucket};
pub use oracle::{DirectOracle, DirectOracleConfig, Oracle, OracleError, OracleRequest, ProxyOracle};
pub use pipeline::{IngestError, Ingestor, StatementSummary, summarize};
