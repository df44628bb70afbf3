//! Statement ingestion pipeline.
//!
//! Text uploads are parsed locally. PDFs go through oracle extraction with
//! a heuristic fallback, then oracle categorization with a keyword
//! fallback. Oracle failures never abort an import; they downgrade the
//! result's `source` and leave a `warning`.

use serde::Serialize;
use spendwise_core::{
    BucketTotals, Category, CategorizedTransaction, IngestionResult, IngestionSource,
    RawTransaction, StatementPeriod,
};
use spendwise_ingest::{FileKind, PdfText, StatementFile, parse_statement_text};
use thiserror::Error;
use tracing::{info, warn};

use crate::category_rules::{is_payment, resolve_bucket};
use crate::llm_client::{Assignments, categorize_transactions, extract_transactions};
use crate::oracle::Oracle;

const EXTRACTION_UNAVAILABLE: &str = "LLM proxy unavailable. Using fallback parser.";
const CATEGORIZATION_UNAVAILABLE: &str = "LLM categorization unavailable. Using fallback parser.";

/// Terminal ingestion failures. Everything else degrades.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{0}")]
    UnreadableSource(String),
    #[error("No transactions detected. Try a CSV, JSON, or PDF export from your bank.")]
    NoTransactions,
    #[error("No billable purchases detected after filtering payments.")]
    NoBillablePurchases,
}

impl IngestError {
    /// Message shown to the user; the import made no changes.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// What the user sees after a successful import
#[derive(Debug, Clone, Serialize)]
pub struct StatementSummary {
    pub totals: BucketTotals,
    /// Purchases that fed the totals, payments removed
    pub transactions: Vec<CategorizedTransaction>,
    pub excluded_payments: usize,
    pub source: IngestionSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<StatementPeriod>,
}

/// One pipeline run per file; holds only borrowed collaborators.
pub struct Ingestor<'a> {
    pdf: &'a dyn PdfText,
    oracle: Option<&'a dyn Oracle>,
}

impl<'a> Ingestor<'a> {
    /// Heuristics only until an oracle is attached.
    pub fn new(pdf: &'a dyn PdfText) -> Self {
        Self { pdf, oracle: None }
    }

    pub fn with_oracle(mut self, oracle: &'a dyn Oracle) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Ingest then summarize.
    pub async fn import(&self, file: &StatementFile) -> Result<StatementSummary, IngestError> {
        let result = self.ingest(file).await?;
        summarize(result)
    }

    /// Turn one uploaded file into bucketed transactions.
    pub async fn ingest(&self, file: &StatementFile) -> Result<IngestionResult, IngestError> {
        let kind = file.kind();
        info!(file = %file.name, ?kind, bytes = file.bytes.len(), "ingesting statement");

        match kind {
            FileKind::Text => {
                let txns = parse_statement_text(&file.text());
                info!(count = txns.len(), "heuristic parse complete");
                Ok(IngestionResult {
                    transactions: bucket_all(txns, &Assignments::new()),
                    source: IngestionSource::Heuristic,
                    warning: None,
                })
            }
            FileKind::Pdf => self.ingest_pdf(file).await,
        }
    }

    async fn ingest_pdf(&self, file: &StatementFile) -> Result<IngestionResult, IngestError> {
        let text = self.pdf.extract_text(&file.bytes).map_err(|e| {
            warn!(file = %file.name, error = %e, "PDF text extraction failed");
            IngestError::UnreadableSource(e.to_string())
        })?;

        let mut extraction_error: Option<String> = None;
        let mut txns: Vec<RawTransaction> = match self.oracle {
            Some(oracle) => match extract_transactions(oracle, &text).await {
                Ok(txns) => txns,
                Err(e) => {
                    warn!(error = %e, "oracle extraction failed");
                    extraction_error = Some(e.to_string());
                    Vec::new()
                }
            },
            None => {
                extraction_error = Some("LLM oracle not configured. Using fallback parser.".to_string());
                Vec::new()
            }
        };
        let mut extracted_via_oracle = !txns.is_empty();

        if txns.is_empty() {
            txns = parse_statement_text(&text);
            info!(count = txns.len(), "fell back to heuristic parse of PDF text");
        } else if txns.len() == 1 {
            // A single oracle row often means the statement was collapsed;
            // swapping in heuristic rows counts as a failed extraction
            let heuristic = parse_statement_text(&text);
            if heuristic.len() > txns.len() {
                info!(heuristic = heuristic.len(), "heuristic parse found more rows than the oracle");
                txns = heuristic;
                extracted_via_oracle = false;
            }
        }

        let mut assignments = Assignments::new();
        let mut categorization_error: Option<String> = None;
        if extracted_via_oracle && !txns.is_empty() {
            if let Some(oracle) = self.oracle {
                match categorize_transactions(oracle, &txns).await {
                    Ok(a) => assignments = a,
                    Err(e) => {
                        warn!(error = %e, "oracle categorization failed");
                        categorization_error = Some(e.to_string());
                    }
                }
            }
        }
        let categorized_via_oracle = !assignments.is_empty();

        let (source, warning) = if extracted_via_oracle && categorized_via_oracle {
            (IngestionSource::Llm, None)
        } else if !extracted_via_oracle {
            let warning = extraction_error.unwrap_or_else(|| EXTRACTION_UNAVAILABLE.to_string());
            (IngestionSource::PdfNoLlm, Some(warning))
        } else {
            let warning = categorization_error
                .or(extraction_error)
                .unwrap_or_else(|| CATEGORIZATION_UNAVAILABLE.to_string());
            (IngestionSource::Fallback, Some(warning))
        };

        info!(
            count = txns.len(),
            source = source.as_str(),
            assigned = assignments.len(),
            "PDF ingestion complete"
        );
        Ok(IngestionResult {
            transactions: bucket_all(txns, &assignments),
            source,
            warning,
        })
    }
}

fn bucket_all(txns: Vec<RawTransaction>, assignments: &Assignments) -> Vec<CategorizedTransaction> {
    txns.into_iter()
        .enumerate()
        .map(|(i, transaction)| {
            let bucket: Category = resolve_bucket(&transaction, assignments.get(&i).copied());
            CategorizedTransaction { transaction, bucket }
        })
        .collect()
}

/// Drop payment lines and total the rest per bucket.
pub fn summarize(result: IngestionResult) -> Result<StatementSummary, IngestError> {
    if result.transactions.is_empty() {
        return Err(IngestError::NoTransactions);
    }

    let before = result.transactions.len();
    let purchases: Vec<CategorizedTransaction> = result
        .transactions
        .into_iter()
        .filter(|t| !is_payment(t.transaction.match_text()))
        .collect();
    let excluded_payments = before - purchases.len();

    let mut totals = BucketTotals::new();
    for t in &purchases {
        totals.add(t.bucket, t.transaction.amount);
    }
    if totals.is_empty() {
        return Err(IngestError::NoBillablePurchases);
    }

    info!(
        purchases = purchases.len(),
        excluded_payments,
        total = totals.total(),
        "statement summarized"
    );
    Ok(StatementSummary {
        period: StatementPeriod::from_transactions(purchases.iter().map(|t| &t.transaction)),
        note: result.source.import_note(result.warning.as_deref()),
        totals,
        transactions: purchases,
        excluded_payments,
        source: result.source,
        warning: result.warning,
    })
}
