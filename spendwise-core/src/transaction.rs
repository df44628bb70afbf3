//! Transaction records produced by statement ingestion

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::category::Category;

/// A transaction as read from a statement, before bucketing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawTransaction {
    /// Free-form date exactly as it appeared in the source
    pub date: Option<String>,
    /// Human-readable description, never empty
    pub description: String,
    /// Positive = charge, negative = refund/credit. Never zero.
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
    /// Category label supplied by structured input, not yet normalized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_hint: Option<String>,
}

impl RawTransaction {
    pub fn new(date: Option<String>, description: impl Into<String>, amount: f64) -> Self {
        Self {
            date: date.filter(|d| !d.trim().is_empty()),
            description: description.into(),
            amount,
            merchant: None,
            category_hint: None,
        }
    }

    pub fn with_category_hint(mut self, hint: Option<String>) -> Self {
        self.category_hint = hint.filter(|h| !h.trim().is_empty());
        self
    }

    pub fn with_merchant(mut self, merchant: Option<String>) -> Self {
        self.merchant = merchant.filter(|m| !m.trim().is_empty());
        self
    }

    /// Text used for keyword matching and payment detection.
    pub fn match_text(&self) -> &str {
        if self.description.trim().is_empty() {
            self.merchant.as_deref().unwrap_or("")
        } else {
            &self.description
        }
    }

    /// Best-effort calendar date for the free-form `date` field.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_statement_date(self.date.as_deref()?)
    }
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%m-%d-%y", "%m-%d-%Y", "%Y/%m/%d", "%d/%m/%Y",
];

/// Parse the date shapes statements commonly use. US month-first wins
/// when a date is ambiguous; two-digit years are tried before four.
pub fn parse_statement_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// A transaction with its final bucket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategorizedTransaction {
    #[serde(flatten)]
    pub transaction: RawTransaction,
    pub bucket: Category,
}

/// Which stage produced the final transaction set
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IngestionSource {
    /// Text/CSV/JSON upload parsed locally
    #[serde(rename = "heuristic")]
    Heuristic,
    /// PDF extracted and categorized by the oracle
    #[serde(rename = "llm")]
    Llm,
    /// Oracle extraction worked but a later stage fell back
    #[serde(rename = "fallback")]
    Fallback,
    /// PDF parsed without usable oracle extraction
    #[serde(rename = "pdf-no-llm")]
    PdfNoLlm,
}

impl IngestionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestionSource::Heuristic => "heuristic",
            IngestionSource::Llm => "llm",
            IngestionSource::Fallback => "fallback",
            IngestionSource::PdfNoLlm => "pdf-no-llm",
        }
    }

    /// Note shown to the user after an import.
    pub fn import_note(&self, warning: Option<&str>) -> String {
        match (self, warning) {
            (IngestionSource::Llm, _) => {
                "PDF statement parsed and categorized with your LLM. Totals auto-filled below.".to_string()
            }
            (IngestionSource::PdfNoLlm, _) => {
                "PDF parsed with fallback rules. Add your LLM API key for richer extraction.".to_string()
            }
            (IngestionSource::Fallback, Some(w)) => {
                format!("Used fallback parser after LLM error ({w}). Numbers are ready to review.")
            }
            _ => "Credit card bill parsed. Numbers are ready to review.".to_string(),
        }
    }
}

/// Output of one ingestion run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestionResult {
    pub transactions: Vec<CategorizedTransaction>,
    pub source: IngestionSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Earliest and latest parseable dates in a statement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatementPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl StatementPeriod {
    pub fn from_transactions<'a>(txns: impl IntoIterator<Item = &'a RawTransaction>) -> Option<Self> {
        let mut dates = txns.into_iter().filter_map(|t| t.parsed_date());
        let first = dates.next()?;
        let (start, end) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(Self { start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_drops_blank_date() {
        let t = RawTransaction::new(Some("  ".into()), "Coffee", 4.5);
        assert_eq!(t.date, None);
        let t = RawTransaction::new(Some("01/05/2024".into()), "Coffee", 4.5);
        assert_eq!(t.date.as_deref(), Some("01/05/2024"));
    }

    #[test]
    fn test_parse_statement_date_formats() {
        let jan5 = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(parse_statement_date("2024-01-05"), Some(jan5));
        assert_eq!(parse_statement_date("01/05/2024"), Some(jan5));
        assert_eq!(parse_statement_date("01/05/24"), Some(jan5));
        assert_eq!(parse_statement_date("Jan 5"), None);
    }

    #[test]
    fn test_statement_period() {
        let txns = vec![
            RawTransaction::new(Some("03/02/2024".into()), "A", 1.0),
            RawTransaction::new(None, "B", 2.0),
            RawTransaction::new(Some("02/28/2024".into()), "C", 3.0),
            RawTransaction::new(Some("garbage".into()), "D", 4.0),
        ];
        let period = StatementPeriod::from_transactions(&txns).unwrap();
        assert_eq!(period.start, NaiveDate::from_ymd_opt(2024, 2, 28).unwrap());
        assert_eq!(period.end, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());

        assert!(StatementPeriod::from_transactions(&txns[1..2]).is_none());
    }

    #[test]
    fn test_categorized_serializes_flat() {
        let t = CategorizedTransaction {
            transaction: RawTransaction::new(None, "Lyft", 12.0),
            bucket: Category::Mobility,
        };
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["description"], "Lyft");
        assert_eq!(v["bucket"], "mobility");
        assert!(v.get("merchant").is_none());
    }

    #[test]
    fn test_import_notes() {
        assert!(IngestionSource::Llm.import_note(None).contains("categorized with your LLM"));
        assert!(
            IngestionSource::Fallback
                .import_note(Some("proxy down"))
                .contains("(proxy down)")
        );
        assert_eq!(
            IngestionSource::Heuristic.import_note(None),
            "Credit card bill parsed. Numbers are ready to review."
        );
    }
}
