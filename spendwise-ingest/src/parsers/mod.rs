pub mod category_totals;
pub mod json_records;
pub mod lines;

use serde_json::Value;
use spendwise_core::RawTransaction;
use tracing::debug;

/// Heuristic statement parser: no network, never fails.
///
/// A document that parses as a JSON array or object is read as records and
/// nothing else; anything else is parsed line by line.
pub fn parse_statement_text(text: &str) -> Vec<RawTransaction> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if let Ok(doc) = serde_json::from_str::<Value>(trimmed) {
        if let Some(txns) = json_records::parse_json_records(&doc) {
            debug!(count = txns.len(), "parsed statement as JSON records");
            return txns;
        }
    }

    let txns = lines::parse_lines(trimmed);
    debug!(count = txns.len(), "parsed statement line by line");
    txns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_array_supersedes_lines() {
        let txns = parse_statement_text(r#"[{"description":"Rent","amount":1200}]"#);
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].description, "Rent");
        assert_eq!(txns[0].amount, 1200.0);
    }

    #[test]
    fn test_empty_json_object_yields_nothing() {
        assert!(parse_statement_text("{}").is_empty());
    }

    #[test]
    fn test_json_scalar_falls_through_to_lines() {
        // A bare number is valid JSON but not a statement
        assert!(parse_statement_text("4.50").is_empty());
    }

    #[test]
    fn test_csv_statement() {
        let csv = "\
Date,Description,Amount
01/02/2024,Whole Foods Market,54.21
01/03/2024,Shell Oil 5521,38.00
01/04/2024,AUTOPAY PAYMENT THANK YOU,-500.00
";
        let txns = parse_statement_text(csv);
        assert_eq!(txns.len(), 3);
        assert_eq!(txns[2].amount, -500.0);
    }

    #[test]
    fn test_blank_input() {
        assert!(parse_statement_text("").is_empty());
        assert!(parse_statement_text("  \n\t ").is_empty());
    }
}
