//! Import pre-summed category totals from JSON.
//!
//! Unlike statement parsing, every row must name a category; rows whose
//! key does not normalize to a registry entry are ignored.

use serde_json::{Map, Value};
use spendwise_core::fields::{TOTALS_AMOUNT, TOTALS_CATEGORY, value_as_number};
use spendwise_core::{BucketTotals, Category, normalize_category_key};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TotalsImportError {
    #[error("Could not parse that JSON file. Make sure it contains category + amount pairs.")]
    InvalidJson(#[from] serde_json::Error),
    #[error("No matching categories found in JSON.")]
    NoMatchingCategories,
}

pub fn parse_category_totals(text: &str) -> Result<BucketTotals, TotalsImportError> {
    let doc: Value = serde_json::from_str(text.trim())?;
    let mut totals = BucketTotals::new();

    let rows: Vec<(Option<Category>, Option<f64>)> = match &doc {
        Value::Array(items) => items.iter().filter_map(Value::as_object).map(row).collect(),
        Value::Object(map) => match map.get("entries") {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).map(row).collect(),
            _ => map
                .iter()
                .map(|(key, value)| match value {
                    Value::Object(record) => (
                        TOTALS_CATEGORY
                            .text(record)
                            .and_then(|k| normalize_category_key(&k))
                            .or_else(|| normalize_category_key(key)),
                        TOTALS_AMOUNT.number(record),
                    ),
                    other => (normalize_category_key(key), value_as_number(other)),
                })
                .collect(),
        },
        _ => Vec::new(),
    };

    for (category, amount) in rows {
        if let (Some(category), Some(amount)) = (category, amount) {
            totals.add(category, amount);
        }
    }

    if totals.is_empty() {
        return Err(TotalsImportError::NoMatchingCategories);
    }
    Ok(totals)
}

fn row(record: &Map<String, Value>) -> (Option<Category>, Option<f64>) {
    (
        TOTALS_CATEGORY
            .text(record)
            .and_then(|k| normalize_category_key(&k)),
        TOTALS_AMOUNT.number(record),
    )
}
