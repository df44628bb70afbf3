//! Transaction records from a JSON statement export.
//!
//! Accepted shapes:
//!   [ {record}, ... ]
//!   { "transactions": [ ... ] }  or  { "entries": [ ... ] }
//!   { "<label>": 12.50, "<label>": { record }, ... }

use serde_json::{Map, Value};
use spendwise_core::RawTransaction;
use spendwise_core::fields::{
    RECORD_AMOUNT, RECORD_CATEGORY, RECORD_DATE, RECORD_DESCRIPTION, value_as_number,
};

/// Interpret a parsed JSON document as transactions.
///
/// Returns `None` for scalars, which carry no transactions and should be
/// parsed as plain text instead.
pub fn parse_json_records(doc: &Value) -> Option<Vec<RawTransaction>> {
    match doc {
        Value::Array(items) => Some(consume_all(items)),
        Value::Object(map) => {
            if let Some(Value::Array(items)) = map.get("transactions") {
                return Some(consume_all(items));
            }
            if let Some(Value::Array(items)) = map.get("entries") {
                return Some(consume_all(items));
            }
            Some(
                map.iter()
                    .filter_map(|(key, value)| match value {
                        Value::Object(record) => record_to_transaction(record, Some(key)),
                        other => keyed_amount(key, other),
                    })
                    .collect(),
            )
        }
        _ => None,
    }
}

fn consume_all(items: &[Value]) -> Vec<RawTransaction> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(record) => record_to_transaction(record, None),
            _ => None,
        })
        .collect()
}

/// `key` stands in for a missing description and category.
fn record_to_transaction(record: &Map<String, Value>, key: Option<&str>) -> Option<RawTransaction> {
    let amount = RECORD_AMOUNT.number(record)?;
    if amount == 0.0 {
        return None;
    }
    let description = RECORD_DESCRIPTION
        .text(record)
        .or_else(|| key.map(str::to_string))?;
    let hint = RECORD_CATEGORY
        .text(record)
        .or_else(|| key.map(str::to_string));

    Some(
        RawTransaction::new(RECORD_DATE.text(record), description.trim(), amount)
            .with_category_hint(hint),
    )
}

fn keyed_amount(key: &str, value: &Value) -> Option<RawTransaction> {
    let amount = value_as_number(value).filter(|a| *a != 0.0)?;
    let description = key.trim();
    if description.is_empty() {
        return None;
    }
    Some(RawTransaction::new(None, description, amount).with_category_hint(Some(key.to_string())))
}
