//! LLM-assisted extraction and categorization.
//!
//! Oracle replies are parsed as JSON, or failing that, the first balanced
//! `{...}` / `[...]` span in the reply. Unusable replies become empty
//! results; only transport and status failures are errors.

use serde_json::{Map, Value};
use spendwise_core::fields::{
    ASSIGNMENT_BUCKET, ASSIGNMENT_INDEX, LLM_AMOUNT, LLM_DATE, LLM_DESCRIPTION, LLM_MERCHANT,
};
use spendwise_core::{Category, RawTransaction, normalize_category_key};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::oracle::prompts::truncate_statement;
use crate::oracle::{Oracle, OracleError, OracleRequest};

/// Oracle-assigned buckets keyed by transaction index.
pub type Assignments = BTreeMap<usize, Category>;

/// Ask the oracle for every transaction row in `statement`.
pub async fn extract_transactions(
    oracle: &dyn Oracle,
    statement: &str,
) -> Result<Vec<RawTransaction>, OracleError> {
    let snippet = truncate_statement(statement);
    if snippet.len() < statement.len() {
        debug!(chars = statement.chars().count(), "statement truncated for extraction");
    }

    let reply = oracle.complete(&OracleRequest::extract(snippet)).await?;
    let Some(doc) = parse_reply_json(&reply.content) else {
        warn!(chars = reply.content.len(), "extraction reply held no usable JSON");
        return Ok(Vec::new());
    };

    let txns = normalize_extracted(&doc);
    info!(count = txns.len(), "oracle extracted transactions");
    Ok(txns)
}

/// Ask the oracle to bucket `transactions`; indices refer to that slice.
pub async fn categorize_transactions(
    oracle: &dyn Oracle,
    transactions: &[RawTransaction],
) -> Result<Assignments, OracleError> {
    if transactions.is_empty() {
        return Ok(Assignments::new());
    }

    let reply = oracle
        .complete(&OracleRequest::categorize(transactions))
        .await?;
    let Some(doc) = parse_reply_json(&reply.content) else {
        warn!(chars = reply.content.len(), "categorization reply held no usable JSON");
        return Ok(Assignments::new());
    };

    let assignments = normalize_assignments(&doc);
    info!(
        assigned = assignments.len(),
        total = transactions.len(),
        "oracle categorized transactions"
    );
    Ok(assignments)
}

/// Parse reply text directly, then via the bracket-matching repair.
pub fn parse_reply_json(content: &str) -> Option<Value> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(v) = serde_json::from_str(trimmed) {
        return Some(v);
    }

    let mut openers: Vec<(usize, char)> = ['{', '[']
        .into_iter()
        .filter_map(|open| trimmed.find(open).map(|pos| (pos, open)))
        .collect();
    openers.sort();

    openers
        .into_iter()
        .filter_map(|(_, open)| balanced_span(trimmed, open))
        .find_map(|span| serde_json::from_str(span).ok())
}

/// The first balanced span opening with `open`, ignoring brackets inside
/// JSON strings.
pub fn balanced_span(s: &str, open: char) -> Option<&str> {
    let start = s.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in s[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&s[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

fn records<'a>(doc: &'a Value, wrappers: &[&str]) -> Vec<&'a Map<String, Value>> {
    let items = match doc {
        Value::Array(items) => Some(items),
        Value::Object(map) => wrappers.iter().find_map(|w| map.get(*w)?.as_array()),
        _ => None,
    };
    items
        .map(|items| items.iter().filter_map(Value::as_object).collect())
        .unwrap_or_default()
}

/// Rows with a description and a non-zero amount.
pub fn normalize_extracted(doc: &Value) -> Vec<RawTransaction> {
    records(doc, &["transactions"])
        .into_iter()
        .filter_map(|rec| {
            let description = LLM_DESCRIPTION.text(rec)?;
            let amount = LLM_AMOUNT.number(rec).filter(|a| *a != 0.0)?;
            Some(
                RawTransaction::new(LLM_DATE.text(rec), description, amount)
                    .with_merchant(LLM_MERCHANT.text(rec)),
            )
        })
        .collect()
}

/// Assignments with a valid index and a bucket the registry recognizes.
pub fn normalize_assignments(doc: &Value) -> Assignments {
    records(doc, &["assignments", "transactions"])
        .into_iter()
        .filter_map(|rec| {
            let idx = ASSIGNMENT_INDEX.index(rec)?;
            let bucket = ASSIGNMENT_BUCKET
                .text(rec)
                .and_then(|b| normalize_category_key(&b))?;
            Some((idx, bucket))
        })
        .collect()
}
