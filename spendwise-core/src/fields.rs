//! Named field accessors for loosely-shaped JSON records.
//!
//! Statements and oracle replies name the same concept differently
//! (`amount` vs `value` vs `total`). Each accessor lists the accepted keys
//! in priority order; the first key holding a usable value wins.

use serde_json::{Map, Value};

/// An ordered list of JSON keys that all mean the same thing.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub keys: &'static [&'static str],
}

/// Description of a record in an uploaded JSON statement.
pub const RECORD_DESCRIPTION: Field = Field {
    name: "description",
    keys: &["description", "merchant", "label", "name"],
};

/// Amount of a record in an uploaded JSON statement.
pub const RECORD_AMOUNT: Field = Field {
    name: "amount",
    keys: &["amount", "value", "total"],
};

pub const RECORD_DATE: Field = Field {
    name: "date",
    keys: &["date", "postedAt", "posted_at"],
};

/// Pre-existing category label carried by structured input.
pub const RECORD_CATEGORY: Field = Field {
    name: "category",
    keys: &["category", "id"],
};

/// Oracle `extract` reply fields.
pub const LLM_DESCRIPTION: Field = Field {
    name: "description",
    keys: &["description", "summary", "merchant", "label"],
};

pub const LLM_MERCHANT: Field = Field {
    name: "merchant",
    keys: &["merchant", "vendor", "payee"],
};

pub const LLM_AMOUNT: Field = Field {
    name: "amount",
    keys: &["amount", "value", "total", "debit", "credit"],
};

pub const LLM_DATE: Field = Field {
    name: "date",
    keys: &["date", "posted_at", "postedAt"],
};

/// Oracle `categorize` reply fields.
pub const ASSIGNMENT_INDEX: Field = Field {
    name: "idx",
    keys: &["idx", "index", "id", "transaction_index"],
};

pub const ASSIGNMENT_BUCKET: Field = Field {
    name: "bucket",
    keys: &["bucket", "category", "name", "id"],
};

/// Category totals import: which category a row belongs to.
pub const TOTALS_CATEGORY: Field = Field {
    name: "category",
    keys: &["id", "category", "label"],
};

pub const TOTALS_AMOUNT: Field = Field {
    name: "amount",
    keys: &["amount", "value"],
};

impl Field {
    /// First non-empty string under any of the keys.
    ///
    /// Numbers are rendered so that `"id": 3` still reads as a label.
    pub fn text(&self, record: &Map<String, Value>) -> Option<String> {
        self.keys.iter().find_map(|k| match record.get(*k)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    /// First value under any of the keys that reads as a finite number.
    pub fn number(&self, record: &Map<String, Value>) -> Option<f64> {
        self.keys
            .iter()
            .find_map(|k| record.get(*k).and_then(value_as_number))
    }

    /// First non-negative integer under any of the keys.
    pub fn index(&self, record: &Map<String, Value>) -> Option<usize> {
        self.keys.iter().find_map(|k| match record.get(*k)? {
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    return usize::try_from(u).ok();
                }
                let f = n.as_f64()?;
                (f >= 0.0 && f.fract() == 0.0).then_some(f as usize)
            }
            Value::String(s) => s.trim().parse::<usize>().ok(),
            _ => None,
        })
    }
}

/// Read a JSON value as an amount: numbers as-is, strings after dropping
/// currency symbols, thousands separators and whitespace.
pub fn value_as_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            if cleaned.is_empty() {
                None
            } else {
                cleaned.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}
