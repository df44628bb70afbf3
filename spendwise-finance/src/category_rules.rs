//! Deterministic bucket rules and the payment-noise filter.
//!
//! Priority: oracle assignment > category hint from the source > keyword
//! match on the description > `Other`.

use spendwise_core::{Category, RawTransaction, normalize_category_key};

/// Bill settlements rather than purchases; never counted as spend.
pub const PAYMENT_PHRASES: &[&str] = &[
    "full balance",
    "directpay",
    "autopay",
    "auto pay",
    "payment thank you",
    "thank you payment",
    "credit payment",
    "bill payment",
    "statement payment",
    "balance transfer",
    "autopayment",
    "payment - thank you",
];

/// First category, in registry order, with a keyword contained in `text`.
pub fn categorize_description(text: &str) -> Option<Category> {
    let normalized = text.to_lowercase();
    if normalized.trim().is_empty() {
        return None;
    }
    Category::ALL
        .into_iter()
        .find(|c| c.keywords().iter().any(|k| normalized.contains(k)))
}

/// Final bucket for a transaction.
pub fn resolve_bucket(txn: &RawTransaction, assigned: Option<Category>) -> Category {
    assigned
        .or_else(|| txn.category_hint.as_deref().and_then(normalize_category_key))
        .or_else(|| categorize_description(txn.match_text()))
        .unwrap_or(Category::Other)
}

pub fn is_payment(description: &str) -> bool {
    let normalized = description.to_lowercase();
    PAYMENT_PHRASES.iter().any(|p| normalized.contains(p))
}
