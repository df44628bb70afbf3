//! Budget categories (buckets) and alias normalization

use serde::{Deserialize, Serialize};

/// Budget buckets a transaction can land in.
///
/// Declaration order is registry order: keyword matching walks the
/// variants top to bottom and totals are reported in this order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[serde(rename = "groceries")]
    Groceries,
    #[serde(rename = "rent")]
    Rent,
    #[serde(rename = "mobility")]
    Mobility,
    #[serde(rename = "care")]
    Care,
    #[serde(rename = "joy")]
    Joy,
    #[serde(rename = "other")]
    Other,
}

impl Category {
    /// Every category in registry order, `Other` last.
    pub const ALL: [Category; 6] = [
        Category::Groceries,
        Category::Rent,
        Category::Mobility,
        Category::Care,
        Category::Joy,
        Category::Other,
    ];

    /// Stable key used in oracle prompts and serialized output
    pub fn id(&self) -> &'static str {
        match self {
            Category::Groceries => "groceries",
            Category::Rent => "rent",
            Category::Mobility => "mobility",
            Category::Care => "care",
            Category::Joy => "joy",
            Category::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Groceries => "Groceries",
            Category::Rent => "Rent or housing",
            Category::Mobility => "Mobility",
            Category::Care => "Care & wellness",
            Category::Joy => "Joy & experiments",
            Category::Other => "Other",
        }
    }

    pub fn helper(&self) -> &'static str {
        match self {
            Category::Groceries => "Fresh food, markets, bulk staples",
            Category::Rent => "Mortgage, utilities, repairs",
            Category::Mobility => "Transit passes, rideshare, bike tune ups",
            Category::Care => "Medical, childcare, community care",
            Category::Joy => "Entertainment, creative sprints, hobbies",
            Category::Other => "Unmatched items or anything miscellaneous",
        }
    }

    /// Lower-case substrings that route a description into this bucket.
    /// `Other` is the default and never a keyword target.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::Groceries => &["market", "grocery", "whole foods", "trader joe", "aldi", "sprouts"],
            Category::Rent => &["rent", "landlord", "mortgage", "lease"],
            Category::Mobility => &["uber", "lyft", "metro", "bus", "train", "fuel", "gas", "shell"],
            Category::Care => &["clinic", "pharmacy", "hospital", "care", "therapy"],
            Category::Joy => &["cinema", "netflix", "spotify", "cafe", "coffee", "restaurant", "music"],
            Category::Other => &[],
        }
    }

    /// Categories the oracle may assign; `Other` is implied.
    pub fn assignable() -> impl Iterator<Item = Category> {
        Self::ALL.into_iter().filter(|c| *c != Category::Other)
    }
}

fn letters_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_alphabetic()).collect()
}

/// Resolve a free-form category key to a registry entry.
///
/// Tries, in order: exact id, case-insensitive label, and the label with
/// every non-letter stripped. Returns `None` when nothing matches; callers
/// pick their own default.
pub fn normalize_category_key(raw: &str) -> Option<Category> {
    let key = raw.trim().to_lowercase();
    if key.is_empty() {
        return None;
    }

    if let Some(c) = Category::ALL.into_iter().find(|c| c.id() == key) {
        return Some(c);
    }
    if let Some(c) = Category::ALL
        .into_iter()
        .find(|c| c.label().to_lowercase() == key)
    {
        return Some(c);
    }

    let cleaned = letters_only(&key);
    if cleaned.is_empty() {
        return None;
    }
    Category::ALL
        .into_iter()
        .find(|c| letters_only(&c.label().to_lowercase()) == cleaned)
}
