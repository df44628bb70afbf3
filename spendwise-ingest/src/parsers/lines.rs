//! Line-oriented statement parser for CSV exports and extracted PDF text.
//!
//! Each line is tried as:
//!   1. comma / tab / semicolon separated tokens
//!   2. tokens separated by runs of two or more spaces
//!   3. free text with the rightmost `1,234.56`-style number as the amount
//!
//! Lines that match none of these are skipped.

use regex::Regex;
use spendwise_core::RawTransaction;
use std::sync::LazyLock;

static DELIMITERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,\t;]").expect("static regex"));
static WIDE_GAP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").expect("static regex"));
static MONEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d[\d,]*\.\d{2}").expect("static regex"));
static DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}[/-]\d{1,2}[/-]\d{2,4}").expect("static regex"));
static DATE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b").expect("static regex"));

/// Parse every recognizable transaction line in `text`.
pub fn parse_lines(text: &str) -> Vec<RawTransaction> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter_map(parse_line)
        .collect()
}

/// Parse one trimmed line, first successful strategy wins.
pub fn parse_line(line: &str) -> Option<RawTransaction> {
    let delimited = split_tokens(&DELIMITERS, line);
    if delimited.len() >= 2 {
        if let Some(txn) = transaction_from_tokens(&delimited) {
            return Some(txn);
        }
    }

    let spaced = split_tokens(&WIDE_GAP, line);
    if spaced.len() >= 2 {
        if let Some(txn) = transaction_from_tokens(&spaced) {
            return Some(txn);
        }
    }

    transaction_from_free_text(line)
}

fn split_tokens<'a>(re: &Regex, line: &'a str) -> Vec<&'a str> {
    re.split(line).map(str::trim).filter(|t| !t.is_empty()).collect()
}

/// Keep digits, `.` and `-`, then parse. Empty or malformed → `None`.
fn token_amount(token: &str) -> Option<f64> {
    let cleaned: String = token
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|a| a.is_finite())
}

/// Build a transaction from split tokens. The last numeric token is the
/// amount; a date-shaped first token becomes the date; the rest is the
/// description.
pub fn transaction_from_tokens(tokens: &[&str]) -> Option<RawTransaction> {
    if tokens.len() < 2 {
        return None;
    }

    let (amount_idx, amount) = tokens
        .iter()
        .enumerate()
        .rev()
        .find_map(|(i, t)| token_amount(t).map(|a| (i, a)))?;
    if amount == 0.0 {
        return None;
    }

    let mut remaining: Vec<&str> = tokens
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != amount_idx)
        .map(|(_, t)| *t)
        .collect();
    if remaining.is_empty() {
        return None;
    }

    let mut date = None;
    if DATE_SHAPE.is_match(remaining[0]) {
        date = Some(remaining.remove(0).to_string());
    }

    let description = remaining.join(" ").trim().to_string();
    if description.is_empty() {
        return None;
    }

    Some(RawTransaction::new(date, description, amount))
}

/// Regex fallback for lines with no usable separators.
pub fn transaction_from_free_text(line: &str) -> Option<RawTransaction> {
    let last = MONEY.find_iter(line).last()?;
    let amount: f64 = last.as_str().replace(',', "").parse().ok()?;
    if amount == 0.0 || !amount.is_finite() {
        return None;
    }

    let without_amount = format!("{}{}", &line[..last.start()], &line[last.end()..]);
    let without_amount = without_amount.trim();
    if without_amount.is_empty() {
        return None;
    }

    let (date, description) = match DATE_WORD.find(without_amount) {
        Some(m) => {
            let rest = format!("{}{}", &without_amount[..m.start()], &without_amount[m.end()..]);
            (Some(m.as_str().to_string()), rest.trim().to_string())
        }
        None => (None, without_amount.to_string()),
    };
    if description.is_empty() {
        return None;
    }

    Some(RawTransaction::new(date, description, amount))
}
