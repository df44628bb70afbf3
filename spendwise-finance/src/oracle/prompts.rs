//! Chat messages for the two oracle modes.

use serde::{Deserialize, Serialize};

use super::{CategoryEntry, OracleMode, OracleRequest, TransactionLine};

/// Statements longer than this are cut, not chunked.
pub const MAX_STATEMENT_CHARS: usize = 18_000;

const EXTRACT_SYSTEM: &str = concat!(
    "You are a financial data parser. Return strictly minified JSON with this shape: ",
    r#"{"transactions":[{"date":"YYYY-MM-DD","description":"string","merchant":"string","amount":123.45}]}"#,
);

const CATEGORIZE_SYSTEM: &str = concat!(
    "You map transactions to budgeting categories. Respond with strictly minified JSON shaped as ",
    r#"{"assignments":[{"idx":0,"bucket":"groceries"}]}. "#,
    "Only use category IDs from the list provided by the user.",
);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// First `MAX_STATEMENT_CHARS` characters of a statement.
pub fn truncate_statement(statement: &str) -> &str {
    match statement.char_indices().nth(MAX_STATEMENT_CHARS) {
        Some((byte_idx, _)) => &statement[..byte_idx],
        None => statement,
    }
}

pub fn extract_messages(statement: &str) -> Vec<ChatMessage> {
    let snippet = truncate_statement(statement);
    vec![
        ChatMessage::system(EXTRACT_SYSTEM),
        ChatMessage::user(format!(
            "Extract every transaction row (date, description, merchant, amount) from the following credit card statement text. \
             Group refunds or credits as negative numbers. If a field is missing, leave it blank. \
             Do NOT add categories. Statement text:\n\"\"\"\n{snippet}\n\"\"\""
        )),
    ]
}

pub fn categorize_messages(categories: &[CategoryEntry], transactions: &[TransactionLine]) -> Vec<ChatMessage> {
    let category_lines = categories
        .iter()
        .filter(|c| c.id != "other")
        .map(|c| format!("{}: {} ({})", c.id, c.label, c.helper))
        .collect::<Vec<_>>()
        .join("\n");

    let transaction_lines = transactions
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let description = if t.description.is_empty() { "Unknown" } else { &t.description };
            let date = if t.date.is_empty() { "n/a" } else { &t.date };
            format!("{i}. {description} | amount: {:.2} | date: {date}", t.amount)
        })
        .collect::<Vec<_>>()
        .join("\n");

    vec![
        ChatMessage::system(CATEGORIZE_SYSTEM),
        ChatMessage::user(format!(
            "Possible categories:\n{category_lines}\n\nTransactions:\n{transaction_lines}\n\nReturn JSON only."
        )),
    ]
}

/// Messages for a validated request.
pub fn messages_for(request: &OracleRequest) -> Vec<ChatMessage> {
    match request.mode {
        OracleMode::Extract => extract_messages(request.statement.as_deref().unwrap_or_default()),
        OracleMode::Categorize => categorize_messages(
            request.categories.as_deref().unwrap_or_default(),
            request.transactions.as_deref().unwrap_or_default(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spendwise_core::{Category, RawTransaction};

    #[test]
    fn test_truncate_statement_counts_chars() {
        let long = "é".repeat(MAX_STATEMENT_CHARS + 10);
        let cut = truncate_statement(&long);
        assert_eq!(cut.chars().count(), MAX_STATEMENT_CHARS);

        assert_eq!(truncate_statement("short"), "short");
    }

    #[test]
    fn test_extract_prompt_quotes_statement() {
        let msgs = extract_messages("01/02 Coffee 4.50");
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, "system");
        assert!(msgs[0].content.contains(r#"{"transactions":["#));
        assert!(msgs[1].content.contains("\"\"\"\n01/02 Coffee 4.50\n\"\"\""));
        assert!(msgs[1].content.contains("negative numbers"));
        assert!(msgs[1].content.contains("Do NOT add categories"));
    }

    #[test]
    fn test_categorize_prompt_lists_categories_and_rows() {
        let request = OracleRequest::categorize(&[
            RawTransaction::new(Some("01/02/2024".into()), "Whole Foods", 54.2),
            RawTransaction::new(None, "Refund", -5.0),
        ]);
        let msgs = messages_for(&request);
        let user = &msgs[1].content;

        assert!(user.contains("groceries: Groceries (Fresh food, markets, bulk staples)"));
        assert!(!user.contains("other: Other"));
        assert!(user.contains("0. Whole Foods | amount: 54.20 | date: 01/02/2024"));
        assert!(user.contains("1. Refund | amount: -5.00 | date: n/a"));
        assert!(msgs[0].content.contains(r#"{"assignments":[{"idx":0,"bucket":"groceries"}]}"#));
        assert_eq!(Category::assignable().count(), user.lines().filter(|l| l.contains(" (")).count());
    }
}
