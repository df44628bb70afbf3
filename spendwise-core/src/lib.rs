//! spendwise-core: budget categories, transaction types and bucket totals

pub mod category;
pub mod fields;
pub mod totals;
pub mod transaction;

pub use category::{Category, normalize_category_key};
pub use totals::BucketTotals;
pub use transaction::{
    CategorizedTransaction, IngestionResult, IngestionSource, RawTransaction, StatementPeriod,
    parse_statement_date,
};
