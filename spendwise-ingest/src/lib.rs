//! spendwise-ingest: statement ingestion (CSV/JSON/text parsing, PDF text).

pub mod parsers;
pub mod pdf;
pub mod types;

pub use parsers::category_totals::{TotalsImportError, parse_category_totals};
pub use parsers::parse_statement_text;
pub use pdf::{PdfError, PdfText, PdfTextExtractor};
pub use types::{FileKind, StatementFile};
