use async_trait::async_trait;
use spendwise_core::{Category, IngestionSource};
use spendwise_finance::oracle::prompts::MAX_STATEMENT_CHARS;
use spendwise_finance::oracle::{OracleMode, OracleReply};
use spendwise_finance::{IngestError, Ingestor, Oracle, OracleError, OracleRequest};
use spendwise_ingest::{PdfError, PdfText, StatementFile};
use std::sync::Mutex;

const STATEMENT: &str = "\
ACME CARD STATEMENT
01/02/2024    WHOLE FOODS MARKET    54.21
01/05/2024    UBER TRIP    18.40
01/09/2024    NETFLIX.COM    15.49
";

struct FixedText(String);

impl PdfText for FixedText {
    fn extract_text(&self, _bytes: &[u8]) -> Result<String, PdfError> {
        Ok(self.0.clone())
    }
}

struct BrokenPdf;

impl PdfText for BrokenPdf {
    fn extract_text(&self, _bytes: &[u8]) -> Result<String, PdfError> {
        Err(PdfError::Unreadable("invalid file header".to_string()))
    }
}

type Scripted = Result<String, (u16, String)>;

/// Replies with canned content per mode and records every request.
struct ScriptedOracle {
    extract: Scripted,
    categorize: Scripted,
    requests: Mutex<Vec<OracleRequest>>,
}

impl ScriptedOracle {
    fn new(extract: Scripted, categorize: Scripted) -> Self {
        Self {
            extract,
            categorize,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn modes(&self) -> Vec<OracleMode> {
        self.requests.lock().unwrap().iter().map(|r| r.mode).collect()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn complete(&self, request: &OracleRequest) -> Result<OracleReply, OracleError> {
        self.requests.lock().unwrap().push(request.clone());
        let scripted = match request.mode {
            OracleMode::Extract => &self.extract,
            OracleMode::Categorize => &self.categorize,
        };
        match scripted {
            Ok(content) => Ok(OracleReply {
                content: content.clone(),
                meta: None,
            }),
            Err((status, message)) => Err(OracleError::Status {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

fn pdf_file() -> StatementFile {
    StatementFile::new("statement.pdf", Some("application/pdf".into()), b"%PDF-1.7".to_vec())
}

const THREE_ROWS: &str = r#"Sure! Here you go: {"transactions":[
  {"date":"2024-01-02","description":"WHOLE FOODS MARKET","merchant":"Whole Foods","amount":54.21},
  {"date":"2024-01-05","description":"UBER TRIP","merchant":"Uber","amount":18.40},
  {"date":"2024-01-09","description":"NETFLIX.COM","merchant":"Netflix","amount":15.49}
]}"#;

#[tokio::test]
async fn test_unreadable_pdf_never_falls_back_to_heuristics() {
    let oracle = ScriptedOracle::new(Ok(THREE_ROWS.into()), Ok("{}".into()));
    let ingestor = Ingestor::new(&BrokenPdf).with_oracle(&oracle);

    let err = ingestor.ingest(&pdf_file()).await.unwrap_err();
    assert!(matches!(err, IngestError::UnreadableSource(_)));
    assert!(oracle.modes().is_empty(), "oracle must not be called");
}

#[tokio::test]
async fn test_full_llm_path() {
    let oracle = ScriptedOracle::new(
        Ok(THREE_ROWS.into()),
        // Index 2 left unassigned, index 1 given a label instead of an id
        Ok(r#"{"assignments":[{"idx":0,"bucket":"groceries"},{"idx":1,"bucket":"Mobility"},{"idx":7,"bucket":"joy"}]}"#.into()),
    );
    let pdf = FixedText(STATEMENT.to_string());
    let ingestor = Ingestor::new(&pdf).with_oracle(&oracle);

    let result = ingestor.ingest(&pdf_file()).await.unwrap();
    assert_eq!(result.source, IngestionSource::Llm);
    assert_eq!(result.warning, None);
    assert_eq!(oracle.modes(), vec![OracleMode::Extract, OracleMode::Categorize]);

    let buckets: Vec<_> = result.transactions.iter().map(|t| t.bucket).collect();
    // Netflix had no assignment and is resolved by keyword
    assert_eq!(buckets, vec![Category::Groceries, Category::Mobility, Category::Joy]);
    assert_eq!(result.transactions[0].transaction.merchant.as_deref(), Some("Whole Foods"));
}

#[tokio::test]
async fn test_single_oracle_row_loses_to_larger_heuristic_result() {
    let oracle = ScriptedOracle::new(
        Ok(r#"{"transactions":[{"description":"Statement total","amount":88.10}]}"#.into()),
        Ok(r#"{"assignments":[{"idx":0,"bucket":"other"}]}"#.into()),
    );
    let pdf = FixedText(STATEMENT.to_string());
    let ingestor = Ingestor::new(&pdf).with_oracle(&oracle);

    let result = ingestor.ingest(&pdf_file()).await.unwrap();
    assert_eq!(result.transactions.len(), 3);
    assert_eq!(result.source, IngestionSource::PdfNoLlm);
    assert_eq!(
        result.warning.as_deref(),
        Some("LLM proxy unavailable. Using fallback parser.")
    );
    // Heuristic rows are not sent for oracle categorization
    assert_eq!(oracle.modes(), vec![OracleMode::Extract]);
    assert_eq!(result.transactions[1].bucket, Category::Mobility);
}

#[tokio::test]
async fn test_single_oracle_row_kept_when_heuristics_find_no_more() {
    let oracle = ScriptedOracle::new(
        Ok(r#"{"transactions":[{"description":"Clinic visit","amount":40}]}"#.into()),
        Ok(r#"{"assignments":[{"idx":0,"bucket":"care"}]}"#.into()),
    );
    let pdf = FixedText("Clinic visit 40.00".to_string());
    let ingestor = Ingestor::new(&pdf).with_oracle(&oracle);

    let result = ingestor.ingest(&pdf_file()).await.unwrap();
    assert_eq!(result.transactions.len(), 1);
    assert_eq!(result.source, IngestionSource::Llm);
}

#[tokio::test]
async fn test_oracle_error_degrades_to_heuristics() {
    let oracle = ScriptedOracle::new(Err((500, "upstream exploded".into())), Ok("{}".into()));
    let pdf = FixedText(STATEMENT.to_string());
    let ingestor = Ingestor::new(&pdf).with_oracle(&oracle);

    let result = ingestor.ingest(&pdf_file()).await.unwrap();
    assert_eq!(result.source, IngestionSource::PdfNoLlm);
    assert_eq!(result.transactions.len(), 3);
    let warning = result.warning.unwrap();
    assert!(warning.contains("upstream exploded"));
    assert!(warning.contains("500"));
}

#[tokio::test]
async fn test_unparsable_extraction_is_treated_as_empty() {
    let oracle = ScriptedOracle::new(Ok("I'm sorry, I can't read this.".into()), Ok("{}".into()));
    let pdf = FixedText(STATEMENT.to_string());
    let ingestor = Ingestor::new(&pdf).with_oracle(&oracle);

    let result = ingestor.ingest(&pdf_file()).await.unwrap();
    assert_eq!(result.source, IngestionSource::PdfNoLlm);
    assert_eq!(result.transactions.len(), 3);
    assert!(result.warning.is_some());
}

#[tokio::test]
async fn test_categorization_failure_is_fallback_with_keyword_buckets() {
    let oracle = ScriptedOracle::new(Ok(THREE_ROWS.into()), Err((429, "rate limited".into())));
    let pdf = FixedText(STATEMENT.to_string());
    let ingestor = Ingestor::new(&pdf).with_oracle(&oracle);

    let result = ingestor.ingest(&pdf_file()).await.unwrap();
    assert_eq!(result.source, IngestionSource::Fallback);
    assert!(result.warning.unwrap().contains("rate limited"));
    let buckets: Vec<_> = result.transactions.iter().map(|t| t.bucket).collect();
    assert_eq!(buckets, vec![Category::Groceries, Category::Mobility, Category::Joy]);
}

#[tokio::test]
async fn test_empty_categorization_is_fallback() {
    let oracle = ScriptedOracle::new(Ok(THREE_ROWS.into()), Ok(r#"{"assignments":[{"idx":0,"bucket":"travel"}]}"#.into()));
    let pdf = FixedText(STATEMENT.to_string());
    let ingestor = Ingestor::new(&pdf).with_oracle(&oracle);

    let result = ingestor.ingest(&pdf_file()).await.unwrap();
    assert_eq!(result.source, IngestionSource::Fallback);
    assert_eq!(
        result.warning.as_deref(),
        Some("LLM categorization unavailable. Using fallback parser.")
    );
}

#[tokio::test]
async fn test_pdf_without_oracle() {
    let pdf = FixedText(STATEMENT.to_string());
    let ingestor = Ingestor::new(&pdf);

    let summary = ingestor.import(&pdf_file()).await.unwrap();
    assert_eq!(summary.source, IngestionSource::PdfNoLlm);
    assert!(summary.note.contains("fallback rules"));
    assert_eq!(summary.totals.get(Category::Groceries), 54.21);
}

#[tokio::test]
async fn test_long_statement_is_truncated_for_extraction() {
    let long = format!("{STATEMENT}{}", "x".repeat(MAX_STATEMENT_CHARS * 2));
    let oracle = ScriptedOracle::new(Ok(THREE_ROWS.into()), Ok("{}".into()));
    let pdf = FixedText(long);
    let ingestor = Ingestor::new(&pdf).with_oracle(&oracle);

    ingestor.ingest(&pdf_file()).await.unwrap();
    let requests = oracle.requests.lock().unwrap();
    let sent = requests[0].statement.as_deref().unwrap();
    assert_eq!(sent.chars().count(), MAX_STATEMENT_CHARS);
    assert!(sent.starts_with("ACME CARD STATEMENT"));
}

#[tokio::test]
async fn test_payment_lines_never_reach_totals() {
    let csv = "\
01/02/2024,Whole Foods Market,54.21
01/04/2024,AUTOPAY PAYMENT THANK YOU,-500.00
01/05/2024,AUTOPAY PAYMENT THANK YOU,500.00
01/06/2024,Shell Oil,40.00
";
    let ingestor = Ingestor::new(&BrokenPdf);
    let summary = ingestor
        .import(&StatementFile::new("card.csv", None, csv.as_bytes().to_vec()))
        .await
        .unwrap();

    assert_eq!(summary.source, IngestionSource::Heuristic);
    assert_eq!(summary.excluded_payments, 2);
    assert!((summary.totals.total() - 94.21).abs() < 1e-9);
    assert!(
        summary
            .transactions
            .iter()
            .all(|t| !t.transaction.description.contains("AUTOPAY"))
    );
}

#[tokio::test]
async fn test_only_payments_is_no_billable_purchases() {
    let ingestor = Ingestor::new(&BrokenPdf);
    let file = StatementFile::new("card.csv", None, b"01/04/2024,Autopay payment,-500.00\n".to_vec());
    assert!(matches!(
        ingestor.import(&file).await,
        Err(IngestError::NoBillablePurchases)
    ));
}

#[tokio::test]
async fn test_json_upload_round_trip_to_rent_bucket() {
    let ingestor = Ingestor::new(&BrokenPdf);
    let file = StatementFile::new(
        "export.json",
        Some("application/json".into()),
        br#"[{"description":"Rent","amount":1200}]"#.to_vec(),
    );
    let summary = ingestor.import(&file).await.unwrap();
    assert_eq!(summary.transactions.len(), 1);
    assert_eq!(summary.transactions[0].transaction.amount, 1200.0);
    assert_eq!(summary.transactions[0].bucket, Category::Rent);
    assert_eq!(summary.totals.get(Category::Rent), 1200.0);
}
