use anyhow::{Context, Result};
use serde::Serialize;
use spendwise_core::CategorizedTransaction;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    date: &'a str,
    description: &'a str,
    amount: String,
    bucket: &'static str,
}

/// Write `date,description,amount,bucket` rows with a header.
pub fn write_transactions<W: Write>(out: W, txns: &[CategorizedTransaction]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for t in txns {
        wtr.serialize(ExportRow {
            date: t.transaction.date.as_deref().unwrap_or(""),
            description: &t.transaction.description,
            amount: format!("{:.2}", t.transaction.amount),
            bucket: t.bucket.id(),
        })
        .context("write CSV row")?;
    }
    wtr.flush().context("flush CSV")?;
    Ok(())
}

pub fn export_to_path(path: &Path, txns: &[CategorizedTransaction]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_transactions(file, txns).with_context(|| format!("export {}", path.display()))
}
