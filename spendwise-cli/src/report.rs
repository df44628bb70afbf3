use spendwise_core::{BucketTotals, Category};
use spendwise_finance::StatementSummary;
use spendwise_finance::insights::{average_per_category, breakdown, guidance};

const BAR_WIDTH: u32 = 24;

pub fn print_summary(summary: &StatementSummary, notes: &str) {
    println!("{}", summary.note);
    if let Some(w) = &summary.warning {
        println!("warning: {w}");
    }
    if let Some(p) = &summary.period {
        println!("Period: {} to {}", p.start, p.end);
    }
    println!(
        "{} purchases ({} payment lines excluded) | source={}\n",
        summary.transactions.len(),
        summary.excluded_payments,
        summary.source.as_str()
    );

    print_totals(&summary.totals, notes);

    println!("\nTransactions:");
    for t in &summary.transactions {
        println!(
            "  {:<10} {:<40} {:>10.2}  {}",
            t.transaction.date.as_deref().unwrap_or("-"),
            truncate(t.transaction.match_text(), 40),
            t.transaction.amount,
            t.bucket.id()
        );
    }
}

pub fn print_totals(totals: &BucketTotals, notes: &str) {
    for row in breakdown(totals) {
        let filled = row.percent_of_max * BAR_WIDTH / 100;
        println!(
            "  {:<20} ${:>10.2}  {}",
            row.category.label(),
            row.amount,
            "#".repeat(filled as usize)
        );
    }
    println!(
        "  {:<20} ${:>10.2}  (avg ${:.2} per category)",
        "Total",
        totals.total(),
        average_per_category(totals)
    );

    let lines = guidance(totals, notes);
    if !lines.is_empty() {
        println!("\nGuidance:");
        for line in lines {
            println!("- {line}");
        }
    }
}

pub fn print_categories() {
    for c in Category::ALL {
        let keywords = if c.keywords().is_empty() {
            "(fallback)".to_string()
        } else {
            c.keywords().join(", ")
        };
        println!("{:<10} {:<20} {}", c.id(), c.label(), c.helper());
        println!("{:<10} keywords: {keywords}", "");
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max - 1).collect();
    out.push('~');
    out
}
