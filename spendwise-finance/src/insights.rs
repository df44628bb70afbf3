//! Spending breakdown and plain-language guidance for a set of totals.

use serde::Serialize;
use spendwise_core::{BucketTotals, Category};

/// One bar of the summary dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownRow {
    pub category: Category,
    pub amount: f64,
    /// Share of the largest bucket, 0-100
    pub percent_of_max: u32,
}

/// Every registry category with its amount, scaled against the largest.
pub fn breakdown(totals: &BucketTotals) -> Vec<BreakdownRow> {
    let max = Category::ALL
        .into_iter()
        .map(|c| totals.get(c))
        .fold(1.0_f64, f64::max);
    Category::ALL
        .into_iter()
        .map(|category| {
            let amount = totals.get(category);
            BreakdownRow {
                category,
                amount,
                percent_of_max: ((amount / max) * 100.0).round() as u32,
            }
        })
        .collect()
}

/// Average spend per registry category.
pub fn average_per_category(totals: &BucketTotals) -> f64 {
    totals.total() / Category::ALL.len() as f64
}

/// Guidance lines for the summary view.
pub fn guidance(totals: &BucketTotals, notes: &str) -> Vec<String> {
    if totals.is_empty() {
        return Vec::new();
    }
    let total = totals.total();
    let mut out = Vec::new();

    if let Some((top, amount)) = totals.top() {
        if amount > total * 0.45 {
            out.push(format!(
                "Focus on {}: it absorbs nearly half of your budget. Set a soft guardrail before the next cycle.",
                top.label()
            ));
        }
    }

    let idle: Vec<&str> = Category::ALL
        .into_iter()
        .filter(|c| totals.get(*c) == 0.0)
        .map(|c| c.label())
        .collect();
    if !idle.is_empty() {
        out.push(format!(
            "No activity in {}. Prune unused buckets to keep the story tight.",
            idle.join(", ")
        ));
    }

    if totals.get(Category::Joy) < total * 0.05 {
        out.push("Your Joy fund is under 5%. Add a little breathing room to avoid burnout.".to_string());
    }

    if notes.trim().chars().count() > 12 {
        out.push("Notes captured - convert them into calendar nudges or reminders.".to_string());
    }

    if out.is_empty() {
        out.push("Distribution looks balanced. Celebrate the win and schedule the next check-in.".to_string());
    }
    out
}
