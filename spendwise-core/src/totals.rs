//! Per-bucket spend totals

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::category::Category;

/// Accumulated absolute spend per bucket, iterated in registry order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct BucketTotals(BTreeMap<Category, f64>);

impl BucketTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `abs(amount)` to a bucket. Zero and non-finite amounts are
    /// ignored and report `false`.
    pub fn add(&mut self, bucket: Category, amount: f64) -> bool {
        let amount = amount.abs();
        if !amount.is_finite() || amount == 0.0 {
            return false;
        }
        *self.0.entry(bucket).or_insert(0.0) += amount;
        true
    }

    pub fn get(&self, bucket: Category) -> f64 {
        self.0.get(&bucket).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.0.iter().map(|(c, v)| (*c, *v))
    }

    /// Bucket with the largest total, first in registry order on ties.
    pub fn top(&self) -> Option<(Category, f64)> {
        self.iter()
            .fold(None, |best: Option<(Category, f64)>, (c, v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((c, v)),
            })
    }
}
