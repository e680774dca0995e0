//! Ledger Statistics
//!
//! Status and category counters over a listing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Category, Record, RecordStatus};

/// Aggregate counters over a set of records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    /// Records visible in the listing
    pub total: usize,
    /// Pending records
    pub pending: usize,
    /// Processed records
    pub processed: usize,
    /// Rejected records
    pub rejected: usize,
    /// Count per category; every category is present
    pub by_category: BTreeMap<Category, usize>,
}

impl LedgerStats {
    /// Compute counters for a listing
    pub fn from_records(records: &[Record]) -> Self {
        let mut stats = Self {
            total: records.len(),
            by_category: Category::ALL.iter().map(|c| (*c, 0)).collect(),
            ..Default::default()
        };

        for record in records {
            match record.status {
                RecordStatus::Pending => stats.pending += 1,
                RecordStatus::Processed => stats.processed += 1,
                RecordStatus::Rejected => stats.rejected += 1,
            }
            *stats.by_category.entry(record.category).or_insert(0) += 1;
        }

        stats
    }

    /// Share of records in a status, in percent
    pub fn status_share(&self, status: RecordStatus) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let count = match status {
            RecordStatus::Pending => self.pending,
            RecordStatus::Processed => self.processed,
            RecordStatus::Rejected => self.rejected,
        };
        count as f64 * 100.0 / self.total as f64
    }
}
