//! Pure derived-state helpers.
//!
//! Everything here is synchronous and side-effect free: filtering, display
//! ordering, aggregate statistics, and per-product price history over an
//! in-memory record set.

use crate::models::{PackageRecord, Product, Status};
use chrono::{DateTime, Utc};

/// Status filter for list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    fn matches(&self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

/// Select records matching the search term and status filter.
///
/// A record matches when the filter is `All` or equals its status, AND the
/// term is empty or a case-insensitive substring of the tracking number,
/// item name, recipient, or sender. Input order is preserved.
pub fn filter<'a>(
    records: &'a [PackageRecord],
    search_term: &str,
    status_filter: StatusFilter,
) -> Vec<&'a PackageRecord> {
    let needle = search_term.trim().to_lowercase();
    records
        .iter()
        .filter(|record| status_filter.matches(record.status) && record.matches_search(&needle))
        .collect()
}

/// Order records for display: pending before everything else, ties broken by
/// creation time descending.
pub fn sort_for_display(records: &mut [PackageRecord]) {
    records.sort_by(|a, b| {
        let a_pending = a.status == Status::Pending;
        let b_pending = b.status == Status::Pending;
        b_pending
            .cmp(&a_pending)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

/// Aggregate counters over a record set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Stats {
    pub pending_count: usize,
    pub received_count: usize,
    /// Sum of `cost_price * quantity`; absent prices count as 0.
    pub total_value: f64,
}

/// Compute aggregate statistics in one pass.
pub fn stats(records: &[PackageRecord]) -> Stats {
    let mut result = Stats::default();
    for record in records {
        match record.status {
            Status::Pending => result.pending_count += 1,
            Status::Received => result.received_count += 1,
            Status::Shipped => {}
        }
        result.total_value += record.cost_price.unwrap_or(0.0) * f64::from(record.quantity);
    }
    result
}

/// Collect the price observations for one product as `(created_at, price)`
/// pairs, sorted ascending by creation time.
///
/// Records match by `product_id` first; matching by item name when the id is
/// absent is a compatibility shim for records written before product links
/// existed.
pub fn price_history(records: &[PackageRecord], product: &Product) -> Vec<(DateTime<Utc>, f64)> {
    let mut points: Vec<(DateTime<Utc>, f64)> = records
        .iter()
        .filter(|record| match record.product_id.as_deref() {
            Some(id) => id == product.id,
            None => record.item_name == product.name,
        })
        .filter_map(|record| record.cost_price.map(|price| (record.created_at, price)))
        .collect();
    points.sort_by_key(|(at, _)| *at);
    points
}
