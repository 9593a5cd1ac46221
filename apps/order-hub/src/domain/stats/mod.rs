//! Order Statistics
//!
//! Derives an aggregate report from a snapshot of order records in a single
//! pass. The report is recomputed on every request and never cached; it is a
//! pure function of the snapshot and the supplied clock.

use std::collections::HashMap;

use chrono::{DateTime, Months, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::domain::order::{OrderRecord, OrderStatus};

// =============================================================================
// Report
// =============================================================================

/// Aggregate statistics over one snapshot of orders.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct OrderStats {
    /// Total number of orders in the snapshot.
    pub total_orders: usize,
    /// Orders with status `cancelled`.
    pub total_cancelled: usize,
    /// Orders with status `in_progress`.
    pub total_in_progress: usize,
    /// Orders with status `placed`.
    pub total_placed: usize,
    /// Orders with status `shipped`.
    pub total_shipped: usize,
    /// Orders placed strictly after one calendar month before "now".
    pub total_last_month: usize,
    /// Revenue across non-cancelled orders, rounded to 2 decimal places.
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    /// Order count per product name (case-sensitive).
    pub totals_products: HashMap<String, usize>,
}

// =============================================================================
// Aggregation
// =============================================================================

/// Aggregate a snapshot into an [`OrderStats`] report.
///
/// One pass, order-independent. The trailing window subtracts one calendar
/// month from `now` (so "last month" from March 31 starts at the end of
/// February, not 30 × 24 h earlier) and counts orders placed strictly after
/// that date. Revenue accumulates exactly and is rounded once at the end,
/// half-away-from-zero, to 2 decimal places.
#[must_use]
pub fn aggregate(records: &[OrderRecord], now: DateTime<Utc>) -> OrderStats {
    let cutoff = now
        .checked_sub_months(Months::new(1))
        .unwrap_or(now)
        .date_naive();

    let mut stats = OrderStats {
        total_orders: records.len(),
        ..OrderStats::default()
    };

    for record in records {
        match record.status {
            OrderStatus::Cancelled => stats.total_cancelled += 1,
            OrderStatus::Shipped => stats.total_shipped += 1,
            OrderStatus::Placed => stats.total_placed += 1,
            OrderStatus::InProgress => stats.total_in_progress += 1,
        }

        if record.placed_on > cutoff {
            stats.total_last_month += 1;
        }

        if !record.status.is_cancelled() {
            stats.revenue += record.price;
        }

        *stats
            .totals_products
            .entry(record.product_name.clone())
            .or_insert(0) += 1;
    }

    stats.revenue = stats
        .revenue
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    stats
}

// =============================================================================
// Tests
// =============================================================================
