//! # Repository Module
//!
//! Database repository implementations for Stockroom.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Talks to Which Table                             │
//! │                                                                         │
//! │  ProductRepository ─────────────► products   (column per field)        │
//! │                                       ▲                                 │
//! │                                       │ quantity += delta               │
//! │  SaleRepository ─────┐                │                                 │
//! │                      ├─► writer ──────┴──► sales / purchases (JSON)    │
//! │  PurchaseRepository ─┘     │                                            │
//! │                            └─ after commit ─► NotificationRepository   │
//! │                                                                         │
//! │  CustomerRepository / SupplierRepository ─► customers / suppliers      │
//! │  ExpenseRepository ──────────────────────► expenses                    │
//! │  DashboardRepository ── reads sales + expenses concurrently            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`] - Catalog paging, lookups, stock adjustment
//! - [`SaleRepository`] / [`PurchaseRepository`] - Atomic document writes
//! - [`CustomerRepository`] / [`SupplierRepository`] - Counterparties
//! - [`ExpenseRepository`] - Non-purchase spending
//! - [`NotificationRepository`] - Event records
//! - [`DashboardRepository`] - Window aggregation
//!
//! [`ProductRepository`]: product::ProductRepository
//! [`SaleRepository`]: sale::SaleRepository
//! [`PurchaseRepository`]: purchase::PurchaseRepository
//! [`CustomerRepository`]: counterparty::CustomerRepository
//! [`SupplierRepository`]: counterparty::SupplierRepository
//! [`ExpenseRepository`]: expense::ExpenseRepository
//! [`NotificationRepository`]: notification::NotificationRepository
//! [`DashboardRepository`]: dashboard::DashboardRepository

use chrono::{DateTime, SecondsFormat, Utc};

pub mod counterparty;
pub mod dashboard;
pub mod expense;
pub mod notification;
pub mod product;
pub mod purchase;
pub mod sale;
pub mod writer;

/// Fixed-width UTC text used for every indexed date column.
///
/// Lexical order equals chronological order, so range filters can compare
/// strings.
pub(crate) fn sortable_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sortable_timestamp_orders_lexically() {
        let early = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(sortable_timestamp(early), "2026-03-01T09:00:00.000000Z");
        assert!(sortable_timestamp(early) < sortable_timestamp(late));
    }
}
