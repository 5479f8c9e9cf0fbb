//! # Dashboard Repository
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    summary(window)                                      │
//! │                                                                         │
//! │   ┌────────────────────┐        ┌────────────────────┐                 │
//! │   │ sales in window    │        │ expenses in window │   tokio::join!  │
//! │   └─────────┬──────────┘        └─────────┬──────────┘                 │
//! │             └───────────────┬─────────────┘                            │
//! │                             ▼                                          │
//! │             stockroom_core::dashboard::summarize()                     │
//! │                                                                         │
//! │  Every document in the window is scanned. No stored rollups.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use super::expense::ExpenseRepository;
use super::writer::list_documents_between;
use crate::error::DbResult;
use stockroom_core::dashboard::{summarize, DashboardSummary, DashboardWindow};
use stockroom_core::Sale;

#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
}

impl DashboardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DashboardRepository { pool }
    }

    /// Aggregates sales and expenses inside the window.
    pub async fn summary(&self, window: &DashboardWindow) -> DbResult<DashboardSummary> {
        let expenses = ExpenseRepository::new(self.pool.clone());

        let (sales, expenses) = tokio::join!(
            list_documents_between::<Sale>(&self.pool, window.start, window.end),
            expenses.list_between(window.start, window.end),
        );
        let (sales, expenses) = (sales?, expenses?);

        debug!(
            sales = sales.len(),
            expenses = expenses.len(),
            granularity = ?window.granularity(),
            "Summarizing dashboard window"
        );

        Ok(summarize(window, &sales, &expenses))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use chrono::{Duration, FixedOffset, TimeZone, Utc};
    use stockroom_core::dashboard::{BucketGranularity, DashboardWindow};
    use stockroom_core::{Expense, Product, Sale, SaleItem};

    #[tokio::test]
    async fn test_summary_combines_sales_and_expenses() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .save(Product {
                name: "Biscuits".to_string(),
                category: Some("Snacks".to_string()),
                quantity: 100,
                ..Default::default()
            })
            .await
            .unwrap();

        let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let end = start + Duration::days(7);

        for day in [1, 2] {
            db.sales()
                .save(Sale {
                    sale_date: start + Duration::days(day),
                    items: vec![SaleItem {
                        product_id: product.id.clone(),
                        product_name: product.name.clone(),
                        category: product.category.clone(),
                        quantity: 2,
                        price_per_item_cents: 500,
                        cost_price_cents: 300,
                        ..Default::default()
                    }],
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        db.expenses()
            .save(Expense {
                description: "Electricity".to_string(),
                amount_cents: 300,
                expense_date: start + Duration::days(3),
                ..Default::default()
            })
            .await
            .unwrap();
        // Outside the window
        db.expenses()
            .save(Expense {
                description: "Old rent".to_string(),
                amount_cents: 9_000,
                expense_date: start - Duration::days(1),
                ..Default::default()
            })
            .await
            .unwrap();

        let window = DashboardWindow::new(start, end, FixedOffset::east_opt(0).unwrap());
        let summary = db.dashboard().summary(&window).await.unwrap();

        assert_eq!(summary.granularity, BucketGranularity::Hour);
        assert_eq!(summary.transaction_count, 2);
        assert_eq!(summary.total_revenue_cents, 2000);
        assert_eq!(summary.total_profit_cents, 800);
        assert_eq!(summary.total_expenses_cents, 300);
        assert_eq!(summary.net_profit_cents, 500);
        assert_eq!(summary.top_products[0].quantity, 4);
        assert_eq!(summary.category_revenue[0].category, "Snacks");
    }
}
