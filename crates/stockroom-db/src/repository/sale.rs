//! # Sale Repository
//!
//! Database operations for sales.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. BUILD                                                              │
//! │     └── SelectionBuilder::build_sale() → Sale { status: Confirmed }    │
//! │                                                                         │
//! │  2. SAVE                                                               │
//! │     └── save() → document row + stock decrements, one transaction      │
//! │                                                                         │
//! │  3. NOTIFY (new sales only)                                            │
//! │     └── "New Sale!" recorded after commit                              │
//! │                                                                         │
//! │  4. (OPTIONAL) EDIT                                                    │
//! │     └── editing::load_sale_selections() → builder → save() again       │
//! │         Only the quantity difference moves stock.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::notification::notify;
use super::writer::{self, SavedDocument};
use crate::error::DbResult;
use stockroom_core::{Notification, Sale};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        writer::get_document(&self.pool, id).await
    }

    /// Saves a sale and decrements stock for every line, atomically.
    ///
    /// ## Returns
    /// The stored sale with its id and every derived amount filled in.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - A line references a product that doesn't exist.
    ///   Nothing was written.
    pub async fn save(&self, sale: Sale) -> DbResult<Sale> {
        let SavedDocument { document, created } = writer::save_document(&self.pool, sale).await?;

        if created {
            notify(&self.pool, Notification::for_sale(&document, Utc::now())).await;
        }

        Ok(document)
    }

    /// Sales dated within `[start, end]`.
    pub async fn list_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DbResult<Vec<Sale>> {
        writer::list_documents_between(&self.pool, start, end).await
    }

    /// Sales with a line for this product, newest first.
    pub async fn list_containing_product(&self, product_id: &str) -> DbResult<Vec<Sale>> {
        writer::list_documents_containing(&self.pool, product_id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use chrono::{Duration, Utc};
    use stockroom_core::{Product, Sale, SaleItem};

    async fn setup() -> (Database, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .save(Product {
                name: "Green Tea".to_string(),
                category: Some("Drinks".to_string()),
                quantity: 50,
                mrp_cents: 1500,
                cost_price_cents: 1000,
                ..Default::default()
            })
            .await
            .unwrap();
        (db, product)
    }

    fn sale_of(product: &Product, quantity: i64) -> Sale {
        Sale {
            customer_id: "c-1".to_string(),
            customer_name: "Ayesha".to_string(),
            sale_date: Utc::now(),
            discount_cents: 500,
            amount_paid_cents: 1000,
            items: vec![SaleItem {
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                quantity,
                price_per_item_cents: product.mrp_cents,
                cost_price_cents: product.cost_price_cents,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_save_derives_due_cost_and_profit() {
        let (db, product) = setup().await;
        let saved = db.sales().save(sale_of(&product, 4)).await.unwrap();

        assert_eq!(saved.subtotal_cents, 6000);
        assert_eq!(saved.total_cents, 5500);
        assert_eq!(saved.amount_due_cents, saved.total_cents - saved.amount_paid_cents);
        assert_eq!(saved.total_cost_cents, 4 * 1000);
        assert_eq!(saved.total_profit_cents, (6000 - 500) - 4000);

        let stock = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stock.quantity, 46);
    }

    #[tokio::test]
    async fn test_line_price_is_a_snapshot() {
        let (db, product) = setup().await;
        let saved = db.sales().save(sale_of(&product, 1)).await.unwrap();

        let mut live = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        live.mrp_cents = 9999;
        db.products().save(live).await.unwrap();

        let stored = db.sales().get_by_id(&saved.id).await.unwrap().unwrap();
        assert_eq!(stored.items[0].price_per_item_cents, 1500);
        assert_eq!(stored.items[0].total_price_cents, 1500);
    }

    #[tokio::test]
    async fn test_only_new_sales_notify() {
        let (db, product) = setup().await;
        let saved = db.sales().save(sale_of(&product, 1)).await.unwrap();
        db.sales().save(saved.clone()).await.unwrap();

        let unread = db.notifications().list_unread(10).await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].title, "New Sale!");
        assert_eq!(unread[0].metadata["saleId"], saved.id.as_str());
    }

    #[tokio::test]
    async fn test_list_between_and_containing() {
        let (db, product) = setup().await;
        let saved = db.sales().save(sale_of(&product, 2)).await.unwrap();

        let now = Utc::now();
        let window = db
            .sales()
            .list_between(now - Duration::hours(1), now + Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(window.len(), 1);

        let older = db
            .sales()
            .list_between(now - Duration::days(3), now - Duration::days(2))
            .await
            .unwrap();
        assert!(older.is_empty());

        let containing = db.sales().list_containing_product(&product.id).await.unwrap();
        assert_eq!(containing[0].id, saved.id);
        assert!(db.sales().list_containing_product("other").await.unwrap().is_empty());
    }
}
