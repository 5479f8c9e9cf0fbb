//! # Purchase Repository
//!
//! Stock arrives through purchases: every saved line increments its
//! product's quantity in the same transaction as the document row.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::notification::notify;
use super::writer::{self, SavedDocument};
use crate::error::DbResult;
use stockroom_core::{Notification, Purchase};

/// Repository for purchase database operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Purchase>> {
        writer::get_document(&self.pool, id).await
    }

    /// Saves a purchase and increments stock for every line, atomically.
    ///
    /// A new purchase also records a "New Purchase" notification.
    pub async fn save(&self, purchase: Purchase) -> DbResult<Purchase> {
        let SavedDocument { document, created } =
            writer::save_document(&self.pool, purchase).await?;

        if created {
            notify(&self.pool, Notification::for_purchase(&document, Utc::now())).await;
        }

        Ok(document)
    }

    pub async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Purchase>> {
        writer::list_documents_between(&self.pool, start, end).await
    }

    pub async fn list_containing_product(&self, product_id: &str) -> DbResult<Vec<Purchase>> {
        writer::list_documents_containing(&self.pool, product_id).await
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use stockroom_core::{NotificationKind, Product, Purchase, PurchaseItem};

    #[tokio::test]
    async fn test_purchase_of_five_restocks_p1() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p1 = db
            .products()
            .save(Product {
                name: "P1".to_string(),
                quantity: 20,
                ..Default::default()
            })
            .await
            .unwrap();

        let saved = db
            .purchases()
            .save(Purchase {
                supplier_id: "sup-1".to_string(),
                supplier_name: "Metro Wholesale".to_string(),
                tax_cents: 150,
                discount_cents: 100,
                items: vec![PurchaseItem {
                    product_id: p1.id.clone(),
                    product_name: "P1".to_string(),
                    quantity: 5,
                    price_per_item_cents: 1000,
                    ..Default::default()
                }],
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(saved.total_cents, 5000 + 150 - 100);
        let restocked = db.products().get_by_id(&p1.id).await.unwrap().unwrap();
        assert_eq!(restocked.quantity, 25);

        let stored = db.purchases().get_by_id(&saved.id).await.unwrap().unwrap();
        assert_eq!(stored, saved);

        let unread = db.notifications().list_unread(5).await.unwrap();
        assert_eq!(unread[0].kind, NotificationKind::Purchase);
        assert_eq!(unread[0].body, "Purchase of $50.50 from Metro Wholesale.");
    }

    #[tokio::test]
    async fn test_failed_purchase_records_no_notification() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let result = db
            .purchases()
            .save(Purchase {
                items: vec![PurchaseItem {
                    product_id: "ghost".to_string(),
                    quantity: 1,
                    ..Default::default()
                }],
                ..Default::default()
            })
            .await;

        assert!(result.unwrap_err().is_not_found());
        assert_eq!(db.notifications().unread_count().await.unwrap(), 0);
    }
}
