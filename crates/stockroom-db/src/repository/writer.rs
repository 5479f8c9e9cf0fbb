//! # Transactional Document Writer
//!
//! One commit path for sales and purchases.
//!
//! ## Commit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    save_document(doc)                                   │
//! │                                                                         │
//! │  1. id empty?  → fresh UUID                                            │
//! │  2. prepare_for_save()  → line totals, totals, amount_due, product_ids │
//! │                                                                         │
//! │  BEGIN ───────────────────────────────────────────────────────────┐    │
//! │  3. load stored version (if this id exists)                       │    │
//! │  4. upsert document row                                           │    │
//! │  5. for each product in stock_delta_difference(stored, doc):      │    │
//! │        UPDATE products SET quantity = quantity + delta            │    │
//! │        0 rows → NotFound, transaction dropped (ROLLBACK)          │    │
//! │  COMMIT ──────────────────────────────────────────────────────────┘    │
//! │                                                                         │
//! │  Either the document and every stock movement are visible, or none.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Re-saving an existing id applies only the difference between the stored
//! and new quantities, so stock never double-counts an edit.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use super::product::increment_quantity;
use super::sortable_timestamp;
use crate::error::{DbError, DbResult};
use stockroom_core::document::stock_delta_difference;
use stockroom_core::{FinancialDocument, Purchase, Sale};

/// A financial document with a table of its own.
pub trait StoredDocument:
    FinancialDocument + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static
{
    /// Table holding one JSON body per document.
    const TABLE: &'static str;
    /// Name used in errors and logs.
    const ENTITY: &'static str;
}

impl StoredDocument for Sale {
    const TABLE: &'static str = "sales";
    const ENTITY: &'static str = "Sale";
}

impl StoredDocument for Purchase {
    const TABLE: &'static str = "purchases";
    const ENTITY: &'static str = "Purchase";
}

/// Outcome of a committed save.
#[derive(Debug, Clone)]
pub struct SavedDocument<D> {
    pub document: D,
    /// False when an existing id was replaced.
    pub created: bool,
}

/// Persists the document and its stock movement atomically.
pub(crate) async fn save_document<D: StoredDocument>(
    pool: &SqlitePool,
    mut doc: D,
) -> DbResult<SavedDocument<D>> {
    if doc.id().is_empty() {
        doc.set_id(Uuid::new_v4().to_string());
    }
    doc.prepare_for_save();

    let body = serde_json::to_string(&doc)?;
    let product_ids = serde_json::to_string(doc.product_ids())?;
    let now = Utc::now();

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

    let select_sql = format!("SELECT body FROM {} WHERE id = ?1", D::TABLE);
    let stored_body: Option<String> = sqlx::query_scalar(&select_sql)
        .bind(doc.id())
        .fetch_optional(&mut *tx)
        .await?;
    let stored: Option<D> = stored_body
        .map(|b| serde_json::from_str(&b))
        .transpose()?;
    let created = stored.is_none();

    debug!(
        entity = D::ENTITY,
        id = %doc.id(),
        created,
        lines = doc.line_quantities().len(),
        "Writing document"
    );

    let upsert_sql = format!(
        r#"
        INSERT INTO {} (
            id, counterparty_id, doc_date, total_cents, product_ids, body,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
        ON CONFLICT(id) DO UPDATE SET
            counterparty_id = excluded.counterparty_id,
            doc_date = excluded.doc_date,
            total_cents = excluded.total_cents,
            product_ids = excluded.product_ids,
            body = excluded.body,
            updated_at = excluded.updated_at
        "#,
        D::TABLE
    );
    sqlx::query(&upsert_sql)
        .bind(doc.id())
        .bind(doc.counterparty_id())
        .bind(sortable_timestamp(doc.document_date()))
        .bind(doc.total().cents())
        .bind(&product_ids)
        .bind(&body)
        .bind(sortable_timestamp(now))
        .execute(&mut *tx)
        .await?;

    for (product_id, delta) in stock_delta_difference(stored.as_ref(), &doc) {
        if increment_quantity(&mut *tx, &product_id, delta).await? == 0 {
            debug!(entity = D::ENTITY, product_id = %product_id, "Line references missing product");
            return Err(DbError::not_found("Product", product_id));
        }
    }

    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

    info!(
        entity = D::ENTITY,
        id = %doc.id(),
        total_cents = doc.total().cents(),
        created,
        "Document committed"
    );

    Ok(SavedDocument {
        document: doc,
        created,
    })
}

// =============================================================================
// Reads
// =============================================================================

fn decode_all<D: StoredDocument>(bodies: Vec<String>) -> DbResult<Vec<D>> {
    bodies
        .iter()
        .map(|b| serde_json::from_str(b).map_err(DbError::from))
        .collect()
}

pub(crate) async fn get_document<D: StoredDocument>(
    pool: &SqlitePool,
    id: &str,
) -> DbResult<Option<D>> {
    let sql = format!("SELECT body FROM {} WHERE id = ?1", D::TABLE);
    let body: Option<String> = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(body.map(|b| serde_json::from_str(&b)).transpose()?)
}

/// Documents dated within `[start, end]`, oldest first.
pub(crate) async fn list_documents_between<D: StoredDocument>(
    pool: &SqlitePool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> DbResult<Vec<D>> {
    let sql = format!(
        "SELECT body FROM {} WHERE doc_date >= ?1 AND doc_date <= ?2 ORDER BY doc_date, id",
        D::TABLE
    );
    let bodies: Vec<String> = sqlx::query_scalar(&sql)
        .bind(sortable_timestamp(start))
        .bind(sortable_timestamp(end))
        .fetch_all(pool)
        .await?;
    decode_all(bodies)
}

/// Documents with at least one line for `product_id`, newest first.
pub(crate) async fn list_documents_containing<D: StoredDocument>(
    pool: &SqlitePool,
    product_id: &str,
) -> DbResult<Vec<D>> {
    let sql = format!(
        r#"
        SELECT d.body FROM {table} d
        WHERE EXISTS (
            SELECT 1 FROM json_each(d.product_ids) WHERE json_each.value = ?1
        )
        ORDER BY d.doc_date DESC, d.id
        "#,
        table = D::TABLE
    );
    let bodies: Vec<String> = sqlx::query_scalar(&sql)
        .bind(product_id)
        .fetch_all(pool)
        .await?;
    decode_all(bodies)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use stockroom_core::{Product, PurchaseItem, SaleItem};

    async fn setup() -> (Database, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .save(Product {
                name: "Flour".to_string(),
                quantity: 20,
                mrp_cents: 1500,
                cost_price_cents: 900,
                ..Default::default()
            })
            .await
            .unwrap();
        (db, product)
    }

    fn purchase_line(product_id: &str, quantity: i64, price: i64) -> PurchaseItem {
        PurchaseItem {
            product_id: product_id.to_string(),
            product_name: "Flour".to_string(),
            quantity,
            price_per_item_cents: price,
            ..Default::default()
        }
    }

    async fn stock_of(db: &Database, id: &str) -> i64 {
        db.products().get_by_id(id).await.unwrap().unwrap().quantity
    }

    #[tokio::test]
    async fn test_purchase_increments_stock_and_totals() {
        let (db, p1) = setup().await;
        let purchase = Purchase {
            supplier_id: "sup-1".to_string(),
            tax_cents: 200,
            discount_cents: 50,
            items: vec![purchase_line(&p1.id, 5, 1000)],
            ..Default::default()
        };

        let saved = save_document(db.pool(), purchase).await.unwrap();
        assert!(saved.created);
        assert!(!saved.document.id.is_empty());
        assert_eq!(saved.document.subtotal_cents, 5000);
        assert_eq!(saved.document.total_cents, 5000 + 200 - 50);
        assert_eq!(saved.document.product_ids, vec![p1.id.clone()]);
        assert_eq!(stock_of(&db, &p1.id).await, 25);
    }

    #[tokio::test]
    async fn test_missing_product_rolls_back_everything() {
        let (db, p1) = setup().await;
        // Lowercase 'z' sorts after any hex UUID, so P1 is incremented first
        let purchase = Purchase {
            id: "po-1".to_string(),
            items: vec![
                purchase_line(&p1.id, 5, 1000),
                purchase_line("zzzz-missing", 1, 100),
            ],
            ..Default::default()
        };

        let err = save_document(db.pool(), purchase).await.unwrap_err();
        assert!(err.is_not_found());

        assert_eq!(stock_of(&db, &p1.id).await, 20);
        assert!(get_document::<Purchase>(db.pool(), "po-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resave_applies_only_the_difference() {
        let (db, p1) = setup().await;
        let sale = Sale {
            customer_id: "c-1".to_string(),
            items: vec![SaleItem {
                product_id: p1.id.clone(),
                quantity: 3,
                price_per_item_cents: 1500,
                ..Default::default()
            }],
            ..Default::default()
        };

        let first = save_document(db.pool(), sale).await.unwrap();
        assert_eq!(stock_of(&db, &p1.id).await, 17);

        let mut edited = first.document.clone();
        edited.items[0].quantity = 5;
        let second = save_document(db.pool(), edited).await.unwrap();
        assert!(!second.created);
        assert_eq!(stock_of(&db, &p1.id).await, 15);

        // Same content again moves nothing
        save_document(db.pool(), second.document.clone()).await.unwrap();
        assert_eq!(stock_of(&db, &p1.id).await, 15);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_lines_without_product_move_no_stock() {
        let (db, p1) = setup().await;
        let purchase = Purchase {
            items: vec![purchase_line("", 7, 100), purchase_line(&p1.id, 1, 100)],
            ..Default::default()
        };
        save_document(db.pool(), purchase).await.unwrap();
        assert_eq!(stock_of(&db, &p1.id).await, 21);
    }

    #[tokio::test]
    async fn test_list_containing_product() {
        let (db, p1) = setup().await;
        for product_id in [p1.id.as_str(), ""] {
            let purchase = Purchase {
                items: vec![purchase_line(product_id, 1, 100)],
                ..Default::default()
            };
            save_document(db.pool(), purchase).await.unwrap();
        }

        let found = list_documents_containing::<Purchase>(db.pool(), &p1.id)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].items[0].product_id, p1.id);
    }
}
