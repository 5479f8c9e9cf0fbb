//! # Editing Saved Documents
//!
//! Rebuilds builder selections from a stored sale or purchase.
//!
//! ```text
//! for each line, in order:
//!     get_by_id(line.product_id)
//!       Some(product) → Selection::restored(live product, line)
//!       None / Err    → Selection::unavailable(line)   shown as "<name> (Unavailable)"
//! ```
//!
//! Every selection keeps the saved line, so a re-save writes back the
//! original name, cost, category and brand. One failed lookup never aborts
//! the rest.

use tracing::warn;

use crate::repository::product::ProductRepository;
use stockroom_core::{Purchase, ReturnableItem, Sale, Selection, StoredLine};

/// Selections for editing a stored sale.
pub async fn load_sale_selections(products: &ProductRepository, sale: &Sale) -> Vec<Selection> {
    restore_selections(products, &sale.items).await
}

/// Selections for editing a stored purchase.
pub async fn load_purchase_selections(
    products: &ProductRepository,
    purchase: &Purchase,
) -> Vec<Selection> {
    restore_selections(products, &purchase.items).await
}

async fn restore_selections<I>(
    products: &ProductRepository,
    items: &[I],
) -> Vec<Selection>
where
    I: ReturnableItem + Clone + Into<StoredLine>,
{
    let mut selections = Vec::with_capacity(items.len());

    for item in items {
        let live = match products.get_by_id(item.product_id()).await {
            Ok(found) => found,
            Err(e) => {
                warn!(product_id = %item.product_id(), error = %e, "Product lookup failed while restoring line");
                None
            }
        };

        let selection = match live {
            Some(product) => Selection::restored(product, item.clone()),
            None => Selection::unavailable(item.clone()),
        };
        selections.push(selection);
    }

    selections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use stockroom_core::selection::UNAVAILABLE_SUFFIX;
    use stockroom_core::{Customer, DocumentTerms, Product, SaleItem, SelectionBuilder, TransactionKind};

    fn line(product_id: &str, name: &str, quantity: i64, price: i64) -> SaleItem {
        SaleItem {
            product_id: product_id.to_string(),
            product_name: name.to_string(),
            quantity,
            price_per_item_cents: price,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_products_become_placeholders_in_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let live = db
            .products()
            .save(Product {
                name: "Soap".to_string(),
                quantity: 12,
                mrp_cents: 400,
                ..Default::default()
            })
            .await
            .unwrap();

        let sale = Sale {
            items: vec![
                line("deleted-1", "Shampoo", 2, 900),
                line(&live.id, "Soap", 3, 350),
                line("deleted-2", "Comb", 1, 100),
            ],
            ..Default::default()
        };

        let selections = load_sale_selections(&db.products(), &sale).await;
        assert_eq!(selections.len(), 3);

        assert!(!selections[0].available);
        assert_eq!(selections[0].product.name, format!("Shampoo{}", UNAVAILABLE_SUFFIX));
        assert_eq!(selections[0].product.quantity, 0);
        assert_eq!(selections[0].unit_price_cents, 900);

        // Live stock, historical price
        assert!(selections[1].available);
        assert_eq!(selections[1].product.quantity, 12);
        assert_eq!(selections[1].unit_price_cents, 350);
        assert_eq!(selections[1].quantity, 3);

        assert_eq!(selections[2].product.id, "deleted-2");

        let mut builder = SelectionBuilder::new(TransactionKind::Sale);
        builder.restore(selections);
        assert_eq!(builder.subtotal().cents(), 2 * 900 + 3 * 350 + 100);
    }

    #[tokio::test]
    async fn test_lookup_failures_do_not_abort() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let products = db.products();
        db.close().await;

        let purchase = Purchase {
            items: vec![stockroom_core::PurchaseItem {
                product_id: "p1".to_string(),
                product_name: "Oil".to_string(),
                quantity: 4,
                price_per_item_cents: 700,
                ..Default::default()
            }],
            ..Default::default()
        };

        let selections = load_purchase_selections(&products, &purchase).await;
        assert_eq!(selections.len(), 1);
        assert!(!selections[0].available);
    }

    #[tokio::test]
    async fn test_resave_keeps_historical_line_snapshots() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let soap = db
            .products()
            .save(Product {
                name: "Soap".to_string(),
                category: Some("Household".to_string()),
                quantity: 10,
                mrp_cents: 400,
                cost_price_cents: 300,
                ..Default::default()
            })
            .await
            .unwrap();
        let customer = Customer {
            id: "c1".to_string(),
            name: "Ayesha".to_string(),
            ..Default::default()
        };

        let mut builder = SelectionBuilder::new(TransactionKind::Sale);
        builder.add(Some(&soap));
        builder.set_quantity(0, 2);
        let sale = builder
            .build_sale(Some(&customer), &DocumentTerms::default())
            .unwrap();
        let original = db.sales().save(sale).await.unwrap();
        assert_eq!(original.total_cost_cents, 600);
        assert_eq!(original.total_profit_cents, 200);

        db.products().delete(&soap.id).await.unwrap();

        let selections = load_sale_selections(&db.products(), &original).await;
        assert!(!selections[0].available);

        let mut editor = SelectionBuilder::new(TransactionKind::Sale);
        editor.restore(selections);
        let terms = DocumentTerms {
            document_id: original.id.clone(),
            date: original.sale_date,
            ..Default::default()
        };
        let edited = editor.build_sale(Some(&customer), &terms).unwrap();
        let resaved = db.sales().save(edited).await.unwrap();

        assert_eq!(resaved.id, original.id);
        assert_eq!(resaved.total_cost_cents, 600);
        assert_eq!(resaved.total_profit_cents, 200);
        assert_eq!(resaved.items[0].product_name, "Soap");
        assert_eq!(resaved.items[0].category.as_deref(), Some("Household"));
    }

    #[tokio::test]
    async fn test_zero_quantity_line_is_restored_as_stored() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sale = Sale {
            items: vec![line("deleted", "Shampoo", 0, 900)],
            ..Default::default()
        };

        let selections = load_sale_selections(&db.products(), &sale).await;
        assert_eq!(selections[0].quantity, 0);
        assert_eq!(selections[0].line_total().cents(), 0);
    }
}
