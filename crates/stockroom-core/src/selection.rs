//! # Selection Builder
//!
//! In-memory assembly of the line items for one in-progress sale or
//! purchase. Nothing here touches storage.
//!
//! ## Session Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Building One Transaction                             │
//! │                                                                         │
//! │  SelectionBuilder::new(kind)                                           │
//! │       │                                                                 │
//! │       ├── add(P1)            → [P1 ×1]                                 │
//! │       ├── add(P1)            → [P1 ×2]        (merged by product id)   │
//! │       ├── add(P2)            → [P1 ×2, P2 ×1]                          │
//! │       ├── set_quantity(1, 4) → [P1 ×2, P2 ×4]                          │
//! │       ├── remove(7)          → unchanged      (out of range: no-op)    │
//! │       │                                                                 │
//! │       ▼  subtotal() recomputed after every mutation                    │
//! │  build_sale(customer, terms) → Sale  (ready for the writer)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  clear()  (after save or cancel)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mutations by index edit the row in place. The list itself is never
//! rebuilt, so an input field bound to a row keeps its focus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::FinancialDocument;
use crate::error::{CoreError, CoreResult};
use crate::money::{line_item_total, Money};
use crate::types::{
    Customer, DocumentStatus, PaymentMethod, Product, Purchase, PurchaseItem, Sale, SaleItem,
    Supplier, TransactionKind,
};

/// Marker appended to the name of a product that no longer exists.
pub const UNAVAILABLE_SUFFIX: &str = " (Unavailable)";

// =============================================================================
// Selection
// =============================================================================

/// A product snapshot paired with the quantity and price for this transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Live product, or a placeholder whose name carries [`UNAVAILABLE_SUFFIX`].
    pub product: Product,
    /// At least 1 for fresh selections. A restored line keeps whatever
    /// quantity was stored until it is edited.
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// False for a placeholder standing in for a deleted product.
    pub available: bool,
    /// The saved line this selection was rebuilt from. Its snapshot fields
    /// are written back unchanged.
    pub stored: Option<StoredLine>,
}

/// A line as it was saved, kept while the document is being edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoredLine {
    Sale(SaleItem),
    Purchase(PurchaseItem),
}

impl StoredLine {
    fn parts(&self) -> (&str, &str, i64, i64) {
        match self {
            StoredLine::Sale(item) => (
                &item.product_id,
                &item.product_name,
                item.quantity,
                item.price_per_item_cents,
            ),
            StoredLine::Purchase(item) => (
                &item.product_id,
                &item.product_name,
                item.quantity,
                item.price_per_item_cents,
            ),
        }
    }
}

impl From<SaleItem> for StoredLine {
    fn from(item: SaleItem) -> Self {
        StoredLine::Sale(item)
    }
}

impl From<PurchaseItem> for StoredLine {
    fn from(item: PurchaseItem) -> Self {
        StoredLine::Purchase(item)
    }
}

impl Selection {
    /// A fresh selection at quantity 1 and the kind's default price.
    pub fn new(product: Product, kind: TransactionKind) -> Self {
        let unit_price = kind.default_unit_price(&product);
        Selection {
            product,
            quantity: 1,
            unit_price_cents: unit_price.cents(),
            available: true,
            stored: None,
        }
    }

    /// A saved line paired with its live product. Quantity and price come
    /// from the line.
    pub fn restored(product: Product, line: impl Into<StoredLine>) -> Self {
        let line = line.into();
        let (_, _, quantity, price) = line.parts();
        Selection {
            product,
            quantity,
            unit_price_cents: price,
            available: true,
            stored: Some(line),
        }
    }

    /// Placeholder for a line whose product can no longer be fetched.
    ///
    /// Stock reads as zero. The suffix is for display only; the line's own
    /// name is what gets saved again.
    pub fn unavailable(line: impl Into<StoredLine>) -> Self {
        let line = line.into();
        let (product_id, product_name, quantity, price) = line.parts();
        let product = Product {
            id: product_id.to_string(),
            name: format!("{}{}", product_name, UNAVAILABLE_SUFFIX),
            quantity: 0,
            ..Default::default()
        };
        Selection {
            product,
            quantity,
            unit_price_cents: price,
            available: false,
            stored: Some(line),
        }
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        line_item_total(self.unit_price(), self.quantity)
    }

    fn to_sale_item(&self) -> SaleItem {
        let mut item = match &self.stored {
            Some(StoredLine::Sale(saved)) => saved.clone(),
            _ => SaleItem {
                product_id: self.product.id.clone(),
                product_name: self.product.name.clone(),
                category: self.product.category.clone(),
                brand: self.product.brand.clone(),
                cost_price_cents: self.product.cost_price_cents,
                ..Default::default()
            },
        };
        item.quantity = self.quantity;
        item.price_per_item_cents = self.unit_price_cents;
        item.total_price_cents = self.line_total().cents();
        item
    }

    fn to_purchase_item(&self) -> PurchaseItem {
        let mut item = match &self.stored {
            Some(StoredLine::Purchase(saved)) => saved.clone(),
            _ => PurchaseItem {
                product_id: self.product.id.clone(),
                product_name: self.product.name.clone(),
                product_code: self.product.product_code.clone(),
                batch_number: self.product.batch_number.clone(),
                expiry_date: self.product.expiry_date,
                ..Default::default()
            },
        };
        item.quantity = self.quantity;
        item.price_per_item_cents = self.unit_price_cents;
        item.total_price_cents = self.line_total().cents();
        item
    }
}

// =============================================================================
// Document Terms
// =============================================================================

/// Header values typed in alongside the selections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentTerms {
    /// Id of the document being edited. Empty for a new document.
    pub document_id: String,
    pub date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub amount_paid_cents: i64,
    pub invoice_number: Option<String>,
    pub notes: Option<String>,
}

// =============================================================================
// Selection Builder
// =============================================================================

/// Per-session selection state for one transaction.
#[derive(Debug, Clone)]
pub struct SelectionBuilder {
    kind: TransactionKind,
    selections: Vec<Selection>,
    subtotal: Money,
}

impl SelectionBuilder {
    pub fn new(kind: TransactionKind) -> Self {
        SelectionBuilder {
            kind,
            selections: Vec::new(),
            subtotal: Money::zero(),
        }
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    /// Adds one unit of `product`.
    ///
    /// An existing selection with the same product id is incremented by one.
    /// `None` is a no-op.
    pub fn add(&mut self, product: Option<&Product>) {
        let Some(product) = product else {
            return;
        };

        match self
            .selections
            .iter()
            .position(|selection| selection.product.id == product.id)
        {
            Some(index) => self.selections[index].quantity += 1,
            None => {
                let selection = Selection::new(product.clone(), self.kind);
                self.selections.push(selection);
            }
        }
        self.recompute();
    }

    /// Removes the selection at `index`. Out of range is a no-op.
    pub fn remove(&mut self, index: usize) {
        if index < self.selections.len() {
            self.selections.remove(index);
            self.recompute();
        }
    }

    /// Sets the quantity in place, clamped to at least 1.
    pub fn set_quantity(&mut self, index: usize, quantity: i64) {
        if let Some(selection) = self.selections.get_mut(index) {
            selection.quantity = quantity.max(1);
            self.recompute();
        }
    }

    /// Overrides the unit price in place.
    pub fn set_unit_price(&mut self, index: usize, price: Money) {
        if let Some(selection) = self.selections.get_mut(index) {
            selection.unit_price_cents = price.cents();
            self.recompute();
        }
    }

    /// Σ line totals, kept current after every mutation.
    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    /// Replaces all selections with a restored list (edit session).
    pub fn restore(&mut self, selections: Vec<Selection>) {
        self.selections = selections;
        self.recompute();
    }

    /// Discards every selection.
    pub fn clear(&mut self) {
        self.selections.clear();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.subtotal = self.selections.iter().map(Selection::line_total).sum();
    }

    /// Selections are checked before the counterparty.
    fn require<'a, T>(&self, counterparty: Option<&'a T>) -> CoreResult<&'a T> {
        if self.selections.is_empty() {
            return Err(CoreError::EmptySelection);
        }
        counterparty.ok_or(CoreError::MissingCounterparty {
            role: self.kind.counterparty_role(),
        })
    }

    /// Builds a confirmed sale with snapshot line items.
    ///
    /// ## Errors
    /// - [`CoreError::EmptySelection`] when nothing is selected
    /// - [`CoreError::MissingCounterparty`] when `customer` is `None`
    pub fn build_sale(&self, customer: Option<&Customer>, terms: &DocumentTerms) -> CoreResult<Sale> {
        let customer = self.require(customer)?;

        let mut sale = Sale {
            id: terms.document_id.clone(),
            customer_id: customer.id.clone(),
            customer_name: customer.name.clone(),
            customer_contact: customer.contact_number.clone(),
            sale_date: terms.date,
            invoice_number: terms.invoice_number.clone(),
            payment_method: terms.payment_method,
            status: DocumentStatus::Confirmed,
            tax_cents: terms.tax_cents,
            discount_cents: terms.discount_cents,
            amount_paid_cents: terms.amount_paid_cents,
            notes: terms.notes.clone(),
            items: self.selections.iter().map(Selection::to_sale_item).collect(),
            ..Default::default()
        };
        sale.prepare_for_save();
        Ok(sale)
    }

    /// Builds a confirmed purchase with snapshot line items.
    pub fn build_purchase(
        &self,
        supplier: Option<&Supplier>,
        terms: &DocumentTerms,
    ) -> CoreResult<Purchase> {
        let supplier = self.require(supplier)?;

        let mut purchase = Purchase {
            id: terms.document_id.clone(),
            supplier_id: supplier.id.clone(),
            supplier_name: supplier.name.clone(),
            supplier_contact: supplier.contact_number.clone(),
            purchase_date: terms.date,
            invoice_number: terms.invoice_number.clone(),
            payment_method: terms.payment_method,
            status: DocumentStatus::Confirmed,
            tax_cents: terms.tax_cents,
            discount_cents: terms.discount_cents,
            amount_paid_cents: terms.amount_paid_cents,
            notes: terms.notes.clone(),
            items: self
                .selections
                .iter()
                .map(Selection::to_purchase_item)
                .collect(),
            ..Default::default()
        };
        purchase.prepare_for_save();
        Ok(purchase)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, mrp: i64, purchase_price: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            category: Some("Grocery".to_string()),
            mrp_cents: mrp,
            purchase_price_cents: purchase_price,
            cost_price_cents: purchase_price,
            quantity: 10,
            ..Default::default()
        }
    }

    fn customer() -> Customer {
        Customer {
            id: "c1".to_string(),
            name: "Asha".to_string(),
            contact_number: "0300-1234567".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_same_product_merges() {
        let p1 = product("p1", 1000, 700);
        let mut builder = SelectionBuilder::new(TransactionKind::Sale);
        builder.add(Some(&p1));
        builder.add(Some(&p1));

        assert_eq!(builder.len(), 1);
        assert_eq!(builder.selections()[0].quantity, 2);
        assert_eq!(builder.subtotal().cents(), 2000);
    }

    #[test]
    fn test_add_none_is_noop() {
        let mut builder = SelectionBuilder::new(TransactionKind::Sale);
        builder.add(None);
        assert!(builder.is_empty());
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let mut builder = SelectionBuilder::new(TransactionKind::Sale);
        builder.add(Some(&product("p1", 1000, 700)));
        builder.remove(5);
        assert_eq!(builder.len(), 1);
        builder.remove(0);
        assert!(builder.is_empty());
        assert!(builder.subtotal().is_zero());
    }

    #[test]
    fn test_set_quantity_clamps_to_one() {
        let mut builder = SelectionBuilder::new(TransactionKind::Sale);
        builder.add(Some(&product("p1", 1000, 700)));
        builder.set_quantity(0, 0);
        assert_eq!(builder.selections()[0].quantity, 1);
        builder.set_quantity(0, 4);
        assert_eq!(builder.subtotal().cents(), 4000);
        builder.set_quantity(3, 9);
        assert_eq!(builder.subtotal().cents(), 4000);
    }

    #[test]
    fn test_set_unit_price_recomputes_subtotal() {
        let mut builder = SelectionBuilder::new(TransactionKind::Purchase);
        builder.add(Some(&product("p1", 1000, 700)));
        assert_eq!(builder.subtotal().cents(), 700);
        builder.set_unit_price(0, Money::from_cents(650));
        builder.set_quantity(0, 3);
        assert_eq!(builder.subtotal().cents(), 1950);
    }

    #[test]
    fn test_build_sale_validates_in_order() {
        let builder = SelectionBuilder::new(TransactionKind::Sale);
        let terms = DocumentTerms::default();
        let err = builder.build_sale(None, &terms).unwrap_err();
        assert!(matches!(err, CoreError::EmptySelection));

        let mut builder = builder;
        builder.add(Some(&product("p1", 1000, 700)));
        let err = builder.build_sale(None, &terms).unwrap_err();
        assert_eq!(err.to_string(), "No customer selected");
    }

    #[test]
    fn test_build_sale_snapshots_and_totals() {
        let mut builder = SelectionBuilder::new(TransactionKind::Sale);
        builder.add(Some(&product("p1", 1000, 700)));
        builder.add(Some(&product("p2", 500, 300)));
        builder.set_quantity(1, 2);

        let terms = DocumentTerms {
            tax_cents: 100,
            discount_cents: 200,
            amount_paid_cents: 1500,
            ..Default::default()
        };
        let sale = builder.build_sale(Some(&customer()), &terms).unwrap();

        assert_eq!(sale.customer_name, "Asha");
        assert_eq!(sale.status, DocumentStatus::Confirmed);
        assert_eq!(sale.items.len(), 2);
        assert_eq!(sale.items[0].category.as_deref(), Some("Grocery"));
        assert_eq!(sale.subtotal_cents, 2000);
        assert_eq!(sale.total_cents, 1900);
        assert_eq!(sale.amount_due_cents, 400);
        assert_eq!(sale.total_cost_cents, 700 + 600);
        assert_eq!(sale.total_profit_cents, (2000 - 200) - 1300);
    }

    #[test]
    fn test_build_purchase_requires_supplier() {
        let mut builder = SelectionBuilder::new(TransactionKind::Purchase);
        builder.add(Some(&product("p1", 1000, 700)));
        let err = builder
            .build_purchase(None, &DocumentTerms::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "No supplier selected");
    }

    #[test]
    fn test_unavailable_placeholder() {
        let line = SaleItem {
            product_id: "gone".to_string(),
            product_name: "Old Soap".to_string(),
            quantity: 3,
            price_per_item_cents: 250,
            ..Default::default()
        };
        let placeholder = Selection::unavailable(line);
        assert_eq!(placeholder.product.name, "Old Soap (Unavailable)");
        assert_eq!(placeholder.product.quantity, 0);
        assert_eq!(placeholder.line_total().cents(), 750);
        assert!(!placeholder.available);
    }

    #[test]
    fn test_restored_line_keeps_its_snapshot() {
        let saved = SaleItem {
            product_id: "p1".to_string(),
            product_name: "Soap".to_string(),
            quantity: 2,
            price_per_item_cents: 400,
            returned_quantity: 1,
            category: Some("Household".to_string()),
            brand: Some("Lifebuoy".to_string()),
            cost_price_cents: 300,
            ..Default::default()
        };

        // Today's product has been renamed and costs more
        let mut live = product("p1", 500, 350);
        live.name = "Soap XL".to_string();

        let mut builder = SelectionBuilder::new(TransactionKind::Sale);
        builder.restore(vec![
            Selection::restored(live, saved.clone()),
            Selection::unavailable(SaleItem {
                product_id: "gone".to_string(),
                product_name: "Comb".to_string(),
                quantity: 1,
                price_per_item_cents: 100,
                cost_price_cents: 60,
                ..Default::default()
            }),
        ]);
        builder.set_quantity(0, 3);

        let sale = builder
            .build_sale(Some(&customer()), &DocumentTerms::default())
            .unwrap();

        let first = &sale.items[0];
        assert_eq!(first.product_name, "Soap");
        assert_eq!(first.category.as_deref(), Some("Household"));
        assert_eq!(first.cost_price_cents, 300);
        assert_eq!(first.returned_quantity, 1);
        assert_eq!(first.quantity, 3);
        assert_eq!(first.total_price_cents, 1200);

        // The display suffix never reaches the saved name
        assert_eq!(sale.items[1].product_name, "Comb");
        assert_eq!(sale.total_cost_cents, 3 * 300 + 60);
    }

    #[test]
    fn test_restored_quantity_is_not_raised() {
        let line = PurchaseItem {
            product_id: "p1".to_string(),
            product_name: "Oil".to_string(),
            quantity: 0,
            price_per_item_cents: 700,
            batch_number: Some("B-7".to_string()),
            ..Default::default()
        };
        let selection = Selection::restored(product("p1", 1000, 700), line);
        assert_eq!(selection.quantity, 0);

        let mut builder = SelectionBuilder::new(TransactionKind::Purchase);
        builder.restore(vec![selection]);
        let supplier = Supplier {
            id: "s1".to_string(),
            name: "Metro".to_string(),
            ..Default::default()
        };
        let purchase = builder
            .build_purchase(Some(&supplier), &DocumentTerms::default())
            .unwrap();
        assert_eq!(purchase.items[0].quantity, 0);
        assert_eq!(purchase.items[0].batch_number.as_deref(), Some("B-7"));
        assert_eq!(purchase.subtotal_cents, 0);
    }

    #[test]
    fn test_clear_discards_everything() {
        let mut builder = SelectionBuilder::new(TransactionKind::Sale);
        builder.add(Some(&product("p1", 1000, 700)));
        builder.clear();
        assert!(builder.is_empty());
        assert!(builder.subtotal().is_zero());
    }
}
