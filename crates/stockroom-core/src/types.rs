//! # Domain Types
//!
//! One canonical representation per entity.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    Purchase     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  customer snap  │   │  supplier snap  │       │
//! │  │  quantity       │   │  items[]        │   │  items[]        │       │
//! │  │  5 price fields │   │  product_ids[]  │   │  product_ids[]  │       │
//! │  └─────────────────┘   │  total_cost     │   └─────────────────┘       │
//! │                        │  total_profit   │                              │
//! │                        └─────────────────┘                              │
//! │                                                                         │
//! │  Traits shared across variants:                                         │
//! │  • ReturnableItem ← SaleItem, PurchaseItem                             │
//! │  • Person         ← Customer, Supplier                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Permissive Reads
//! Stored records are decoded with `#[serde(default)]`: a missing number
//! reads as 0, a missing string as empty. Unknown enum strings decode to an
//! `Other`/`Unknown` variant instead of failing the whole document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Transaction Kind
// =============================================================================

/// Which side of the stock ledger a document sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Sale,
    Purchase,
}

impl TransactionKind {
    /// Sign applied to line quantities when adjusting stock.
    ///
    /// ```text
    /// Sale     → −1  (stock leaves the shelf)
    /// Purchase → +1  (stock arrives)
    /// ```
    #[inline]
    pub const fn stock_sign(&self) -> i64 {
        match self {
            TransactionKind::Sale => -1,
            TransactionKind::Purchase => 1,
        }
    }

    /// Name of the counterparty role, used in validation messages.
    pub const fn counterparty_role(&self) -> &'static str {
        match self {
            TransactionKind::Sale => "customer",
            TransactionKind::Purchase => "supplier",
        }
    }

    /// Price a fresh selection starts at.
    ///
    /// Sales default to the product's MRP, purchases to its purchase price.
    pub fn default_unit_price(&self, product: &Product) -> Money {
        match self {
            TransactionKind::Sale => product.mrp(),
            TransactionKind::Purchase => Money::from_cents(product.purchase_price_cents),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog entry.
///
/// `quantity` is the live stock level. It is only ever moved by stock deltas
/// and is allowed to go negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(default)]
pub struct Product {
    /// Document id. Empty means not yet persisted.
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub barcode: Option<String>,
    pub product_code: Option<String>,
    pub image_url: Option<String>,

    /// Current stock level.
    pub quantity: i64,
    pub min_stock_level: i64,

    /// Five independent prices, in cents. No relationship is enforced.
    pub cost_price_cents: i64,
    pub purchase_price_cents: i64,
    pub mrp_cents: i64,
    pub wholesale_price_cents: i64,
    pub dealer_price_cents: i64,

    /// Supplier snapshot (not a live reference).
    pub supplier_id: Option<String>,
    pub supplier_name: Option<String>,

    pub expiry_date: Option<DateTime<Utc>>,
    pub batch_number: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn mrp(&self) -> Money {
        Money::from_cents(self.mrp_cents)
    }

    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_cents(self.cost_price_cents)
    }

    /// At or below the configured minimum.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_stock_level
    }

    /// True when the trimmed query is a case-insensitive substring of the
    /// name or product code.
    pub fn matches_search(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        if self.name.to_lowercase().contains(&needle) {
            return true;
        }
        self.product_code
            .as_deref()
            .map(|code| code.to_lowercase().contains(&needle))
            .unwrap_or(false)
    }
}

// =============================================================================
// Enums
// =============================================================================

/// How a document was (or will be) paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    BankTransfer,
    MobileWallet,
    Credit,
    /// Anything not recognised when reading a stored document.
    #[serde(other)]
    Other,
}

/// Lifecycle tag of a financial document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    #[default]
    Confirmed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

// =============================================================================
// Line Items
// =============================================================================

/// Read access shared by sale and purchase line items.
pub trait ReturnableItem {
    fn product_id(&self) -> &str;
    fn product_name(&self) -> &str;
    fn quantity(&self) -> i64;
    fn price_per_item(&self) -> Money;
    fn returned_quantity(&self) -> i64;

    /// Units still eligible for a return.
    fn returnable_quantity(&self) -> i64 {
        (self.quantity() - self.returned_quantity()).max(0)
    }
}

/// A line in a sale. Name, price and cost are snapshots taken at creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaleItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub price_per_item_cents: i64,
    /// `quantity × price_per_item`, recomputed on every save.
    pub total_price_cents: i64,
    pub returned_quantity: i64,
    pub category: Option<String>,
    pub brand: Option<String>,
    /// Cost snapshot used for historical profit.
    pub cost_price_cents: i64,
}

impl ReturnableItem for SaleItem {
    fn product_id(&self) -> &str {
        &self.product_id
    }

    fn product_name(&self) -> &str {
        &self.product_name
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }

    fn price_per_item(&self) -> Money {
        Money::from_cents(self.price_per_item_cents)
    }

    fn returned_quantity(&self) -> i64 {
        self.returned_quantity
    }
}

/// A line in a purchase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchaseItem {
    pub product_id: String,
    pub product_name: String,
    pub product_code: Option<String>,
    pub quantity: i64,
    pub price_per_item_cents: i64,
    pub total_price_cents: i64,
    pub returned_quantity: i64,
    /// Rates in basis points, informational per line.
    pub tax_rate_bps: u32,
    pub discount_rate_bps: u32,
    pub batch_number: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl ReturnableItem for PurchaseItem {
    fn product_id(&self) -> &str {
        &self.product_id
    }

    fn product_name(&self) -> &str {
        &self.product_name
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }

    fn price_per_item(&self) -> Money {
        Money::from_cents(self.price_per_item_cents)
    }

    fn returned_quantity(&self) -> i64 {
        self.returned_quantity
    }
}

// =============================================================================
// Financial Documents
// =============================================================================

/// A sale to a customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sale {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub customer_contact: String,
    pub sale_date: DateTime<Utc>,
    pub invoice_number: Option<String>,
    pub payment_method: PaymentMethod,
    pub status: DocumentStatus,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub amount_paid_cents: i64,
    /// `total − amount_paid`.
    pub amount_due_cents: i64,
    /// `Σ cost_price × quantity`, frozen at save.
    pub total_cost_cents: i64,
    /// `(subtotal − discount) − total_cost`, frozen at save.
    pub total_profit_cents: i64,
    pub notes: Option<String>,
    pub items: Vec<SaleItem>,
    /// Denormalised for containment queries.
    pub product_ids: Vec<String>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A purchase from a supplier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Purchase {
    pub id: String,
    pub supplier_id: String,
    pub supplier_name: String,
    pub supplier_contact: String,
    pub purchase_date: DateTime<Utc>,
    pub purchase_order_number: Option<String>,
    pub invoice_number: Option<String>,
    pub delivery_status: Option<String>,
    pub payment_method: PaymentMethod,
    pub status: DocumentStatus,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub amount_paid_cents: i64,
    pub amount_due_cents: i64,
    pub notes: Option<String>,
    pub items: Vec<PurchaseItem>,
    pub product_ids: Vec<String>,
}

impl Purchase {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Counterparties
// =============================================================================

/// Shape shared by customers and suppliers.
pub trait Person {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn name(&self) -> &str;
    fn contact_number(&self) -> &str;
    fn address(&self) -> &str;
    fn age(&self) -> u32;
    fn photo(&self) -> Option<&str>;
    fn is_active(&self) -> bool;
    fn set_active(&mut self, active: bool);
}

/// Implements [`Person`] for a record with the standard field names.
macro_rules! impl_person {
    ($ty:ty) => {
        impl Person for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn contact_number(&self) -> &str {
                &self.contact_number
            }

            fn address(&self) -> &str {
                &self.address
            }

            fn age(&self) -> u32 {
                self.age
            }

            fn photo(&self) -> Option<&str> {
                self.photo.as_deref()
            }

            fn is_active(&self) -> bool {
                self.is_active
            }

            fn set_active(&mut self, active: bool) {
                self.is_active = active;
            }
        }
    };
}

/// A buyer. Soft-deleted through `is_active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub contact_number: String,
    pub address: String,
    pub age: u32,
    pub photo: Option<String>,
    pub is_active: bool,
    pub customer_type: Option<String>,
    pub credit_limit_cents: i64,
    pub outstanding_balance_cents: i64,
    pub total_purchase_cents: i64,
    pub discount_rate_bps: u32,
    pub created_at: DateTime<Utc>,
}

impl Default for Customer {
    fn default() -> Self {
        Customer {
            id: String::new(),
            name: String::new(),
            contact_number: String::new(),
            address: String::new(),
            age: 0,
            photo: None,
            is_active: true,
            customer_type: None,
            credit_limit_cents: 0,
            outstanding_balance_cents: 0,
            total_purchase_cents: 0,
            discount_rate_bps: 0,
            created_at: DateTime::<Utc>::default(),
        }
    }
}

impl_person!(Customer);

/// A vendor. Soft-deleted through `is_active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact_number: String,
    pub address: String,
    pub age: u32,
    pub photo: Option<String>,
    pub is_active: bool,
    pub supplier_type: Option<String>,
    pub payment_terms: Option<String>,
    pub lead_time_days: u32,
    pub outstanding_payment_cents: i64,
    pub total_supply_cents: i64,
    pub preferred: bool,
    pub created_at: DateTime<Utc>,
}

impl Default for Supplier {
    fn default() -> Self {
        Supplier {
            id: String::new(),
            name: String::new(),
            contact_number: String::new(),
            address: String::new(),
            age: 0,
            photo: None,
            is_active: true,
            supplier_type: None,
            payment_terms: None,
            lead_time_days: 0,
            outstanding_payment_cents: 0,
            total_supply_cents: 0,
            preferred: false,
            created_at: DateTime::<Utc>::default(),
        }
    }
}

impl_person!(Supplier);

// =============================================================================
// Expense
// =============================================================================

/// Money spent outside of purchases (rent, utilities).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(default)]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub amount_cents: i64,
    pub category: Option<String>,
    pub expense_date: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_sign() {
        assert_eq!(TransactionKind::Sale.stock_sign(), -1);
        assert_eq!(TransactionKind::Purchase.stock_sign(), 1);
    }

    #[test]
    fn test_default_unit_price_by_kind() {
        let product = Product {
            mrp_cents: 1500,
            purchase_price_cents: 900,
            ..Default::default()
        };
        assert_eq!(TransactionKind::Sale.default_unit_price(&product).cents(), 1500);
        assert_eq!(TransactionKind::Purchase.default_unit_price(&product).cents(), 900);
    }

    #[test]
    fn test_search_matches_name_or_code_case_insensitive() {
        let product = Product {
            name: "Basmati Rice 5kg".to_string(),
            product_code: Some("RC-005".to_string()),
            ..Default::default()
        };
        assert!(product.matches_search("rice"));
        assert!(product.matches_search("rc-0"));
        assert!(product.matches_search("  "));
        assert!(!product.matches_search("sugar"));
    }

    #[test]
    fn test_permissive_read_fills_defaults() {
        let sale: Sale = serde_json::from_str(r#"{"id":"s1","items":[{"product_id":"p1"}]}"#).unwrap();
        assert_eq!(sale.id, "s1");
        assert_eq!(sale.total_cents, 0);
        assert_eq!(sale.customer_name, "");
        assert_eq!(sale.items[0].quantity, 0);
        assert_eq!(sale.status, DocumentStatus::Confirmed);
    }

    #[test]
    fn test_unknown_enum_strings_fall_back() {
        let sale: Sale =
            serde_json::from_str(r#"{"payment_method":"cheque","status":"archived"}"#).unwrap();
        assert_eq!(sale.payment_method, PaymentMethod::Other);
        assert_eq!(sale.status, DocumentStatus::Unknown);
    }

    #[test]
    fn test_returnable_quantity_never_negative() {
        let item = SaleItem {
            quantity: 3,
            returned_quantity: 5,
            ..Default::default()
        };
        assert_eq!(item.returnable_quantity(), 0);
    }

    #[test]
    fn test_counterparties_start_active() {
        assert!(Customer::default().is_active());
        let mut supplier = Supplier::default();
        supplier.set_active(false);
        assert!(!supplier.is_active());
    }
}
