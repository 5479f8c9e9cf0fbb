//! # Financial Documents
//!
//! The seam between the selection builder and the transactional writer.
//!
//! ## Save Preparation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    prepare_for_save()                                   │
//! │                                                                         │
//! │  caller state (possibly stale)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. item.total_price = line_item_total(price, qty)   for every item    │
//! │  2. subtotal         = Σ item.total_price                              │
//! │  3. total            = document_total(subtotal, tax, discount)         │
//! │  4. amount_due       = total − amount_paid                             │
//! │  5. product_ids      = distinct non-empty item product ids             │
//! │  6. (sale only) total_cost, total_profit                               │
//! │                                                                         │
//! │  Nothing computed by the caller is trusted.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::money::{document_total, line_item_total, Money};
use crate::types::{Purchase, ReturnableItem, Sale, TransactionKind};

/// A sale or purchase as seen by the writer.
pub trait FinancialDocument {
    /// Which side of the stock ledger this document moves.
    const KIND: TransactionKind;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn counterparty_id(&self) -> &str;
    fn counterparty_name(&self) -> &str;
    fn document_date(&self) -> DateTime<Utc>;
    fn total(&self) -> Money;
    fn product_ids(&self) -> &[String];

    /// `(product_id, quantity)` per line, in line order.
    fn line_quantities(&self) -> Vec<(&str, i64)>;

    /// Recomputes every derived field from line items and header amounts.
    fn prepare_for_save(&mut self);

    /// Signed stock movement per referenced product.
    ///
    /// Lines pointing at the same product are merged. Lines with an empty
    /// product id move no stock.
    fn stock_deltas(&self) -> BTreeMap<String, i64> {
        let sign = Self::KIND.stock_sign();
        let mut deltas = BTreeMap::new();
        for (product_id, quantity) in self.line_quantities() {
            if product_id.is_empty() {
                continue;
            }
            *deltas.entry(product_id.to_string()).or_insert(0) += sign * quantity;
        }
        deltas
    }
}

/// Stock movement needed to go from `previous` to `next`.
///
/// With no previous version every referenced product is listed, even at a
/// zero delta, so a missing product is still detected. When replacing a
/// stored version only non-zero differences are returned.
pub fn stock_delta_difference<D: FinancialDocument>(
    previous: Option<&D>,
    next: &D,
) -> BTreeMap<String, i64> {
    let mut deltas = next.stock_deltas();
    let Some(previous) = previous else {
        return deltas;
    };
    for (product_id, old) in previous.stock_deltas() {
        *deltas.entry(product_id).or_insert(0) -= old;
    }
    deltas.retain(|_, delta| *delta != 0);
    deltas
}

fn distinct_product_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for id in ids {
        if !id.is_empty() && !out.iter().any(|seen| seen == id) {
            out.push(id.to_string());
        }
    }
    out
}

impl FinancialDocument for Sale {
    const KIND: TransactionKind = TransactionKind::Sale;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn counterparty_id(&self) -> &str {
        &self.customer_id
    }

    fn counterparty_name(&self) -> &str {
        &self.customer_name
    }

    fn document_date(&self) -> DateTime<Utc> {
        self.sale_date
    }

    fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    fn product_ids(&self) -> &[String] {
        &self.product_ids
    }

    fn line_quantities(&self) -> Vec<(&str, i64)> {
        self.items
            .iter()
            .map(|item| (item.product_id.as_str(), item.quantity))
            .collect()
    }

    fn prepare_for_save(&mut self) {
        let mut subtotal = Money::zero();
        let mut total_cost = Money::zero();
        for item in &mut self.items {
            let line = line_item_total(item.price_per_item(), item.quantity);
            item.total_price_cents = line.cents();
            subtotal += line;
            total_cost += line_item_total(Money::from_cents(item.cost_price_cents), item.quantity);
        }

        let discount = Money::from_cents(self.discount_cents);
        let total = document_total(subtotal, Money::from_cents(self.tax_cents), discount);

        self.subtotal_cents = subtotal.cents();
        self.total_cents = total.cents();
        self.amount_due_cents = (total - Money::from_cents(self.amount_paid_cents)).cents();
        self.total_cost_cents = total_cost.cents();
        self.total_profit_cents = ((subtotal - discount) - total_cost).cents();
        self.product_ids = distinct_product_ids(self.items.iter().map(|i| i.product_id.as_str()));
    }
}

impl FinancialDocument for Purchase {
    const KIND: TransactionKind = TransactionKind::Purchase;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn counterparty_id(&self) -> &str {
        &self.supplier_id
    }

    fn counterparty_name(&self) -> &str {
        &self.supplier_name
    }

    fn document_date(&self) -> DateTime<Utc> {
        self.purchase_date
    }

    fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    fn product_ids(&self) -> &[String] {
        &self.product_ids
    }

    fn line_quantities(&self) -> Vec<(&str, i64)> {
        self.items
            .iter()
            .map(|item| (item.product_id.as_str(), item.quantity))
            .collect()
    }

    fn prepare_for_save(&mut self) {
        let mut subtotal = Money::zero();
        for item in &mut self.items {
            let line = line_item_total(item.price_per_item(), item.quantity);
            item.total_price_cents = line.cents();
            subtotal += line;
        }

        let total = document_total(
            subtotal,
            Money::from_cents(self.tax_cents),
            Money::from_cents(self.discount_cents),
        );

        self.subtotal_cents = subtotal.cents();
        self.total_cents = total.cents();
        self.amount_due_cents = (total - Money::from_cents(self.amount_paid_cents)).cents();
        self.product_ids = distinct_product_ids(self.items.iter().map(|i| i.product_id.as_str()));
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
