//! # Notifications
//!
//! Records produced when a sale, purchase, return or damage report is
//! created. Delivery belongs to a collaborator; this module only decides
//! the title, body, kind, amount and metadata.
//!
//! `for_sale_return`, `for_purchase_return` and `for_damage` are the payload
//! contract for the return and damage flows, which live outside this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::money::Money;
use crate::types::{Purchase, Sale};

/// Event tag carried by every notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Sale,
    Purchase,
    ReturnSale,
    ReturnPurchase,
    Damage,
}

/// A human-readable event record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Empty until persisted.
    pub id: String,
    pub title: String,
    pub body: String,
    pub kind: NotificationKind,
    pub amount_cents: i64,
    /// Event-specific ids, e.g. `{"saleId": "..."}`.
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

impl Notification {
    fn new(
        kind: NotificationKind,
        title: &str,
        body: String,
        amount: Money,
        metadata: Value,
        now: DateTime<Utc>,
    ) -> Self {
        Notification {
            id: String::new(),
            title: title.to_string(),
            body,
            kind,
            amount_cents: amount.cents(),
            metadata,
            created_at: now,
            is_read: false,
        }
    }

    pub fn for_sale(sale: &Sale, now: DateTime<Utc>) -> Self {
        let amount = sale.total();
        Notification::new(
            NotificationKind::Sale,
            "New Sale!",
            format!("Sale of {} recorded.", amount),
            amount,
            json!({ "saleId": sale.id }),
            now,
        )
    }

    pub fn for_purchase(purchase: &Purchase, now: DateTime<Utc>) -> Self {
        let amount = purchase.total();
        let supplier = if purchase.supplier_name.is_empty() {
            "Supplier"
        } else {
            purchase.supplier_name.as_str()
        };
        Notification::new(
            NotificationKind::Purchase,
            "New Purchase",
            format!("Purchase of {} from {}.", amount, supplier),
            amount,
            json!({ "purchaseId": purchase.id }),
            now,
        )
    }

    pub fn for_sale_return(return_id: &str, refund: Money, now: DateTime<Utc>) -> Self {
        Notification::new(
            NotificationKind::ReturnSale,
            "Sale Return",
            format!("Return processed for {}.", refund),
            refund,
            json!({ "returnId": return_id }),
            now,
        )
    }

    pub fn for_purchase_return(return_id: &str, refund: Money, now: DateTime<Utc>) -> Self {
        Notification::new(
            NotificationKind::ReturnPurchase,
            "Purchase Return",
            format!("Purchase return processed for {}.", refund),
            refund,
            json!({ "returnId": return_id }),
            now,
        )
    }

    pub fn for_damage(damage_id: &str, loss: Money, now: DateTime<Utc>) -> Self {
        Notification::new(
            NotificationKind::Damage,
            "Damage Recorded",
            format!("Damage reported value: {}.", loss),
            loss,
            json!({ "damageId": damage_id }),
            now,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_notification_wording() {
        let sale = Sale {
            id: "s-1".to_string(),
            total_cents: 12_550,
            ..Default::default()
        };
        let n = Notification::for_sale(&sale, Utc::now());
        assert_eq!(n.title, "New Sale!");
        assert_eq!(n.body, "Sale of $125.50 recorded.");
        assert_eq!(n.kind, NotificationKind::Sale);
        assert_eq!(n.metadata["saleId"], "s-1");
        assert!(!n.is_read);
    }

    #[test]
    fn test_purchase_falls_back_to_generic_supplier() {
        let purchase = Purchase {
            total_cents: 500,
            ..Default::default()
        };
        let n = Notification::for_purchase(&purchase, Utc::now());
        assert_eq!(n.body, "Purchase of $5.00 from Supplier.");
    }

    #[test]
    fn test_kind_serializes_as_event_tag() {
        let tag = serde_json::to_string(&NotificationKind::ReturnPurchase).unwrap();
        assert_eq!(tag, "\"RETURN_PURCHASE\"");
    }

    #[test]
    fn test_return_and_damage_payloads() {
        let now = Utc::now();

        let n = Notification::for_sale_return("r-1", Money::from_cents(1_000), now);
        assert_eq!(n.kind, NotificationKind::ReturnSale);
        assert_eq!(n.body, "Return processed for $10.00.");
        assert_eq!(n.metadata["returnId"], "r-1");

        let n = Notification::for_purchase_return("r-2", Money::from_cents(250), now);
        assert_eq!(n.title, "Purchase Return");
        assert_eq!(n.amount_cents, 250);

        let n = Notification::for_damage("d-1", Money::from_cents(75), now);
        assert_eq!(n.kind, NotificationKind::Damage);
        assert_eq!(n.body, "Damage reported value: $0.75.");
        assert_eq!(n.metadata["damageId"], "d-1");
    }
}
