//! # Domain Types
//!
//! Input snapshots handed to the engine and the resolved lines it returns.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  INPUT (immutable snapshots, already fetched by the caller)            │
//! │                                                                         │
//! │  Transaction ─┬─ Order          { products: [LineItem], user }         │
//! │               └─ ManualPayment  { store:    [LineItem], last_admin_edit}│
//! │                                                                         │
//! │  LineItem { product_ref, product?: ProductRecord, quantity, price? }   │
//! │                                                                         │
//! │  ProductRecord { price, discount, cost, brand, category, tone, color,  │
//! │                  master?: ProductRecord }                              │
//! │                                                                         │
//! │  OUTPUT (created fresh per run, discarded after rendering)             │
//! │                                                                         │
//! │  ResolvedLine { real_price, sold_price, line_total, discount_kind,     │
//! │                 profit_total, margin_percent, transaction_id, ... }    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Raw amounts are `Decimal` (exactly what the source recorded); amounts the
//! engine rounds are `Money`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::pricing::PricingTrace;

// =============================================================================
// Products
// =============================================================================

/// A product snapshot as resolved by the data-access collaborator.
///
/// A product may redirect to a master product through `master` (the catalog
/// "ref" pointer). See [`crate::pricing::ResolvedProduct`] for which fields
/// are taken from the master and which stay with the instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductRecord {
    pub id: String,
    pub name: Option<String>,
    /// Catalog ("real") price.
    pub price: Option<Decimal>,
    /// Stored discount value: a fraction (0.1), a percentage (10), or junk.
    pub discount: Option<Decimal>,
    /// Unit cost.
    pub cost: Option<Decimal>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub tone: Option<String>,
    pub color: Option<String>,
    /// Master product this instance redirects to.
    #[serde(rename = "ref")]
    pub master: Option<Box<ProductRecord>>,
}

// =============================================================================
// Line Items
// =============================================================================

/// One product entry within a transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    /// Identifier of the referenced product.
    pub product_ref: String,
    /// Resolved product, `None` when the reference could not be resolved.
    pub product: Option<ProductRecord>,
    pub quantity: i64,
    /// Literal price recorded on the line, if any.
    pub price: Option<Decimal>,
}

// =============================================================================
// Users
// =============================================================================

/// A user attached to a transaction (purchaser or last editor).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserRef {
    pub id: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
}

impl UserRef {
    /// Name shown on report lines (trimmed full name, or empty).
    pub fn display_name(&self) -> String {
        self.full_name
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string()
    }
}

// =============================================================================
// Statuses
// =============================================================================

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Approved,
    Declined,
    Preparing,
    Dispatched,
    Delivered,
    Returned,
}

impl OrderStatus {
    /// Orders count as sales once approved, and stay sales while shipping.
    pub fn is_reportable(&self) -> bool {
        matches!(
            self,
            OrderStatus::Approved | OrderStatus::Dispatched | OrderStatus::Delivered
        )
    }
}

/// Status of a manually registered payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Cancelled,
}

// =============================================================================
// Transactions
// =============================================================================

/// An online order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// Authoritative total; may be absent, zero, or negative.
    #[serde(default)]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub payment_method: Option<String>,
    /// Purchaser.
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub products: Vec<LineItem>,
}

/// A payment registered by hand in the back office.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualPaymentRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// Admin-entered total; may be absent, zero, or negative.
    #[serde(default)]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub status: Option<PaymentStatus>,
    /// Whether the payment settles a store purchase.
    #[serde(default)]
    pub is_store: Option<bool>,
    /// Last admin who edited the payment.
    #[serde(default)]
    pub last_admin_edit: Option<UserRef>,
    #[serde(default)]
    pub store: Vec<LineItem>,
}

/// A reportable transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transaction {
    Order(OrderRecord),
    ManualPayment(ManualPaymentRecord),
}

impl Transaction {
    pub fn kind(&self) -> TransactionKind {
        match self {
            Transaction::Order(_) => TransactionKind::Order,
            Transaction::ManualPayment(_) => TransactionKind::ManualPayment,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Transaction::Order(order) => &order.id,
            Transaction::ManualPayment(payment) => &payment.id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Transaction::Order(order) => order.created_at,
            Transaction::ManualPayment(payment) => payment.created_at,
        }
    }
}

/// Which shape a transaction came in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Order,
    ManualPayment,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Order => write!(f, "order"),
            TransactionKind::ManualPayment => write!(f, "manual_payment"),
        }
    }
}

// =============================================================================
// Discount Kind
// =============================================================================

/// Which discounts shaped a line's sold price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// Sold at the catalog price.
    #[default]
    None,
    /// Only a product/line discount.
    Individual,
    /// Only the inferred order-level discount.
    Order,
    /// Individual discount, then the order-level discount on top.
    Both,
}

impl DiscountKind {
    /// Classifies a line from its two discount flags.
    pub fn classify(has_individual_discount: bool, has_order_discount: bool) -> Self {
        match (has_individual_discount, has_order_discount) {
            (false, false) => DiscountKind::None,
            (true, false) => DiscountKind::Individual,
            (false, true) => DiscountKind::Order,
            (true, true) => DiscountKind::Both,
        }
    }
}

// =============================================================================
// Resolved Line
// =============================================================================

/// One line of the detailed sales report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResolvedLine {
    pub product_name: String,
    pub brand: String,
    pub category: String,
    pub tone: String,
    pub quantity: i64,

    /// Catalog price of the (master) product.
    #[ts(as = "String")]
    pub real_price: Decimal,
    /// Price after the individual discount only ("base price").
    #[ts(as = "String")]
    pub individual_price: Decimal,
    /// Rounded unit price actually charged.
    pub sold_price: Money,
    /// Rounded line amount; sums to the transaction target.
    pub line_total: Money,

    pub discount_kind: DiscountKind,
    /// Effective discount against the catalog price, 0..=100, two decimals.
    #[ts(as = "String")]
    pub discount_percent: Decimal,
    pub has_order_discount: bool,
    /// Order-level factor rounded to four decimals (display only).
    #[ts(as = "String")]
    pub order_factor: Decimal,

    #[ts(as = "String")]
    pub cost: Decimal,
    #[ts(as = "String")]
    pub profit_per_unit: Decimal,
    #[ts(as = "String")]
    pub profit_total: Decimal,
    /// Profit over cost, two decimals; 0 when cost is 0.
    #[ts(as = "String")]
    pub margin_percent: Decimal,

    pub transaction_id: String,
    pub transaction_kind: TransactionKind,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    /// Purchaser for orders, last editor for manual payments.
    pub user_name: String,

    /// Pricing decisions behind this line (only when tracing is enabled).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub trace: Option<PricingTrace>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_kind_classify() {
        assert_eq!(DiscountKind::classify(false, false), DiscountKind::None);
        assert_eq!(DiscountKind::classify(true, false), DiscountKind::Individual);
        assert_eq!(DiscountKind::classify(false, true), DiscountKind::Order);
        assert_eq!(DiscountKind::classify(true, true), DiscountKind::Both);
        assert_eq!(DiscountKind::default(), DiscountKind::None);
    }

    #[test]
    fn test_order_status_reportable() {
        assert!(OrderStatus::Approved.is_reportable());
        assert!(OrderStatus::Dispatched.is_reportable());
        assert!(OrderStatus::Delivered.is_reportable());
        assert!(!OrderStatus::Pending.is_reportable());
        assert!(!OrderStatus::Declined.is_reportable());
        assert!(!OrderStatus::Returned.is_reportable());
    }

    #[test]
    fn test_user_display_name_trims() {
        let user = UserRef {
            full_name: Some("  Ana Gómez ".to_string()),
            ..Default::default()
        };
        assert_eq!(user.display_name(), "Ana Gómez");
        assert_eq!(UserRef::default().display_name(), "");
    }

    #[test]
    fn test_transaction_deserializes_tagged() {
        let json = r#"{
            "kind": "manual_payment",
            "id": "pay-1",
            "created_at": "2025-03-01T15:00:00Z",
            "total": 500,
            "status": "approved",
            "is_store": true,
            "store": [{ "product_ref": "p-1", "quantity": 2, "price": "200" }]
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.kind(), TransactionKind::ManualPayment);
        assert_eq!(tx.id(), "pay-1");
        match tx {
            Transaction::ManualPayment(payment) => {
                assert_eq!(payment.total, Some(Decimal::from(500)));
                assert_eq!(payment.store.len(), 1);
                assert_eq!(payment.store[0].quantity, 2);
                assert!(payment.store[0].product.is_none());
            }
            Transaction::Order(_) => panic!("expected a manual payment"),
        }
    }

    #[test]
    fn test_product_master_uses_ref_key() {
        let json = r#"{ "id": "tone-1", "color": "Rose", "ref": { "id": "master-1", "price": 50000 } }"#;
        let product: ProductRecord = serde_json::from_str(json).unwrap();
        let master = product.master.expect("master");
        assert_eq!(master.id, "master-1");
        assert_eq!(master.price, Some(Decimal::from(50000)));
    }
}
