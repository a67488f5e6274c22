//! # Transaction Normalizer
//!
//! Adapts orders and manual payments into one canonical line stream.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Order                             ManualPayment                       │
//! │  ├── products: [LineItem]          ├── store: [LineItem]               │
//! │  └── user (purchaser)              └── last_admin_edit (editor)        │
//! │           │                                   │                         │
//! │           └───────────────┬───────────────────┘                         │
//! │                           ▼                                             │
//! │  NormalizedTransaction { header: kind, id, timestamp,                  │
//! │                                  recorded total, user name,            │
//! │                          items: &[LineItem] (input order) }            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Normalization borrows from the input; nothing is copied but the user name.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;

use crate::types::{
    LineItem, ManualPaymentRecord, OrderRecord, PaymentStatus, Transaction, TransactionKind,
};

/// Payment method of orders settled through a referral program.
pub const REFERRED_PAYMENT_METHOD: &str = "referred";

// =============================================================================
// Canonical Shapes
// =============================================================================

/// Fields every line inherits from its transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionHeader<'a> {
    pub kind: TransactionKind,
    pub id: &'a str,
    pub timestamp: DateTime<Utc>,
    pub recorded_total: Option<Decimal>,
    /// Purchaser for orders, last editor for manual payments.
    pub user_name: String,
}

/// A transaction reduced to its header and its ordered items.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTransaction<'a> {
    pub header: TransactionHeader<'a>,
    pub items: &'a [LineItem],
}

/// One item tagged with its owning transaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanonicalLine<'a> {
    pub header: &'a TransactionHeader<'a>,
    /// Zero-based position within the transaction.
    pub position: usize,
    pub item: &'a LineItem,
}

impl<'a> NormalizedTransaction<'a> {
    /// Lines in input order.
    pub fn lines(&'a self) -> impl Iterator<Item = CanonicalLine<'a>> + 'a {
        self.items
            .iter()
            .enumerate()
            .map(move |(position, item)| CanonicalLine {
                header: &self.header,
                position,
                item,
            })
    }
}

/// Normalizes a transaction of either kind.
pub fn normalize(tx: &Transaction) -> NormalizedTransaction<'_> {
    match tx {
        Transaction::Order(order) => normalize_order(order),
        Transaction::ManualPayment(payment) => normalize_payment(payment),
    }
}

fn normalize_order(order: &OrderRecord) -> NormalizedTransaction<'_> {
    NormalizedTransaction {
        header: TransactionHeader {
            kind: TransactionKind::Order,
            id: &order.id,
            timestamp: order.created_at,
            recorded_total: order.total,
            user_name: order.user.as_ref().map(|u| u.display_name()).unwrap_or_default(),
        },
        items: &order.products,
    }
}

fn normalize_payment(payment: &ManualPaymentRecord) -> NormalizedTransaction<'_> {
    NormalizedTransaction {
        header: TransactionHeader {
            kind: TransactionKind::ManualPayment,
            id: &payment.id,
            timestamp: payment.created_at,
            recorded_total: payment.total,
            user_name: payment
                .last_admin_edit
                .as_ref()
                .map(|u| u.display_name())
                .unwrap_or_default(),
        },
        items: &payment.store,
    }
}

// =============================================================================
// Eligibility
// =============================================================================

/// Why a transaction is left out of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotReportableStatus(String),
    ReferredPayment,
    BlankPaymentMethod,
    NotStorePayment,
    NoItems,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotReportableStatus(status) => write!(f, "status {} is not a sale", status),
            SkipReason::ReferredPayment => write!(f, "paid through referral"),
            SkipReason::BlankPaymentMethod => write!(f, "payment method is blank"),
            SkipReason::NotStorePayment => write!(f, "not a store payment"),
            SkipReason::NoItems => write!(f, "no items"),
        }
    }
}

/// Checks whether a transaction counts as a sale.
///
/// ## Rules
/// - Orders: status Approved, Dispatched or Delivered; payment method not
///   blank and not `referred`; at least one item
/// - Manual payments: status Approved; flagged as a store payment; at least
///   one item
/// - An absent status, payment method or store flag means the caller already
///   filtered on it
pub fn check_eligibility(tx: &Transaction) -> Result<(), SkipReason> {
    match tx {
        Transaction::Order(order) => {
            if let Some(status) = order.status {
                if !status.is_reportable() {
                    return Err(SkipReason::NotReportableStatus(format!("{:?}", status)));
                }
            }
            if let Some(method) = order.payment_method.as_deref().map(str::trim) {
                if method.is_empty() {
                    return Err(SkipReason::BlankPaymentMethod);
                }
                if method.eq_ignore_ascii_case(REFERRED_PAYMENT_METHOD) {
                    return Err(SkipReason::ReferredPayment);
                }
            }
            if order.products.is_empty() {
                return Err(SkipReason::NoItems);
            }
        }
        Transaction::ManualPayment(payment) => {
            if let Some(status) = payment.status {
                if status != PaymentStatus::Approved {
                    return Err(SkipReason::NotReportableStatus(format!("{:?}", status)));
                }
            }
            if payment.is_store == Some(false) {
                return Err(SkipReason::NotStorePayment);
            }
            if payment.store.is_empty() {
                return Err(SkipReason::NoItems);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{item, order, payment, product};
    use crate::types::OrderStatus;

    #[test]
    fn test_order_header_uses_purchaser() {
        let tx = order(
            "o-1",
            "2025-03-10T15:00:00Z",
            Some(Decimal::from(100)),
            vec![item(product("a", 50), 1, None), item(product("b", 50), 1, None)],
        );
        let normalized = normalize(&tx);
        assert_eq!(normalized.header.kind, TransactionKind::Order);
        assert_eq!(normalized.header.id, "o-1");
        assert_eq!(normalized.header.user_name, "Ana Gómez");
        assert_eq!(normalized.header.recorded_total, Some(Decimal::from(100)));

        let refs: Vec<_> = normalized.lines().map(|l| (l.position, l.item.product_ref.as_str())).collect();
        assert_eq!(refs, vec![(0, "a"), (1, "b")]);
    }

    #[test]
    fn test_payment_header_uses_last_editor() {
        let tx = payment("p-1", "2025-03-10T15:00:00Z", None, vec![item(product("a", 50), 1, None)]);
        let normalized = normalize(&tx);
        assert_eq!(normalized.header.kind, TransactionKind::ManualPayment);
        assert_eq!(normalized.header.user_name, "Admin Ruiz");
        assert_eq!(normalized.items.len(), 1);
        assert!(normalized.lines().all(|l| l.header.id == "p-1"));
    }

    #[test]
    fn test_order_eligibility() {
        let items = vec![item(product("a", 50), 1, None)];
        assert!(check_eligibility(&order("o", "2025-03-10T15:00:00Z", None, items.clone())).is_ok());

        let mut tx = order("o", "2025-03-10T15:00:00Z", None, items.clone());
        if let Transaction::Order(ref mut o) = tx {
            o.status = Some(OrderStatus::Pending);
        }
        assert!(matches!(check_eligibility(&tx), Err(SkipReason::NotReportableStatus(_))));

        let mut tx = order("o", "2025-03-10T15:00:00Z", None, items.clone());
        if let Transaction::Order(ref mut o) = tx {
            o.payment_method = Some(" Referred ".to_string());
        }
        assert_eq!(check_eligibility(&tx), Err(SkipReason::ReferredPayment));

        for blank in ["", "   "] {
            let mut tx = order("o", "2025-03-10T15:00:00Z", None, items.clone());
            if let Transaction::Order(ref mut o) = tx {
                o.payment_method = Some(blank.to_string());
            }
            assert_eq!(check_eligibility(&tx), Err(SkipReason::BlankPaymentMethod));
        }

        let mut tx = order("o", "2025-03-10T15:00:00Z", None, items);
        if let Transaction::Order(ref mut o) = tx {
            o.status = None;
            o.payment_method = None;
        }
        assert!(check_eligibility(&tx).is_ok());

        let tx = order("o", "2025-03-10T15:00:00Z", None, Vec::new());
        assert_eq!(check_eligibility(&tx), Err(SkipReason::NoItems));
    }

    #[test]
    fn test_payment_eligibility() {
        let items = vec![item(product("a", 50), 1, None)];
        assert!(check_eligibility(&payment("p", "2025-03-10T15:00:00Z", None, items.clone())).is_ok());

        let mut tx = payment("p", "2025-03-10T15:00:00Z", None, items.clone());
        if let Transaction::ManualPayment(ref mut p) = tx {
            p.is_store = Some(false);
        }
        assert_eq!(check_eligibility(&tx), Err(SkipReason::NotStorePayment));

        let mut tx = payment("p", "2025-03-10T15:00:00Z", None, items);
        if let Transaction::ManualPayment(ref mut p) = tx {
            p.status = Some(PaymentStatus::Cancelled);
        }
        assert!(matches!(check_eligibility(&tx), Err(SkipReason::NotReportableStatus(_))));
    }
}
