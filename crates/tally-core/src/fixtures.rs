//! Builders shared by unit tests.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::money::Money;
use crate::profit::with_profit;
use crate::types::{
    DiscountKind, LineItem, ManualPaymentRecord, OrderRecord, OrderStatus, PaymentStatus,
    ProductRecord, ResolvedLine, Transaction, TransactionKind, UserRef,
};

pub fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

/// A resolved order line with profit filled in.
pub fn resolved_line(tx_id: &str, sold_units: i64, quantity: i64, cost: Decimal) -> ResolvedLine {
    let sold_price = Money::from_units(sold_units);
    with_profit(ResolvedLine {
        product_name: "Product".to_string(),
        brand: "Brand".to_string(),
        category: "Category".to_string(),
        tone: "No tone".to_string(),
        quantity,
        real_price: sold_price.to_decimal(),
        individual_price: sold_price.to_decimal(),
        sold_price,
        line_total: sold_price * quantity,
        discount_kind: DiscountKind::None,
        discount_percent: Decimal::ZERO,
        has_order_discount: false,
        order_factor: Decimal::ONE,
        cost,
        profit_per_unit: Decimal::ZERO,
        profit_total: Decimal::ZERO,
        margin_percent: Decimal::ZERO,
        transaction_id: tx_id.to_string(),
        transaction_kind: TransactionKind::Order,
        timestamp: ts("2025-03-10T15:00:00Z"),
        user_name: "Ana".to_string(),
        trace: None,
    })
}

pub fn product(id: &str, price: i64) -> ProductRecord {
    ProductRecord {
        id: id.to_string(),
        name: Some(format!("Product {}", id)),
        price: Some(Decimal::from(price)),
        ..Default::default()
    }
}

pub fn item(product: ProductRecord, quantity: i64, price: Option<Decimal>) -> LineItem {
    LineItem {
        product_ref: product.id.clone(),
        product: Some(product),
        quantity,
        price,
    }
}

pub fn order(id: &str, created_at: &str, total: Option<Decimal>, products: Vec<LineItem>) -> Transaction {
    Transaction::Order(OrderRecord {
        id: id.to_string(),
        created_at: ts(created_at),
        total,
        status: Some(OrderStatus::Approved),
        payment_method: Some("card".to_string()),
        user: Some(UserRef {
            full_name: Some("Ana Gómez".to_string()),
            ..Default::default()
        }),
        products,
    })
}

pub fn payment(id: &str, created_at: &str, total: Option<Decimal>, store: Vec<LineItem>) -> Transaction {
    Transaction::ManualPayment(ManualPaymentRecord {
        id: id.to_string(),
        created_at: ts(created_at),
        total,
        status: Some(PaymentStatus::Approved),
        is_store: Some(true),
        last_admin_edit: Some(UserRef {
            full_name: Some("Admin Ruiz".to_string()),
            ..Default::default()
        }),
        store,
    })
}
